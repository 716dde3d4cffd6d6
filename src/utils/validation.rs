use crate::utils::error::{ExportError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> ExportError {
    ExportError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// A base URL the bulk path can be appended to: http(s), a host, and no
/// query string or fragment.
pub fn validate_base_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, value, format!("Unsupported URL scheme: {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, value, "URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(field, value, "Base URL must not carry a query or fragment"));
    }
    Ok(())
}

/// A PEM trust anchor: non-empty path with a certificate extension.
pub fn validate_trust_anchor(field: &str, path: &Path) -> Result<()> {
    let shown = path.display();
    if path.as_os_str().is_empty() {
        return Err(invalid(field, shown, "Path cannot be empty"));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("pem" | "crt" | "cer") => Ok(()),
        _ => Err(invalid(field, shown, "Expected a PEM certificate (.pem, .crt or .cer)")),
    }
}

pub fn validate_in_range(field: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(field, value, format!("Value must be between {} and {}", min, max)));
    }
    Ok(())
}

/// Treats an unresolved `${VAR}` placeholder the same as an empty value.
pub fn is_blank_or_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || (trimmed.starts_with("${") && trimmed.ends_with('}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("api.endpoint", "https://example.com").is_ok());
        assert!(validate_base_url("api.endpoint", "http://localhost:3000/prefix").is_ok());
        assert!(validate_base_url("api.endpoint", "").is_err());
        assert!(validate_base_url("api.endpoint", "invalid-url").is_err());
        assert!(validate_base_url("api.endpoint", "ftp://example.com").is_err());
        assert!(validate_base_url("api.endpoint", "https://example.com/?token=1").is_err());
    }

    #[test]
    fn test_validate_trust_anchor() {
        assert!(validate_trust_anchor("api.ca_bundle", Path::new("certs/ca.pem")).is_ok());
        assert!(validate_trust_anchor("api.ca_bundle", Path::new("")).is_err());
        assert!(validate_trust_anchor("api.ca_bundle", Path::new("certs/ca.txt")).is_err());
    }

    #[test]
    fn test_validate_in_range() {
        assert!(validate_in_range("source.page_size", 100, 1, 10_000).is_ok());
        assert!(validate_in_range("source.page_size", 0, 1, 10_000).is_err());
        assert!(validate_in_range("api.timeout_seconds", 3_600, 1, 600).is_err());
    }

    #[test]
    fn test_blank_or_placeholder() {
        assert!(is_blank_or_placeholder("  "));
        assert!(is_blank_or_placeholder("${EXPORT_API_KEY}"));
        assert!(!is_blank_or_placeholder("key-123"));
    }
}

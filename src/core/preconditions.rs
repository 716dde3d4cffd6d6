use crate::config::{ExportConfig, SUPPORTED_SOURCE_TYPES};
use crate::domain::ports::Preconditions;
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::is_blank_or_placeholder;

/// Runs every check in a fixed order and fails on the first one that does not hold.
pub fn ensure_preconditions<P: Preconditions + ?Sized>(checks: &P) -> Result<()> {
    if !checks.is_production() {
        return Err(ExportError::PreconditionFailed {
            check: "production_environment",
            message: "the export may only run in the production environment".to_string(),
        });
    }

    if !checks.source_resolvable() {
        return Err(ExportError::PreconditionFailed {
            check: "source_resolvable",
            message: "no record source is configured (set source.path)".to_string(),
        });
    }

    if !checks.source_supported() {
        return Err(ExportError::PreconditionFailed {
            check: "source_supported",
            message: format!(
                "the record source must be an existing file of a supported type ({})",
                SUPPORTED_SOURCE_TYPES.join(", ")
            ),
        });
    }

    if !checks.credentials_present() {
        return Err(ExportError::PreconditionFailed {
            check: "credentials_present",
            message: "api.app_id and api.api_key must both be set".to_string(),
        });
    }

    Ok(())
}

/// Precondition checks derived from an [`ExportConfig`].
pub struct ConfigPreconditions<'a> {
    config: &'a ExportConfig,
}

impl<'a> ConfigPreconditions<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }
}

impl Preconditions for ConfigPreconditions<'_> {
    fn is_production(&self) -> bool {
        self.config.is_production_environment()
    }

    fn source_resolvable(&self) -> bool {
        self.config
            .source
            .path
            .as_ref()
            .is_some_and(|p| !p.as_os_str().is_empty())
    }

    fn source_supported(&self) -> bool {
        let supported_type = SUPPORTED_SOURCE_TYPES.contains(&self.config.source.r#type.as_str());
        let exists = self
            .config
            .source
            .path
            .as_ref()
            .is_some_and(|p| p.is_file());
        supported_type && exists
    }

    fn credentials_present(&self) -> bool {
        !is_blank_or_placeholder(&self.config.api.app_id)
            && !is_blank_or_placeholder(&self.config.api.api_key)
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Precondition '{check}' failed: {message}")]
    PreconditionFailed {
        check: &'static str,
        message: String,
    },

    #[error("Bulk endpoint rejected credentials (HTTP {status})")]
    InvalidCredentials { status: u16 },

    #[error("Batch delivery failed with HTTP {status} after {attempts} attempts")]
    DeliveryFailed { status: u16, attempts: u32 },

    #[error("Batch delivery failed after {attempts} attempts: {source}")]
    DeliveryTransport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Source error at line {line}: {message}")]
    SourceError { line: usize, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Delivery,
    Source,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExportError {
    pub fn config(message: impl Into<String>) -> Self {
        ExportError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ExportError::ConfigError { .. }
            | ExportError::MissingConfigError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::PreconditionFailed { .. }
            | ExportError::InvalidCredentials { .. } => ErrorCategory::Configuration,
            ExportError::ApiError(_)
            | ExportError::DeliveryFailed { .. }
            | ExportError::DeliveryTransport { .. } => ErrorCategory::Delivery,
            ExportError::SourceError { .. } => ErrorCategory::Source,
            ExportError::IoError(_) | ExportError::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// 決定 CLI 退出碼的嚴重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Delivery => ErrorSeverity::Medium,
            ErrorCategory::Source => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Configuration errors are never retried and abort the run.
    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ExportError::InvalidCredentials { .. } => {
                "Check api.app_id and api.api_key in the export configuration".to_string()
            }
            ExportError::PreconditionFailed { check, .. } => match *check {
                "production_environment" => {
                    "Run the export from the production environment (environment.name = \"production\")".to_string()
                }
                "credentials_present" => {
                    "Set api.app_id and api.api_key, e.g. through ${EXPORT_APP_ID} / ${EXPORT_API_KEY}".to_string()
                }
                _ => "Check the [source] section of the export configuration".to_string(),
            },
            ExportError::MissingConfigError { field }
            | ExportError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' entry in the export configuration", field)
            }
            ExportError::ConfigError { .. } => {
                "Make sure the configuration file exists and is valid TOML".to_string()
            }
            ExportError::DeliveryFailed { .. } | ExportError::DeliveryTransport { .. } => {
                "The bulk endpoint is unavailable; re-run the export once it recovers".to_string()
            }
            ExportError::ApiError(_) => "Check network connectivity to the bulk endpoint and that api.ca_bundle trusts its certificate".to_string(),
            ExportError::SourceError { .. } => {
                "Fix or remove the malformed record in the source file".to_string()
            }
            ExportError::IoError(_) => "Check file paths and permissions".to_string(),
            ExportError::SerializationError(_) => {
                "The bulk endpoint returned an unexpected response body".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Export is not configured correctly: {}", self),
            ErrorCategory::Delivery => format!("Export aborted while delivering a batch: {}", self),
            ErrorCategory::Source => format!("Could not read the record source: {}", self),
            ErrorCategory::System => format!("Export failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_error_is_configuration() {
        let err = ExportError::InvalidCredentials { status: 403 };
        assert!(err.is_configuration_error());
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_delivery_failure_is_not_configuration() {
        let err = ExportError::DeliveryFailed {
            status: 500,
            attempts: 3,
        };
        assert!(!err.is_configuration_error());
        assert_eq!(err.category(), ErrorCategory::Delivery);
        assert_eq!(
            err.to_string(),
            "Batch delivery failed with HTTP 500 after 3 attempts"
        );
    }

    #[test]
    fn test_precondition_suggestion_names_environment() {
        let err = ExportError::PreconditionFailed {
            check: "production_environment",
            message: "not production".to_string(),
        };
        assert!(err.recovery_suggestion().contains("production"));
    }
}

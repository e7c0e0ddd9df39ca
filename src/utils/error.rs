use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("No catalog entry found for '{title}'")]
    LookupMiss { title: String },

    #[error("Unsupported content type: {kind}")]
    UnsupportedContentType { kind: String },

    #[error("API request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("GraphQL query failed: {}", messages.join("; "))]
    GraphQlError { messages: Vec<String> },

    #[error("Malformed API response: {message}")]
    MalformedResponse { message: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Catalog,
    Network,
    Input,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoutError::LookupMiss { .. }
            | ScoutError::UnsupportedContentType { .. }
            | ScoutError::MalformedResponse { .. }
            | ScoutError::GraphQlError { .. } => ErrorCategory::Catalog,
            ScoutError::TransportError(_) | ScoutError::Timeout { .. } => ErrorCategory::Network,
            ScoutError::CsvError(_) | ScoutError::ValidationError { .. } => ErrorCategory::Input,
            ScoutError::IoError(_) | ScoutError::SerializationError(_) => ErrorCategory::Output,
            ScoutError::ConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScoutError::LookupMiss { .. } | ScoutError::UnsupportedContentType { .. } => {
                ErrorSeverity::Low
            }
            ScoutError::TransportError(_)
            | ScoutError::GraphQlError { .. }
            | ScoutError::MalformedResponse { .. }
            | ScoutError::Timeout { .. } => ErrorSeverity::Medium,
            ScoutError::CsvError(_) | ScoutError::ValidationError { .. } => ErrorSeverity::High,
            ScoutError::IoError(_)
            | ScoutError::SerializationError(_)
            | ScoutError::ConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 單一片名層級可降級處理的錯誤（記為「無可用服務」並繼續批次）
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Catalog | ErrorCategory::Network
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScoutError::LookupMiss { .. } => {
                "Check the spelling of the title or try the original release title"
            }
            ScoutError::UnsupportedContentType { .. } => {
                "Only movies are supported; TV shows are reported without offers"
            }
            ScoutError::TransportError(_) | ScoutError::Timeout { .. } => {
                "Check network connectivity or raise --timeout-secs"
            }
            ScoutError::GraphQlError { .. } | ScoutError::MalformedResponse { .. } => {
                "The upstream API may have changed; check --api-endpoint"
            }
            ScoutError::CsvError(_) => "Make sure the watchlist is a valid CSV file",
            ScoutError::ValidationError { .. } => "Fix the input data and retry",
            ScoutError::IoError(_) => "Check that the input file exists and the output path is writable",
            ScoutError::SerializationError(_) => "Try the text output format",
            ScoutError::ConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::MissingConfigError { .. } => "Run with --help to see valid options",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScoutError::IoError(e) => format!("File access failed: {}", e),
            ScoutError::CsvError(e) => format!("Could not read the watchlist: {}", e),
            ScoutError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;

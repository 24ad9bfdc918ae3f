use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Unauthorized: {message}")]
    UnauthorizedError { message: String },

    #[error("Session already expired")]
    SessionExpiredError,

    #[error("Server responded with status {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Request rejected: {message}")]
    EnvelopeError { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Token error: {message}")]
    TokenError { message: String },

    #[error("Credential storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// 錯誤分類，對應使用者看到的三種情境：網路、授權、輸入驗證
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authorization,
    Validation,
    Server,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ClientError::UnauthorizedError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::ApiError(e) if e.status().map(|s| s.as_u16()) == Some(401) => {
                ErrorCategory::Authorization
            }
            ClientError::ApiError(_) => ErrorCategory::Network,
            ClientError::UnauthorizedError { .. }
            | ClientError::SessionExpiredError
            | ClientError::TokenError { .. } => {
                ErrorCategory::Authorization
            }
            ClientError::ServerError { status, .. } if *status == 400 || *status == 422 => {
                ErrorCategory::Validation
            }
            ClientError::ServerError { .. } => ErrorCategory::Server,
            ClientError::EnvelopeError { .. } => ErrorCategory::Validation,
            ClientError::ConfigError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::MissingConfigError { .. }
            | ClientError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ClientError::SerializationError(_)
            | ClientError::CsvError(_)
            | ClientError::IoError(_)
            | ClientError::StorageError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Server => ErrorSeverity::Medium,
            ErrorCategory::Authorization | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 是否為授權失敗（過期或無效的憑證）
    pub fn is_unauthorized(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => {
                "Could not reach the server. Please try again.".to_string()
            }
            ErrorCategory::Authorization => {
                "Your session has expired. Please log in again.".to_string()
            }
            ErrorCategory::Validation => match self {
                ClientError::EnvelopeError { message }
                | ClientError::ServerError { message, .. } => message.clone(),
                _ => self.to_string(),
            },
            ErrorCategory::Server => {
                "The server could not complete the request. Please try again.".to_string()
            }
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Internal => format!("Unexpected error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the API URL",
            ErrorCategory::Authorization => "Run `rental-client login` to start a new session",
            ErrorCategory::Validation => "Correct the highlighted input and submit again",
            ErrorCategory::Server => "Wait a moment and retry; contact support if it persists",
            ErrorCategory::Configuration => "Review the config file and command-line flags",
            ErrorCategory::Internal => "Check the credentials file permissions and disk space",
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeUserError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Missing required setting: {name}")]
    MissingSettingError { name: String },

    #[error("Invalid value '{value}' for setting {name}: {reason}")]
    InvalidSettingError {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Account store error: {message}")]
    StoreError { message: String },

    #[error("Account not found: {id}")]
    AccountNotFoundError { id: String },

    #[error("Refusing to merge account {id} into itself")]
    SelfMergeError { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Store,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MergeUserError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TomlParseError(_)
            | Self::MissingSettingError { .. }
            | Self::InvalidSettingError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::StoreError { .. } => ErrorCategory::Store,
            Self::AccountNotFoundError { .. }
            | Self::SelfMergeError { .. }
            | Self::SerializationError(_) => ErrorCategory::Data,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單一帳號的問題，下一次排程會再處理
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Store => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether the error stops the whole run rather than a single account.
    pub fn is_fatal(&self) -> bool {
        self.severity() >= ErrorSeverity::High
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => "Check that the account file and config file exist and are writable",
            Self::SerializationError(_) => "Check that the account file contains valid JSON",
            Self::TomlParseError(_) => "Check the config file for TOML syntax errors",
            Self::MissingSettingError { .. } => {
                "Add the missing key to the [settings] table of the config file"
            }
            Self::InvalidSettingError { .. } => {
                "disabledForDays must be a whole number of days, defaultUser a username"
            }
            Self::ConfigValidationError { .. } => "Fix the reported config field and restart",
            Self::StoreError { .. } => "The account will be retried on the next scheduled run",
            Self::AccountNotFoundError { .. } => {
                "The account list changed during the run; it will be re-read on the next run"
            }
            Self::SelfMergeError { .. } => {
                "Point defaultUser at an active account that is not itself disabled"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingSettingError { name } => {
                format!("Setting '{}' is required but was not configured", name)
            }
            Self::InvalidSettingError { name, value, .. } => {
                format!("Setting '{}' has an unusable value '{}'", name, value)
            }
            Self::StoreError { message } => format!("The account store rejected a request: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeUserError>;

use thiserror::Error;

/// Reasons a configuration is rejected at construction time
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for `{name}`: {value} is outside {interval}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        interval: String,
    },

    #[error("`{name}` must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("invalid configuration: {message}")]
    Inconsistent { message: String },
}

impl ConfigError {
    pub(crate) fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

// ⚠️ Presence Errors - typed failures of the core pipeline
// File I/O and CLI glue stay on anyhow; these are the errors callers match on.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PresenceError {
    /// A timestamp (or the meeting start) matches none of the known layouts
    #[error("Unparseable timestamp {value:?}: {reason}")]
    Format { value: String, reason: String },

    /// A roster composite name without the `[class]` suffix
    #[error("Malformed roster name {value:?}: expected \"<full name> [<class>]\"")]
    Structural { value: String },

    /// Missing or corrupt similarity index artifact
    #[error("Invalid similarity index: {0}")]
    Artifact(String),

    /// A run setting outside its valid range
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PresenceError {
    pub fn format(value: &str, reason: impl Into<String>) -> Self {
        PresenceError::Format {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn structural(value: &str) -> Self {
        PresenceError::Structural {
            value: value.to_string(),
        }
    }
}

pub type PresenceResult<T> = std::result::Result<T, PresenceError>;

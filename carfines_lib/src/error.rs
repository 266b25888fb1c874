//! Error types for startup configuration.

use std::fmt;

/// Errors raised while assembling the run configuration. All of them are
/// fatal and surface before any portal is queried.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Required settings are absent or empty. Lists every missing key.
    Missing(Vec<&'static str>),
    /// A setting is present but cannot be used.
    Invalid { key: &'static str, message: String },
    /// The plate number is not a plausible Argentine plate.
    InvalidPlate(String),
    /// Every portal was disabled, so there is nothing to look up.
    NoPortalsEnabled,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(keys) => write!(f, "missing settings: {}", keys.join(", ")),
            Self::Invalid { key, message } => write!(f, "invalid {}: {}", key, message),
            Self::InvalidPlate(msg) => write!(f, "invalid plate number: {}", msg),
            Self::NoPortalsEnabled => write!(f, "no portals enabled"),
        }
    }
}

impl std::error::Error for ConfigError {}

//! Error contracts shared by lazy attributes and locators.
//!
//! # Responsibility
//! - Define one error enum for configuration and read-time failures.
//!
//! # Invariants
//! - Read-time errors carry a rendered form of the rejected value.
//! - A value that produced an error is never cached.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while building descriptors or reading lazy values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LazyError {
    /// Descriptor configuration is invalid (bad name, duplicate attribute).
    Configuration(String),
    /// Value is not an instance of the expected type or capability.
    TypeMismatch { value: String, expected: String },
    /// Value was rejected by a named predicate.
    Validation { value: String, predicate: String },
    /// Value could not be converted into the cached representation.
    Conversion {
        value: String,
        target: String,
        reason: String,
    },
}

impl LazyError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Stable short code for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::Validation { .. } => "validation",
            Self::Conversion { .. } => "conversion",
        }
    }
}

impl Display for LazyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "invalid lazy configuration: {message}"),
            Self::TypeMismatch { value, expected } => {
                write!(f, "{value} is not a {expected}")
            }
            Self::Validation { value, predicate } => {
                write!(f, "{value} failed requirement {predicate}")
            }
            Self::Conversion {
                value,
                target,
                reason,
            } => write!(f, "cannot convert {value} into {target}: {reason}"),
        }
    }
}

impl Error for LazyError {}

/// Result alias for lazy attribute operations.
pub type LazyResult<T> = Result<T, LazyError>;

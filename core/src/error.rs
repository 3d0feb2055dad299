//! Effect model error types.

use std::fmt;

/// Errors that can occur when reading or writing effect parameter storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// The variable handle does not name a variable of this effect.
    UnknownVariable(String),
    /// A value of the wrong shape was written to a variable.
    TypeMismatch {
        /// Name of the variable being written.
        name: String,
        /// What the variable's declared shape accepts.
        expected: &'static str,
    },
    /// An internal error occurred.
    Internal(String),
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariable(name) => write!(f, "unknown effect variable: {name}"),
            Self::TypeMismatch { name, expected } => {
                write!(f, "type mismatch writing '{name}': expected {expected}")
            }
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for EffectError {}

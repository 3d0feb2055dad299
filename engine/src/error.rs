//! Engine error types.

use std::fmt;

use fxlight_core::error::EffectError;

/// Errors that can occur while loading or driving a shader instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// The effect exposes no techniques and cannot be used.
    NoTechniques,
    /// No technique with the given name exists on the effect.
    TechniqueNotFound(String),
    /// No light group with the given name exists.
    UnknownLightGroup(String),
    /// No parameter with the given name exists.
    UnknownParameter(String),
    /// The parameter is driven by a light binding and cannot be edited.
    ParameterLocked(String),
    /// The underlying effect rejected a storage access.
    Effect(EffectError),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTechniques => write!(f, "effect has no techniques"),
            Self::TechniqueNotFound(name) => write!(f, "technique not found: {name}"),
            Self::UnknownLightGroup(name) => write!(f, "unknown light group: {name}"),
            Self::UnknownParameter(name) => write!(f, "unknown parameter: {name}"),
            Self::ParameterLocked(name) => {
                write!(f, "parameter '{name}' is locked by a light binding")
            }
            Self::Effect(err) => write!(f, "effect error: {err}"),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Effect(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EffectError> for ShaderError {
    fn from(err: EffectError) -> Self {
        Self::Effect(err)
    }
}

//! # fxlight Core
//!
//! Core data model for the fxlight shader binding runtime.
//!
//! This crate defines the host-facing vocabulary shared by the binding
//! engine and the embedding application:
//! - [`effect`] - reflection interface over a compiled effect program
//!   (variables, annotations, techniques), plus an in-memory reference
//!   implementation for tests and prototyping hosts
//! - [`scene`] - frame-scoped snapshot of the host's active scene lights
//! - [`handle`] - opaque scene-object handles and liveness resolution

pub mod effect;
pub mod error;
pub mod handle;
pub mod scene;

pub use effect::{
    AnnotationValue, Effect, EffectValue, MemoryEffect, MemoryVariable, PassDesc, TechniqueDesc,
    TextureShape, VariableClass, VariableDesc, VariableHandle, VariableKind,
};
pub use error::EffectError;
pub use handle::{AmbientLightInfo, ObjectId, SceneObjects, SceneResolver, TextureHandle};
pub use scene::{LightCategory, LightValue, SceneLightInfo, SceneLightParameter, StockSemantic};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

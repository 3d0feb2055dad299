//! # fxlight Engine
//!
//! Parameter-reflection and light-binding engine for effect-style shader
//! programs.
//!
//! A compiled effect declares its uniform parameters; the host scene has
//! lights, cameras and geometry that change every frame and know nothing
//! about the shader. This crate reconciles the two:
//!
//! 1. [`reflect`] enumerates the effect's variables into raw descriptors
//! 2. [`semantic`] classifies each one - transform matrices, colors,
//!    positions, textures, and the light sub-roles
//! 3. [`groups`] clusters light-affiliated parameters into logical lights
//! 4. [`binding`] matches logical lights against the frame's scene lights
//!    (explicit connections, cached reuse, type match, compatibility
//!    match), shutting down whatever stays unbound
//! 5. [`transfer`] pushes the bound light state into parameter storage
//!
//! [`ShaderInstance`] ties it together behind a load / per-frame update /
//! query surface.
//!
//! ## Example
//!
//! ```
//! use fxlight_core::effect::{MemoryEffect, MemoryVariable, TechniqueDesc, VariableDesc};
//! use fxlight_core::handle::SceneObjects;
//! use fxlight_core::scene::SceneLightInfo;
//! use fxlight_engine::{EngineOptions, RenderMode, ShaderInstance};
//! use glam::Vec3;
//!
//! let effect = MemoryEffect::new()
//!     .with_technique(TechniqueDesc::new("Main"))
//!     .with_variable(MemoryVariable::new(
//!         VariableDesc::float_vector("keyLightColor", 3).with_semantic("LightColor"),
//!     ));
//!
//! let mut shader = ShaderInstance::load(Box::new(effect), EngineOptions::new()).unwrap();
//!
//! let mut objects = SceneObjects::new();
//! let sun = objects.add("sun");
//! let lights = [SceneLightInfo::directional(sun, Vec3::NEG_Y, Vec3::ONE, 1.0)];
//!
//! shader.on_update(RenderMode::Scene, 1, &lights, &objects);
//! assert_eq!(shader.binding_source("keyLight", &objects).unwrap().as_deref(), Some("sun"));
//! ```

pub mod binding;
pub mod cone;
pub mod error;
pub mod groups;
pub mod instance;
pub mod notify;
pub mod reflect;
pub mod schema;
pub mod semantic;
pub mod transfer;
pub mod ui;

pub use binding::RenderMode;
pub use error::ShaderError;
pub use groups::{BindingMode, BindingState, LogicalLight};
pub use instance::{EngineOptions, ShaderInstance, TechniqueTraits};
pub use notify::{Notification, NotificationQueue};
pub use reflect::{ParameterType, UniformParameter};
pub use schema::{LightGroupSchema, SchemaBindingMode, SchemaDiff};
pub use semantic::{ClassifiedParameter, LightKind, LightRole, ParameterSemantic, SemanticClassifier};
pub use ui::{ParameterFlags, UiMetadata};

/// Engine library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

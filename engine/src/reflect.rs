//! Uniform parameter reflection.
//!
//! Walks an effect's global variables in reflection order and produces the
//! raw [`UniformParameter`] entries that semantic classification consumes.
//! Variables whose type cannot be represented as a uniform parameter are
//! skipped with a warning; opaque runtime objects (samplers, state blocks,
//! buffers) are silently ignored.

use fxlight_core::effect::{
    AnnotationValue, Effect, EffectValue, TextureShape, VariableClass, VariableDesc,
    VariableHandle, VariableKind,
};

/// Host-facing type of a uniform parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    /// Type could not be determined.
    Unknown,
    /// Boolean scalar.
    Bool,
    /// Integer scalar.
    Int,
    /// Integer scalar presented as a dropdown of named fields.
    Enum,
    /// Float scalar, vector or matrix.
    Float,
    /// String constant.
    String,
    /// 1D texture.
    Texture1D,
    /// 2D texture.
    Texture2D,
    /// 3D texture.
    Texture3D,
    /// Cube texture.
    TextureCube,
}

impl ParameterType {
    /// Returns true for the texture parameter types.
    pub fn is_texture(self) -> bool {
        matches!(
            self,
            Self::Texture1D | Self::Texture2D | Self::Texture3D | Self::TextureCube
        )
    }
}

/// One reflected uniform parameter, before semantic classification.
#[derive(Debug, Clone)]
pub struct UniformParameter {
    /// Handle into the effect's parameter storage.
    pub var: VariableHandle,
    /// Variable name.
    pub name: String,
    /// Explicit semantic string, if declared.
    pub semantic: Option<String>,
    /// Converted parameter type.
    pub ty: ParameterType,
    /// Storage class, kept for classification heuristics.
    pub class: VariableClass,
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub columns: u32,
    /// Shader-file default value, captured at load time.
    pub default: EffectValue,
}

/// Enumerates every addressable uniform parameter of the effect.
///
/// An effect with zero addressable variables yields an empty list; that is
/// not an error, the shader simply has no parameters.
pub fn reflect_uniforms(effect: &dyn Effect) -> Vec<UniformParameter> {
    let mut parameters = Vec::new();

    for index in 0..effect.variable_count() {
        let var = VariableHandle::new(index);
        let Some(desc) = effect.variable(var) else {
            continue;
        };

        let Some(ty) = convert_type(effect, var, &desc) else {
            continue;
        };

        let Some(default) = effect.read(var) else {
            log::warn!("parameter '{}' has unreadable storage, skipped", desc.name);
            continue;
        };

        parameters.push(UniformParameter {
            var,
            name: desc.name,
            semantic: desc.semantic,
            ty,
            class: desc.class,
            rows: desc.rows,
            columns: desc.columns,
            default,
        });
    }

    parameters
}

/// Converts a reflected variable type to a parameter type.
///
/// Returns `None` for variables that cannot become uniform parameters.
fn convert_type(effect: &dyn Effect, var: VariableHandle, desc: &VariableDesc) -> Option<ParameterType> {
    let ty = match desc.kind {
        VariableKind::Bool => ParameterType::Bool,
        VariableKind::Int | VariableKind::UInt => {
            // An integer with named fields is presented as a dropdown.
            if effect.annotation(var, "UIFieldNames").is_some() {
                ParameterType::Enum
            } else {
                ParameterType::Int
            }
        }
        VariableKind::Float => ParameterType::Float,
        VariableKind::Double => {
            log::warn!("parameter '{}' is double precision, unsupported", desc.name);
            return None;
        }
        VariableKind::String => {
            if desc.len() != 1 {
                log::warn!("parameter '{}' is a string array, unsupported", desc.name);
                return None;
            }
            ParameterType::String
        }
        VariableKind::Texture(shape) => convert_texture(effect, var, desc, shape),
        VariableKind::Opaque => return None,
    };

    // Bool/int/string storage is only addressable as a single element.
    match ty {
        ParameterType::Bool | ParameterType::Int | ParameterType::Enum if desc.len() != 1 => {
            log::warn!("parameter '{}' is a {:?} array, unsupported", desc.name, ty);
            None
        }
        _ => Some(ty),
    }
}

fn convert_texture(
    effect: &dyn Effect,
    var: VariableHandle,
    desc: &VariableDesc,
    shape: TextureShape,
) -> ParameterType {
    match shape {
        TextureShape::OneD => ParameterType::Texture1D,
        TextureShape::TwoD => ParameterType::Texture2D,
        TextureShape::ThreeD => ParameterType::Texture3D,
        TextureShape::Cube => ParameterType::TextureCube,
        TextureShape::Untyped => {
            // The shader left the texture untyped; check for an annotation
            // naming the dimension before falling back to 2D.
            let annotated = effect
                .annotation(var, "TextureType")
                .or_else(|| effect.annotation(var, "ResourceType"));

            if let Some(value) = annotated.as_ref().and_then(AnnotationValue::as_str) {
                if value.eq_ignore_ascii_case("1D") {
                    return ParameterType::Texture1D;
                } else if value.eq_ignore_ascii_case("2D") {
                    return ParameterType::Texture2D;
                } else if value.eq_ignore_ascii_case("3D") {
                    return ParameterType::Texture3D;
                } else if value.eq_ignore_ascii_case("Cube") {
                    return ParameterType::TextureCube;
                }
                log::warn!(
                    "unknown texture type annotation '{}' on parameter '{}'",
                    value,
                    desc.name
                );
            }

            log::warn!(
                "parameter '{}' has no texture type, defaulting to 2D",
                desc.name
            );
            ParameterType::Texture2D
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxlight_core::effect::{MemoryEffect, MemoryVariable};

    #[test]
    fn test_reflect_basic_types() {
        let effect = MemoryEffect::new()
            .with_variable(MemoryVariable::new(VariableDesc::float_vector("Color", 4)))
            .with_variable(MemoryVariable::new(VariableDesc::bool_scalar("Enabled")))
            .with_variable(MemoryVariable::new(VariableDesc::matrix("World")));

        let params = reflect_uniforms(&effect);
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].ty, ParameterType::Float);
        assert_eq!(params[1].ty, ParameterType::Bool);
        assert_eq!(params[2].ty, ParameterType::Float);
        assert_eq!(params[2].rows, 4);
    }

    #[test]
    fn test_enum_promotion() {
        let effect = MemoryEffect::new().with_variable(
            MemoryVariable::new(VariableDesc::int_scalar("Mode"))
                .with_annotation("UIFieldNames", "Off:Low:High"),
        );

        let params = reflect_uniforms(&effect);
        assert_eq!(params[0].ty, ParameterType::Enum);
    }

    #[test]
    fn test_untyped_texture_annotation_fallback() {
        let effect = MemoryEffect::new()
            .with_variable(
                MemoryVariable::new(VariableDesc::texture("EnvMap", TextureShape::Untyped))
                    .with_annotation("TextureType", "Cube"),
            )
            .with_variable(MemoryVariable::new(VariableDesc::texture(
                "Diffuse",
                TextureShape::Untyped,
            )));

        let params = reflect_uniforms(&effect);
        assert_eq!(params[0].ty, ParameterType::TextureCube);
        // No annotation: defaults to 2D.
        assert_eq!(params[1].ty, ParameterType::Texture2D);
    }

    #[test]
    fn test_empty_effect_is_not_an_error() {
        let effect = MemoryEffect::new();
        assert!(reflect_uniforms(&effect).is_empty());
    }
}

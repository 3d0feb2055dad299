//! In-memory effect implementation.
//!
//! [`MemoryEffect`] backs the [`Effect`](super::Effect) trait with plain
//! vectors. It is the reference implementation used by the test suite and
//! by hosts that want to prototype binding behavior without a real effect
//! runtime.

use glam::Mat4;

use crate::error::EffectError;

use super::{
    AnnotationValue, Effect, EffectValue, TechniqueDesc, VariableClass, VariableDesc,
    VariableHandle, VariableKind,
};

/// One variable of a [`MemoryEffect`]: description, annotations and the
/// current parameter storage value.
#[derive(Debug, Clone)]
pub struct MemoryVariable {
    desc: VariableDesc,
    annotations: Vec<(String, AnnotationValue)>,
    value: EffectValue,
}

impl MemoryVariable {
    /// Creates a variable with storage initialized to the shape's zero
    /// value (zeros, false, empty string, unbound texture).
    pub fn new(desc: VariableDesc) -> Self {
        let value = zero_value(&desc);
        Self {
            desc,
            annotations: Vec::new(),
            value,
        }
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with_annotation(mut self, name: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.annotations.push((name.into(), value.into()));
        self
    }

    /// Sets the initial storage value (the shader-file default).
    #[must_use]
    pub fn with_value(mut self, value: EffectValue) -> Self {
        self.value = value;
        self
    }

    /// The variable description.
    pub fn desc(&self) -> &VariableDesc {
        &self.desc
    }
}

fn zero_value(desc: &VariableDesc) -> EffectValue {
    match desc.kind {
        VariableKind::Bool => EffectValue::Bool(false),
        VariableKind::Int | VariableKind::UInt => EffectValue::Int(0),
        VariableKind::String => EffectValue::String(String::new()),
        VariableKind::Texture(_) => EffectValue::Texture(None),
        VariableKind::Float | VariableKind::Double => match desc.class {
            VariableClass::Scalar => EffectValue::Float(0.0),
            VariableClass::MatrixColumns | VariableClass::MatrixRows => {
                EffectValue::Matrix(Mat4::IDENTITY)
            }
            _ => EffectValue::FloatVec(vec![0.0; desc.len()]),
        },
        VariableKind::Opaque => EffectValue::Int(0),
    }
}

/// In-memory implementation of [`Effect`].
///
/// # Example
///
/// ```
/// use fxlight_core::effect::{
///     Effect, EffectValue, MemoryEffect, MemoryVariable, PassDesc, TechniqueDesc, VariableDesc,
/// };
///
/// let effect = MemoryEffect::new()
///     .with_technique(TechniqueDesc::new("Main").with_pass(PassDesc::new("P0")))
///     .with_variable(
///         MemoryVariable::new(VariableDesc::float_vector("LightColor", 3).with_semantic("LightColor"))
///             .with_value(EffectValue::FloatVec(vec![1.0, 1.0, 1.0])),
///     );
///
/// assert_eq!(effect.variable_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryEffect {
    variables: Vec<MemoryVariable>,
    techniques: Vec<TechniqueDesc>,
}

impl MemoryEffect {
    /// Creates an effect with no variables and no techniques.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable. Reflection order is insertion order.
    #[must_use]
    pub fn with_variable(mut self, variable: MemoryVariable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Appends a technique.
    #[must_use]
    pub fn with_technique(mut self, technique: TechniqueDesc) -> Self {
        self.techniques.push(technique);
        self
    }

    /// Finds a variable handle by name.
    pub fn handle_of(&self, name: &str) -> Option<VariableHandle> {
        self.variables
            .iter()
            .position(|v| v.desc.name == name)
            .map(VariableHandle::new)
    }
}

/// Checks a value against a variable's declared shape.
///
/// Float vectors may carry fewer elements than the declaration; the write
/// then updates the leading elements and leaves the rest untouched, the way
/// a 3-component color lands in a float4 register.
fn check_write(desc: &VariableDesc, value: &EffectValue) -> Result<(), &'static str> {
    match (&desc.kind, value) {
        (VariableKind::Bool, EffectValue::Bool(_)) => Ok(()),
        (VariableKind::Int | VariableKind::UInt, EffectValue::Int(_)) => Ok(()),
        (VariableKind::String, EffectValue::String(_)) => Ok(()),
        (VariableKind::Texture(_), EffectValue::Texture(_)) => Ok(()),
        (VariableKind::Float | VariableKind::Double, v) => match (desc.class, v) {
            (VariableClass::Scalar, EffectValue::Float(_)) => Ok(()),
            (VariableClass::Vector, EffectValue::FloatVec(values)) => {
                if values.len() <= desc.len() {
                    Ok(())
                } else {
                    Err("float vector within declared width")
                }
            }
            (
                VariableClass::MatrixColumns | VariableClass::MatrixRows,
                EffectValue::Matrix(_),
            ) => Ok(()),
            _ => Err(expected_for(desc)),
        },
        _ => Err(expected_for(desc)),
    }
}

fn expected_for(desc: &VariableDesc) -> &'static str {
    match desc.kind {
        VariableKind::Bool => "bool",
        VariableKind::Int | VariableKind::UInt => "int",
        VariableKind::String => "string",
        VariableKind::Texture(_) => "texture",
        VariableKind::Float | VariableKind::Double => match desc.class {
            VariableClass::Scalar => "float",
            VariableClass::Vector => "float vector",
            _ => "matrix",
        },
        VariableKind::Opaque => "opaque",
    }
}

impl Effect for MemoryEffect {
    fn variable_count(&self) -> usize {
        self.variables.len()
    }

    fn variable(&self, var: VariableHandle) -> Option<VariableDesc> {
        self.variables.get(var.index()).map(|v| v.desc.clone())
    }

    fn annotation(&self, var: VariableHandle, name: &str) -> Option<AnnotationValue> {
        self.variables.get(var.index()).and_then(|v| {
            v.annotations
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, value)| value.clone())
        })
    }

    fn read(&self, var: VariableHandle) -> Option<EffectValue> {
        self.variables.get(var.index()).map(|v| v.value.clone())
    }

    fn write(&mut self, var: VariableHandle, value: EffectValue) -> Result<(), EffectError> {
        let slot = self
            .variables
            .get_mut(var.index())
            .ok_or_else(|| EffectError::UnknownVariable(format!("#{}", var.index())))?;

        check_write(&slot.desc, &value).map_err(|expected| EffectError::TypeMismatch {
            name: slot.desc.name.clone(),
            expected,
        })?;

        // Partial float-vector writes keep the remaining components.
        if let (EffectValue::FloatVec(existing), EffectValue::FloatVec(incoming)) =
            (&mut slot.value, &value)
        {
            if incoming.len() < existing.len() {
                existing[..incoming.len()].copy_from_slice(incoming);
                return Ok(());
            }
        }

        slot.value = value;
        Ok(())
    }

    fn technique_count(&self) -> usize {
        self.techniques.len()
    }

    fn technique(&self, index: usize) -> Option<&TechniqueDesc> {
        self.techniques.get(index)
    }
}

static_assertions::assert_impl_all!(MemoryEffect: Send, Sync);

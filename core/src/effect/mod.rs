//! Reflection interface over a compiled effect program.
//!
//! A compiled effect exposes its global variables only through runtime
//! reflection: names, declared shapes, optional semantic strings and a bag
//! of typed annotations per variable, plus the list of techniques (each a
//! sequence of passes) the effect supports.
//!
//! The [`Effect`] trait is the seam between the binding engine and whatever
//! runtime actually owns the compiled program. Parameter storage is
//! addressed by [`VariableHandle`] and accessed through typed
//! [`read`](Effect::read) / [`write`](Effect::write) calls; the engine never
//! sees raw GPU memory. [`MemoryEffect`](memory::MemoryEffect) is the
//! in-memory reference implementation used by tests.

pub mod memory;

pub use memory::{MemoryEffect, MemoryVariable};

use glam::Mat4;

use crate::error::EffectError;
use crate::handle::TextureHandle;

/// Storage class of a reflected variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableClass {
    /// Single value.
    Scalar,
    /// One row of values.
    Vector,
    /// Column-major matrix.
    MatrixColumns,
    /// Row-major matrix.
    MatrixRows,
    /// Non-numeric object (texture, sampler, state block).
    Object,
}

/// Dimensionality of a texture variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureShape {
    /// 1D texture.
    OneD,
    /// 2D texture.
    TwoD,
    /// 3D texture.
    ThreeD,
    /// Cube map.
    Cube,
    /// Declared without a dimension; resolved through annotations.
    Untyped,
}

/// Element type of a reflected variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// String constant.
    String,
    /// Texture resource.
    Texture(TextureShape),
    /// Anything else the reflection API reports (samplers, buffers,
    /// shader objects). Not addressable as a uniform parameter.
    Opaque,
}

/// Reflected description of one effect variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDesc {
    /// Variable name as declared in the effect source.
    pub name: String,
    /// Explicit semantic string, if the author declared one.
    pub semantic: Option<String>,
    /// Storage class.
    pub class: VariableClass,
    /// Element type.
    pub kind: VariableKind,
    /// Number of rows (1 for scalars and vectors).
    pub rows: u32,
    /// Number of columns (vector width; 1 for scalars).
    pub columns: u32,
}

impl VariableDesc {
    /// A float scalar.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            semantic: None,
            class: VariableClass::Scalar,
            kind: VariableKind::Float,
            rows: 1,
            columns: 1,
        }
    }

    /// A float vector of the given width.
    pub fn float_vector(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            semantic: None,
            class: VariableClass::Vector,
            kind: VariableKind::Float,
            rows: 1,
            columns: width,
        }
    }

    /// A 4x4 column-major float matrix.
    pub fn matrix(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            semantic: None,
            class: VariableClass::MatrixColumns,
            kind: VariableKind::Float,
            rows: 4,
            columns: 4,
        }
    }

    /// A boolean scalar.
    pub fn bool_scalar(name: impl Into<String>) -> Self {
        Self {
            kind: VariableKind::Bool,
            ..Self::scalar(name)
        }
    }

    /// An integer scalar.
    pub fn int_scalar(name: impl Into<String>) -> Self {
        Self {
            kind: VariableKind::Int,
            ..Self::scalar(name)
        }
    }

    /// A string constant.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            kind: VariableKind::String,
            ..Self::scalar(name)
        }
    }

    /// A texture resource of the given shape.
    pub fn texture(name: impl Into<String>, shape: TextureShape) -> Self {
        Self {
            name: name.into(),
            semantic: None,
            class: VariableClass::Object,
            kind: VariableKind::Texture(shape),
            rows: 1,
            columns: 1,
        }
    }

    /// Sets the explicit semantic string.
    #[must_use]
    pub fn with_semantic(mut self, semantic: impl Into<String>) -> Self {
        self.semantic = Some(semantic.into());
        self
    }

    /// Marks a matrix as row-major.
    #[must_use]
    pub fn row_major(mut self) -> Self {
        self.class = VariableClass::MatrixRows;
        self
    }

    /// Total number of elements (rows x columns).
    pub fn len(&self) -> usize {
        (self.rows * self.columns) as usize
    }

    /// Returns true for degenerate zero-element shapes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Typed annotation value attached to a variable, technique or pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// String annotation.
    String(String),
    /// Float annotation.
    Float(f32),
    /// Integer annotation.
    Int(i32),
    /// Boolean annotation.
    Bool(bool),
}

impl AnnotationValue {
    /// The string content, if this is a string annotation.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content; integer annotations convert losslessly.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Integer content.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean content; integer annotations count non-zero as true.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(v) => Some(*v != 0),
            _ => None,
        }
    }
}

impl From<&str> for AnnotationValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<f32> for AnnotationValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for AnnotationValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for AnnotationValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// A typed value stored in (or written to) effect parameter storage.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectValue {
    /// Float scalar.
    Float(f32),
    /// Float vector or matrix contents in declaration order.
    FloatVec(Vec<f32>),
    /// 4x4 matrix.
    Matrix(Mat4),
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i32),
    /// String constant.
    String(String),
    /// Texture binding; `None` unbinds.
    Texture(Option<TextureHandle>),
}

impl EffectValue {
    /// Short name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::FloatVec(_) => "float vector",
            Self::Matrix(_) => "matrix",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::Texture(_) => "texture",
        }
    }

    /// The scalar float content, if any.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean content, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The float-vector content, if any.
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            Self::FloatVec(v) => Some(v),
            _ => None,
        }
    }
}

/// Opaque handle into an effect's variable table.
///
/// Handles are only meaningful for the effect that produced them and only
/// until that effect is reloaded or its technique changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableHandle(usize);

impl VariableHandle {
    /// Creates a handle from a variable-table index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the variable-table index.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One draw step of a technique.
#[derive(Debug, Clone, PartialEq)]
pub struct PassDesc {
    /// Pass name.
    pub name: String,
    annotations: Vec<(String, AnnotationValue)>,
}

impl PassDesc {
    /// Creates a pass with no annotations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with_annotation(mut self, name: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.annotations.push((name.into(), value.into()));
        self
    }

    /// Looks up an annotation by exact name.
    pub fn annotation(&self, name: &str) -> Option<&AnnotationValue> {
        self.annotations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// One named rendering strategy within an effect.
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueDesc {
    /// Technique name.
    pub name: String,
    /// Ordered draw passes.
    pub passes: Vec<PassDesc>,
    annotations: Vec<(String, AnnotationValue)>,
}

impl TechniqueDesc {
    /// Creates a technique with no passes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passes: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Appends a pass.
    #[must_use]
    pub fn with_pass(mut self, pass: PassDesc) -> Self {
        self.passes.push(pass);
        self
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with_annotation(mut self, name: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.annotations.push((name.into(), value.into()));
        self
    }

    /// Looks up an annotation by exact name.
    pub fn annotation(&self, name: &str) -> Option<&AnnotationValue> {
        self.annotations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Reflection and storage interface of a compiled effect.
///
/// Implemented by the host's effect runtime. All access goes through
/// [`VariableHandle`]s obtained by enumerating `0..variable_count()`.
pub trait Effect {
    /// Number of addressable global variables. Zero is valid and means the
    /// effect simply exposes no parameters.
    fn variable_count(&self) -> usize;

    /// Reflected description of a variable.
    fn variable(&self, var: VariableHandle) -> Option<VariableDesc>;

    /// Looks up a variable annotation by exact name.
    fn annotation(&self, var: VariableHandle, name: &str) -> Option<AnnotationValue>;

    /// Reads the current value of a variable's parameter storage.
    fn read(&self, var: VariableHandle) -> Option<EffectValue>;

    /// Writes a variable's parameter storage, type-checked against the
    /// declared shape.
    fn write(&mut self, var: VariableHandle, value: EffectValue) -> Result<(), EffectError>;

    /// Number of techniques. An effect with zero techniques cannot be used.
    fn technique_count(&self) -> usize;

    /// Technique by index.
    fn technique(&self, index: usize) -> Option<&TechniqueDesc>;

    /// Finds a technique index by name.
    fn technique_by_name(&self, name: &str) -> Option<usize> {
        (0..self.technique_count()).find(|&i| {
            self.technique(i)
                .map(|t| t.name == name)
                .unwrap_or(false)
        })
    }
}

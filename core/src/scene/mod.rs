//! Frame-scoped scene-light snapshot.
//!
//! Each draw, the host hands the engine an ordered list of
//! [`SceneLightInfo`] entries describing the active lights: a category tag
//! and a set of named sub-parameters with stock semantics (world position,
//! direction, intensity, color, shadow data, cone angles, decay).
//!
//! The snapshot is valid for the current draw call only. The engine must
//! never keep one across frames; only the owning [`ObjectId`](crate::handle::ObjectId)
//! may be cached, and it has to be re-resolved before reuse.

use glam::{Mat4, Vec2, Vec3};

use crate::handle::{ObjectId, TextureHandle};

/// Category of a scene light.
///
/// The numeric codes returned by [`code`](LightCategory::code) are written
/// to shader `LightType` parameters and are stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightCategory {
    /// Category could not be determined.
    Undefined,
    /// Omnidirectional light with a position.
    Point,
    /// Cone light with position and direction.
    Spot,
    /// Parallel light with a direction only.
    Directional,
    /// Non-positional fill light.
    Ambient,
    /// Light emitted from a volume.
    Volume,
    /// Light emitted from a rectangle (four corner positions).
    Area,
    /// The synthetic headlamp supplied in default-lighting mode. Reported
    /// to shaders as [`Directional`](LightCategory::Directional).
    Default,
}

impl LightCategory {
    /// Stable integer code for shader `LightType` parameters.
    pub fn code(self) -> i32 {
        match self {
            Self::Undefined => 0,
            Self::Point => 1,
            Self::Spot => 2,
            Self::Directional | Self::Default => 3,
            Self::Ambient => 4,
            Self::Volume => 5,
            Self::Area => 6,
        }
    }
}

/// Stock meaning of a scene-light sub-parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockSemantic {
    /// World-space position. Area lights expose one per corner.
    WorldPosition,
    /// World-space direction.
    WorldDirection,
    /// Scalar intensity.
    Intensity,
    /// Light color.
    Color,
    /// Whether shadow casting is globally enabled in the view.
    GlobalShadowOn,
    /// Whether this light casts shadows.
    ShadowOn,
    /// Shadow-map view-projection matrix.
    ShadowViewProj,
    /// Shadow-map resource.
    ShadowMap,
    /// Shadow tint color.
    ShadowColor,
    /// Shadow depth bias.
    ShadowBias,
    /// Whether the shadow map is stale and must not be sampled.
    ShadowDirty,
    /// Cosines of the cone and penumbra angles (spot lights).
    CosConeAngle,
    /// Distance decay exponent.
    DecayRate,
    /// No stock meaning.
    None,
}

/// Value of a scene-light sub-parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightValue {
    /// Scalar.
    Float(f32),
    /// Two components (e.g. cone/penumbra cosines).
    Vec2(Vec2),
    /// Three components.
    Vec3(Vec3),
    /// Integer (also used for boolean flags).
    Int(i32),
    /// Boolean flag.
    Bool(bool),
    /// 4x4 matrix.
    Matrix(Mat4),
    /// GPU resource handle.
    Texture(TextureHandle),
}

impl LightValue {
    /// Scalar content, if any.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Three-component content, if any.
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Flag content; integers count non-zero as true.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(v) => Some(*v != 0),
            _ => None,
        }
    }
}

/// One named sub-parameter of a scene light.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLightParameter {
    /// Host-side parameter name.
    pub name: String,
    /// Stock meaning.
    pub semantic: StockSemantic,
    /// Current value.
    pub value: LightValue,
}

/// Snapshot of one active scene light for the current draw call.
///
/// Hosts typically build these from their draw context each frame. The
/// merged-ambient entry (all scene ambient lights blended into one) carries
/// `source: None` by convention, since no single scene object owns it.
///
/// # Example
///
/// ```
/// use fxlight_core::handle::ObjectId;
/// use fxlight_core::scene::SceneLightInfo;
/// use glam::Vec3;
///
/// let key = SceneLightInfo::spot(
///     ObjectId::new(1),
///     Vec3::new(0.0, 5.0, 0.0),
///     Vec3::NEG_Y,
///     Vec3::ONE,
///     2.0,
///     0.95,
///     0.9,
/// );
/// assert_eq!(key.float(fxlight_core::scene::StockSemantic::Intensity), Some(2.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLightInfo {
    /// Light category.
    pub category: LightCategory,
    /// Owning scene object, if one exists.
    pub source: Option<ObjectId>,
    /// Whether the light is enabled this frame.
    pub enabled: bool,
    /// Named sub-parameters.
    pub parameters: Vec<SceneLightParameter>,
}

impl SceneLightInfo {
    /// Creates a light with no parameters.
    pub fn new(category: LightCategory, source: Option<ObjectId>) -> Self {
        Self {
            category,
            source,
            enabled: true,
            parameters: Vec::new(),
        }
    }

    /// A point light.
    pub fn point(source: ObjectId, position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self::new(LightCategory::Point, Some(source))
            .with_parameter("position", StockSemantic::WorldPosition, LightValue::Vec3(position))
            .with_parameter("color", StockSemantic::Color, LightValue::Vec3(color))
            .with_parameter("intensity", StockSemantic::Intensity, LightValue::Float(intensity))
    }

    /// A spot light. `cos_cone` and `cos_penumbra` are cosines of the
    /// full cone and penumbra angles.
    pub fn spot(
        source: ObjectId,
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        cos_cone: f32,
        cos_penumbra: f32,
    ) -> Self {
        Self::new(LightCategory::Spot, Some(source))
            .with_parameter("position", StockSemantic::WorldPosition, LightValue::Vec3(position))
            .with_parameter("direction", StockSemantic::WorldDirection, LightValue::Vec3(direction))
            .with_parameter("color", StockSemantic::Color, LightValue::Vec3(color))
            .with_parameter("intensity", StockSemantic::Intensity, LightValue::Float(intensity))
            .with_parameter(
                "cosConeAngle",
                StockSemantic::CosConeAngle,
                LightValue::Vec2(Vec2::new(cos_cone, cos_penumbra)),
            )
    }

    /// A directional light.
    pub fn directional(source: ObjectId, direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self::new(LightCategory::Directional, Some(source))
            .with_parameter("direction", StockSemantic::WorldDirection, LightValue::Vec3(direction))
            .with_parameter("color", StockSemantic::Color, LightValue::Vec3(color))
            .with_parameter("intensity", StockSemantic::Intensity, LightValue::Float(intensity))
    }

    /// The merged ambient entry. No owning object: the host blends every
    /// scene ambient light into this one.
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Self::new(LightCategory::Ambient, None)
            .with_parameter("color", StockSemantic::Color, LightValue::Vec3(color))
            .with_parameter("intensity", StockSemantic::Intensity, LightValue::Float(intensity))
    }

    /// An area light with four corner positions (`LP0`..`LP3`).
    pub fn area(source: ObjectId, corners: [Vec3; 4], color: Vec3, intensity: f32) -> Self {
        let mut light = Self::new(LightCategory::Area, Some(source));
        for (i, corner) in corners.iter().enumerate() {
            light = light.with_parameter(
                format!("LP{i}"),
                StockSemantic::WorldPosition,
                LightValue::Vec3(*corner),
            );
        }
        light
            .with_parameter("color", StockSemantic::Color, LightValue::Vec3(color))
            .with_parameter("intensity", StockSemantic::Intensity, LightValue::Float(intensity))
    }

    /// The synthetic headlamp used in default-lighting mode. Owns no scene
    /// object.
    pub fn headlamp(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self::new(LightCategory::Default, None)
            .with_parameter("direction", StockSemantic::WorldDirection, LightValue::Vec3(direction))
            .with_parameter("color", StockSemantic::Color, LightValue::Vec3(color))
            .with_parameter("intensity", StockSemantic::Intensity, LightValue::Float(intensity))
    }

    /// Adds a named sub-parameter.
    #[must_use]
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        semantic: StockSemantic,
        value: LightValue,
    ) -> Self {
        self.parameters.push(SceneLightParameter {
            name: name.into(),
            semantic,
            value,
        });
        self
    }

    /// Attaches a shadow map and its view-projection matrix.
    #[must_use]
    pub fn with_shadow_map(self, map: TextureHandle, view_proj: Mat4) -> Self {
        self.with_parameter("shadowMap", StockSemantic::ShadowMap, LightValue::Texture(map))
            .with_parameter(
                "shadowViewProj",
                StockSemantic::ShadowViewProj,
                LightValue::Matrix(view_proj),
            )
    }

    /// Sets the global and per-light shadow flags.
    #[must_use]
    pub fn with_shadow_flags(self, global_on: bool, local_on: bool) -> Self {
        self.with_parameter(
            "globalShadowOn",
            StockSemantic::GlobalShadowOn,
            LightValue::Int(global_on as i32),
        )
        .with_parameter("shadowOn", StockSemantic::ShadowOn, LightValue::Int(local_on as i32))
    }

    /// Sets the shadow depth bias.
    #[must_use]
    pub fn with_shadow_bias(self, bias: f32) -> Self {
        self.with_parameter("shadowBias", StockSemantic::ShadowBias, LightValue::Float(bias))
    }

    /// Sets the shadow tint color.
    #[must_use]
    pub fn with_shadow_color(self, color: Vec3) -> Self {
        self.with_parameter("shadowColor", StockSemantic::ShadowColor, LightValue::Vec3(color))
    }

    /// Marks the shadow map stale for this frame.
    #[must_use]
    pub fn with_shadow_dirty(self, dirty: bool) -> Self {
        self.with_parameter("shadowDirty", StockSemantic::ShadowDirty, LightValue::Int(dirty as i32))
    }

    /// Sets the distance decay exponent.
    #[must_use]
    pub fn with_decay_rate(self, rate: f32) -> Self {
        self.with_parameter("decayRate", StockSemantic::DecayRate, LightValue::Float(rate))
    }

    /// Marks the light disabled this frame.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Iterates the values of every parameter carrying the semantic.
    pub fn values(&self, semantic: StockSemantic) -> impl Iterator<Item = &LightValue> {
        self.parameters
            .iter()
            .filter(move |p| p.semantic == semantic)
            .map(|p| &p.value)
    }

    /// First value carrying the semantic.
    pub fn first(&self, semantic: StockSemantic) -> Option<&LightValue> {
        self.values(semantic).next()
    }

    /// First scalar carrying the semantic.
    pub fn float(&self, semantic: StockSemantic) -> Option<f32> {
        self.first(semantic).and_then(LightValue::as_float)
    }

    /// First three-component value carrying the semantic.
    pub fn vec3(&self, semantic: StockSemantic) -> Option<Vec3> {
        self.first(semantic).and_then(LightValue::as_vec3)
    }

    /// Looks up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&SceneLightParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

static_assertions::assert_impl_all!(SceneLightInfo: Send, Sync);

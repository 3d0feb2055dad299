//! Scene-light value transfer.
//!
//! Moves host light attributes into shader parameter storage for one
//! (logical light, scene light) pair. The scene light is scanned once into
//! a [`LightSample`]; each owned parameter is then written from the sample
//! according to its role.

use glam::{Mat4, Vec3};

use fxlight_core::effect::EffectValue;
use fxlight_core::handle::{ObjectId, SceneResolver, TextureHandle};
use fxlight_core::scene::{LightValue, SceneLightInfo, StockSemantic};

use crate::instance::ShaderInstance;
use crate::reflect::ParameterType;
use crate::semantic::{LightKind, LightRole};

/// Everything a scene light can contribute, gathered in one scan.
#[derive(Debug)]
struct LightSample {
    positions: Vec<Vec3>,
    corners: [Option<Vec3>; 4],
    direction: Vec3,
    intensity: f32,
    decay_rate: f32,
    color: Vec3,
    global_shadows: bool,
    local_shadows: bool,
    shadow_dirty: bool,
    shadow_map: Option<TextureHandle>,
    shadow_view_proj: Mat4,
    shadow_color: Vec3,
    shadow_bias: f32,
    cos_cone: Option<f32>,
    cos_penumbra: Option<f32>,
}

impl LightSample {
    fn gather(light: &SceneLightInfo) -> Self {
        let mut sample = Self {
            positions: Vec::new(),
            corners: [None; 4],
            direction: Vec3::ZERO,
            intensity: 1.0,
            decay_rate: 0.0,
            color: Vec3::ONE,
            global_shadows: false,
            local_shadows: false,
            shadow_dirty: false,
            shadow_map: None,
            shadow_view_proj: Mat4::IDENTITY,
            shadow_color: Vec3::ZERO,
            shadow_bias: 0.0,
            cos_cone: None,
            cos_penumbra: None,
        };

        for parameter in &light.parameters {
            match (parameter.semantic, parameter.value) {
                (StockSemantic::WorldPosition, LightValue::Vec3(p)) => {
                    sample.positions.push(p);
                    // Area lights expose their corners as LP0..LP3.
                    for slot in 0..4 {
                        if parameter.name == format!("LP{slot}") {
                            sample.corners[slot] = Some(p);
                        }
                    }
                }
                (StockSemantic::WorldDirection, LightValue::Vec3(d)) => sample.direction = d,
                (StockSemantic::Intensity, LightValue::Float(i)) => sample.intensity = i,
                (StockSemantic::DecayRate, LightValue::Float(d)) => sample.decay_rate = d,
                (StockSemantic::Color, LightValue::Vec3(c)) => sample.color = c,
                (StockSemantic::GlobalShadowOn, value) => {
                    sample.global_shadows = value.as_flag().unwrap_or(false);
                }
                (StockSemantic::ShadowOn, value) => {
                    sample.local_shadows = value.as_flag().unwrap_or(false);
                }
                (StockSemantic::ShadowDirty, value) => {
                    sample.shadow_dirty = value.as_flag().unwrap_or(false);
                }
                (StockSemantic::ShadowMap, LightValue::Texture(map)) => sample.shadow_map = Some(map),
                (StockSemantic::ShadowViewProj, LightValue::Matrix(m)) => sample.shadow_view_proj = m,
                (StockSemantic::ShadowColor, LightValue::Vec3(c)) => sample.shadow_color = c,
                (StockSemantic::ShadowBias, LightValue::Float(b)) => sample.shadow_bias = b,
                (StockSemantic::CosConeAngle, LightValue::Vec2(v)) => {
                    sample.cos_cone = Some(v.x);
                    sample.cos_penumbra = Some(v.y);
                }
                (StockSemantic::CosConeAngle, LightValue::Float(c)) => sample.cos_cone = Some(c),
                _ => {}
            }
        }

        sample
    }

    /// One representative position: the mean of every position parameter,
    /// so a four-corner area light collapses into a single slot.
    fn average_position(&self) -> Vec3 {
        if self.positions.is_empty() {
            return Vec3::ZERO;
        }
        self.positions.iter().sum::<Vec3>() / self.positions.len() as f32
    }

    fn corner(&self, slot: usize) -> Vec3 {
        self.corners[slot].unwrap_or_else(|| self.average_position())
    }

    /// Shadows apply only when globally enabled, cast by this light, and
    /// backed by a shadow map that is current.
    fn shadows_usable(&self) -> bool {
        self.global_shadows && self.local_shadows && self.shadow_map.is_some() && !self.shadow_dirty
    }

    fn hotspot_radians(&self, default: f32) -> f32 {
        match self.cos_cone {
            Some(c) => c.clamp(-1.0, 1.0).acos(),
            None => default,
        }
    }

    fn falloff_radians(&self) -> f32 {
        match self.cos_penumbra {
            Some(c) => c.clamp(-1.0, 1.0).acos(),
            None => 0.0,
        }
    }
}

fn vec3_value(v: Vec3) -> EffectValue {
    EffectValue::FloatVec(vec![v.x, v.y, v.z])
}

/// Adapts a transfer value to the declared scalar type of the parameter it
/// lands in, so a shader is free to declare e.g. its enable flag as float.
fn coerce(value: EffectValue, ty: ParameterType) -> EffectValue {
    match (ty, value) {
        (ParameterType::Float, EffectValue::Int(v)) => EffectValue::Float(v as f32),
        (ParameterType::Float, EffectValue::Bool(v)) => EffectValue::Float(v as i32 as f32),
        (ParameterType::Int | ParameterType::Enum, EffectValue::Bool(v)) => EffectValue::Int(v as i32),
        (ParameterType::Int | ParameterType::Enum, EffectValue::Float(v)) => EffectValue::Int(v as i32),
        (ParameterType::Bool, EffectValue::Int(v)) => EffectValue::Bool(v != 0),
        (ParameterType::Bool, EffectValue::Float(v)) => EffectValue::Bool(v != 0.0),
        (_, value) => value,
    }
}

impl ShaderInstance {
    /// Pushes one scene light's attributes into every parameter of a
    /// logical light.
    ///
    /// `dim_ambient` is set in preview/default-light contexts, where an
    /// ambient group's color is toned down to keep the preview from
    /// washing out.
    pub(crate) fn connect_light(&mut self, group: usize, light: &SceneLightInfo, dim_ambient: bool) {
        let sample = LightSample::gather(light);
        let group_kind = self.lights[group].kind();
        let default_hotspot = self.options.default_hotspot;
        let dim = self.options.preview_ambient_dim;

        for (param, role) in self.lights[group].role_list() {
            let value = match role {
                LightRole::LightType => EffectValue::Int(light.category.code()),
                LightRole::Enable => EffectValue::Bool(true),
                LightRole::Color
                | LightRole::AmbientColor
                | LightRole::SpecularColor
                | LightRole::DiffuseColor => {
                    let mut color = sample.color;
                    if dim_ambient && group_kind == LightKind::Ambient {
                        color *= dim;
                    }
                    vec3_value(color)
                }
                LightRole::Position => vec3_value(sample.average_position()),
                LightRole::AreaPosition0 => vec3_value(sample.corner(0)),
                LightRole::AreaPosition1 => vec3_value(sample.corner(1)),
                LightRole::AreaPosition2 => vec3_value(sample.corner(2)),
                LightRole::AreaPosition3 => vec3_value(sample.corner(3)),
                LightRole::Direction => vec3_value(sample.direction),
                LightRole::Intensity => EffectValue::Float(sample.intensity),
                LightRole::DecayRate => EffectValue::Float(sample.decay_rate),
                LightRole::ShadowMapBias => EffectValue::Float(sample.shadow_bias),
                LightRole::ShadowColor => vec3_value(sample.shadow_color),
                LightRole::ShadowOn => EffectValue::Bool(sample.shadows_usable()),
                LightRole::ShadowViewProj => EffectValue::Matrix(sample.shadow_view_proj),
                LightRole::ShadowMap => EffectValue::Texture(sample.shadow_map),
                LightRole::Hotspot => EffectValue::Float(sample.hotspot_radians(default_hotspot)),
                LightRole::Falloff => EffectValue::Float(sample.falloff_radians()),
            };
            self.write_role(param, value);
        }
    }

    /// Reads a connected ambient light straight from the scene object.
    ///
    /// Returns false when the object is not an ambient light (or no longer
    /// resolves), in which case the caller turns the group off.
    pub(crate) fn connect_explicit_ambient(
        &mut self,
        group: usize,
        id: ObjectId,
        resolver: &dyn SceneResolver,
    ) -> bool {
        let Some(info) = resolver.ambient_info(id) else {
            return false;
        };

        for (param, role) in self.lights[group].role_list() {
            let value = match role {
                LightRole::LightType => {
                    EffectValue::Int(fxlight_core::scene::LightCategory::Ambient.code())
                }
                LightRole::Enable => EffectValue::Bool(true),
                LightRole::Color
                | LightRole::AmbientColor
                | LightRole::SpecularColor
                | LightRole::DiffuseColor => vec3_value(info.color),
                LightRole::Intensity => EffectValue::Float(info.intensity),
                _ => continue,
            };
            self.write_role(param, value);
        }
        true
    }

    /// Deterministically turns a logical light off: enable false, colors
    /// and intensity zeroed. Nothing is left at a stale value.
    pub(crate) fn turn_off_light(&mut self, group: usize) {
        for (param, role) in self.lights[group].role_list() {
            let value = match role {
                LightRole::Enable => EffectValue::Bool(false),
                LightRole::Color
                | LightRole::AmbientColor
                | LightRole::SpecularColor
                | LightRole::DiffuseColor => vec3_value(Vec3::ZERO),
                LightRole::Intensity => EffectValue::Float(0.0),
                _ => continue,
            };
            self.write_role(param, value);
        }
    }

    fn write_role(&mut self, param: usize, value: EffectValue) {
        let ty = self.parameters[param].uniform.ty;
        let var = self.parameters[param].uniform.var;
        let value = coerce(value, ty);
        if let Err(err) = self.effect.write(var, value) {
            log::warn!(
                "failed to transfer light value to '{}': {err}",
                self.parameters[param].uniform.name
            );
        }
    }
}

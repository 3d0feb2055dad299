//! Shader instance facade.
//!
//! A [`ShaderInstance`] owns one loaded effect and everything derived from
//! it: the classified parameter list, the logical lights, binding state and
//! pending notifications. The host drives it through three capabilities:
//! load (construction and technique switching), per-frame update
//! ([`on_update`](ShaderInstance::on_update), defined in the binding
//! module) and queries.

use fxlight_core::effect::{AnnotationValue, Effect, EffectValue, TechniqueDesc};
use fxlight_core::handle::{ObjectId, SceneResolver};

use crate::error::ShaderError;
use crate::groups::{build_light_groups, BindingMode, BindingState, LogicalLight};
use crate::notify::{Notification, NotificationQueue};
use crate::reflect::reflect_uniforms;
use crate::semantic::{ClassifiedParameter, LightKind, LightRole, SemanticClassifier};
use crate::ui::ParameterFlags;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub(crate) preview_ambient_dim: f32,
    pub(crate) variable_name_as_attribute_name: bool,
    pub(crate) default_hotspot: f32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            preview_ambient_dim: 0.15,
            variable_name_as_attribute_name: true,
            // Hosts that supply no cone data get a 40 degree hotspot.
            default_hotspot: 40f32.to_radians(),
        }
    }
}

impl EngineOptions {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factor applied to ambient colors in preview/default-light contexts,
    /// so previews are not blown out.
    #[must_use]
    pub fn with_preview_ambient_dim(mut self, factor: f32) -> Self {
        self.preview_ambient_dim = factor;
        self
    }

    /// Whether variable names (rather than `UIName` annotations) become the
    /// host-facing parameter names. Technique annotations can override this
    /// per effect.
    #[must_use]
    pub fn with_variable_name_as_attribute_name(mut self, enabled: bool) -> Self {
        self.variable_name_as_attribute_name = enabled;
        self
    }

    /// Hotspot angle, in radians, used when a scene light provides no cone
    /// data.
    #[must_use]
    pub fn with_default_hotspot(mut self, radians: f32) -> Self {
        self.default_hotspot = radians;
        self
    }
}

/// Render behavior declared by the selected technique's annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TechniqueTraits {
    /// The technique manages device state itself.
    pub overrides_draw_state: bool,
    /// The technique renders transparent geometry.
    pub is_transparent: bool,
}

/// A loaded shader program with its reflected parameters and light
/// bindings.
pub struct ShaderInstance {
    pub(crate) effect: Box<dyn Effect>,
    pub(crate) options: EngineOptions,
    technique_index: usize,
    technique: TechniqueDesc,
    technique_traits: TechniqueTraits,
    pub(crate) parameters: Vec<ClassifiedParameter>,
    pub(crate) stored: Vec<EffectValue>,
    pub(crate) lights: Vec<LogicalLight>,
    ui_group_names: Vec<String>,
    diagnostics: Vec<String>,
    pub(crate) notifications: NotificationQueue,
    pub(crate) last_frame_stamp: Option<u64>,
    pub(crate) implicit_ambient: Option<usize>,
    pub(crate) shadow_backup: Option<Vec<(usize, bool)>>,
}

impl ShaderInstance {
    /// Loads an effect, selecting its first technique.
    ///
    /// Fails with [`ShaderError::NoTechniques`] when the effect exposes no
    /// techniques at all; an effect with techniques but no parameters loads
    /// fine.
    pub fn load(effect: Box<dyn Effect>, options: EngineOptions) -> Result<Self, ShaderError> {
        if effect.technique_count() == 0 {
            return Err(ShaderError::NoTechniques);
        }

        let mut instance = Self {
            effect,
            options,
            technique_index: 0,
            technique: TechniqueDesc::new(""),
            technique_traits: TechniqueTraits::default(),
            parameters: Vec::new(),
            stored: Vec::new(),
            lights: Vec::new(),
            ui_group_names: Vec::new(),
            diagnostics: Vec::new(),
            notifications: NotificationQueue::new(),
            last_frame_stamp: None,
            implicit_ambient: None,
            shadow_backup: None,
        };
        instance.rebuild(0)?;
        Ok(instance)
    }

    /// Switches to the named technique, rebuilding parameters and light
    /// groups. Different techniques may reflect different variable sets.
    pub fn set_technique(&mut self, name: &str) -> Result<(), ShaderError> {
        let index = self
            .effect
            .technique_by_name(name)
            .ok_or_else(|| ShaderError::TechniqueNotFound(name.to_string()))?;
        self.rebuild(index)
    }

    /// Switches to a technique by index.
    pub fn set_technique_index(&mut self, index: usize) -> Result<(), ShaderError> {
        if index >= self.effect.technique_count() {
            return Err(ShaderError::TechniqueNotFound(format!("#{index}")));
        }
        self.rebuild(index)
    }

    fn rebuild(&mut self, technique_index: usize) -> Result<(), ShaderError> {
        let technique = self
            .effect
            .technique(technique_index)
            .ok_or_else(|| ShaderError::TechniqueNotFound(format!("#{technique_index}")))?
            .clone();

        let variable_name_as_attribute_name = technique
            .annotation("VariableNameAsAttributeName")
            .and_then(AnnotationValue::as_bool)
            .unwrap_or(self.options.variable_name_as_attribute_name);

        let technique_traits = TechniqueTraits {
            overrides_draw_state: technique
                .annotation("overridesDrawState")
                .and_then(AnnotationValue::as_bool)
                .unwrap_or(false),
            is_transparent: technique
                .annotation("isTransparent")
                .and_then(AnnotationValue::as_bool)
                .unwrap_or(false),
        };

        let mut classifier = SemanticClassifier::new();
        let mut parameters: Vec<ClassifiedParameter> = reflect_uniforms(&*self.effect)
            .into_iter()
            .enumerate()
            .filter_map(|(order, uniform)| {
                classifier.classify(
                    &*self.effect,
                    uniform,
                    order as i32,
                    variable_name_as_attribute_name,
                )
            })
            .collect();

        // Stable, so equal orders keep reflection order.
        parameters.sort_by_key(|p| p.ui.order);

        let (light_names, ui_group_names, warnings) = classifier.finish();

        self.stored = parameters.iter().map(|p| p.uniform.default.clone()).collect();
        self.lights = build_light_groups(&parameters, &light_names);
        self.parameters = parameters;
        self.ui_group_names = ui_group_names;
        self.diagnostics = warnings;
        self.technique_index = technique_index;
        self.technique_traits = technique_traits;
        self.last_frame_stamp = None;
        self.implicit_ambient = None;
        self.shadow_backup = None;

        log::info!(
            "loaded technique '{}': {} parameters, {} light groups",
            technique.name,
            self.parameters.len(),
            self.lights.len()
        );
        self.technique = technique;

        Ok(())
    }

    // -----------------------------------------------------------------
    // Technique queries
    // -----------------------------------------------------------------

    /// Names of all techniques on the effect.
    pub fn technique_names(&self) -> Vec<String> {
        (0..self.effect.technique_count())
            .filter_map(|i| self.effect.technique(i).map(|t| t.name.clone()))
            .collect()
    }

    /// The selected technique.
    pub fn technique(&self) -> &TechniqueDesc {
        &self.technique
    }

    /// Index of the selected technique.
    pub fn technique_index(&self) -> usize {
        self.technique_index
    }

    /// Render behavior declared by the selected technique.
    pub fn technique_traits(&self) -> TechniqueTraits {
        self.technique_traits
    }

    // -----------------------------------------------------------------
    // Parameter queries and editing
    // -----------------------------------------------------------------

    /// Read-only access to the underlying effect.
    pub fn effect(&self) -> &dyn Effect {
        &*self.effect
    }

    /// Number of exposed parameters.
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Host-facing names of all exposed parameters, in display order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.ui.display_name.as_str()).collect()
    }

    /// Presentation flags of a parameter.
    pub fn parameter_flags(&self, name: &str) -> Result<ParameterFlags, ShaderError> {
        self.parameter_index(name)
            .map(|index| self.parameters[index].ui.flags)
    }

    /// Classification warnings accumulated at load time.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Drains pending host notifications. Call once per idle tick.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Edits a parameter value.
    ///
    /// The value lands both in the effect storage and in the stored
    /// snapshot that binding passes restore from, so an edit survives a
    /// light group being reset. Parameters locked by a light binding reject
    /// edits.
    pub fn set_parameter(&mut self, name: &str, value: EffectValue) -> Result<(), ShaderError> {
        let index = self.parameter_index(name)?;
        if self.parameters[index].ui.flags.contains(ParameterFlags::LOCKED) {
            return Err(ShaderError::ParameterLocked(name.to_string()));
        }
        self.effect.write(self.parameters[index].uniform.var, value.clone())?;
        self.stored[index] = value;
        Ok(())
    }

    /// Reads a parameter's current storage value.
    pub fn parameter_value(&self, name: &str) -> Result<EffectValue, ShaderError> {
        let index = self.parameter_index(name)?;
        self.effect
            .read(self.parameters[index].uniform.var)
            .ok_or_else(|| ShaderError::UnknownParameter(name.to_string()))
    }

    fn parameter_index(&self, name: &str) -> Result<usize, ShaderError> {
        self.parameters
            .iter()
            .position(|p| p.ui.display_name == name || p.uniform.name == name)
            .ok_or_else(|| ShaderError::UnknownParameter(name.to_string()))
    }

    // -----------------------------------------------------------------
    // UI group queries
    // -----------------------------------------------------------------

    /// Names of all UI groups, in first-seen order.
    pub fn ui_groups(&self) -> &[String] {
        &self.ui_group_names
    }

    /// Host-facing names of the visible parameters in a UI group.
    pub fn parameters_for_ui_group(&self, name: &str) -> Vec<&str> {
        let Some(group) = self.ui_group_names.iter().position(|n| n == name) else {
            return Vec::new();
        };
        self.parameters
            .iter()
            .filter(|p| p.ui.group == Some(group) && !p.ui.flags.contains(ParameterFlags::HIDDEN))
            .map(|p| p.ui.display_name.as_str())
            .collect()
    }

    // -----------------------------------------------------------------
    // Light group queries and connections
    // -----------------------------------------------------------------

    /// Light groups as (name, expected category) pairs.
    pub fn light_groups(&self) -> Vec<(&str, LightKind)> {
        self.lights.iter().map(|l| (l.name(), l.kind())).collect()
    }

    /// Host-facing names of the visible parameters in a light group.
    pub fn parameters_for_group(&self, group: &str) -> Result<Vec<&str>, ShaderError> {
        let index = self.group_index(group)?;
        Ok(self.lights[index]
            .roles()
            .map(|(param, _)| param)
            .filter(|&param| {
                !self.parameters[param].ui.flags.contains(ParameterFlags::HIDDEN)
            })
            .map(|param| self.parameters[param].ui.display_name.as_str())
            .collect())
    }

    /// Current binding state of a light group.
    pub fn binding_state(&self, group: &str) -> Result<BindingState, ShaderError> {
        Ok(self.lights[self.group_index(group)?].binding_state())
    }

    /// Name of the scene object currently driving a light group, the
    /// literal `"ambient"` for an automatic bind against the merged ambient
    /// entry, or `None`.
    pub fn binding_source(
        &self,
        group: &str,
        resolver: &dyn SceneResolver,
    ) -> Result<Option<String>, ShaderError> {
        let index = self.group_index(group)?;
        let light = &self.lights[index];

        match light.mode {
            BindingMode::Explicit(id) => Ok(resolver.object_name(id)),
            BindingMode::Automatic => {
                if let Some(id) = light.cached {
                    if resolver.is_live(id) {
                        return Ok(resolver.object_name(id));
                    }
                }
                if self.implicit_ambient == Some(index) && light.bound {
                    return Ok(Some("ambient".to_string()));
                }
                Ok(None)
            }
            BindingMode::ShaderSettings => Ok(None),
        }
    }

    /// Pins a light group to a specific scene object.
    ///
    /// The group's parameters lock immediately; automatic matching will
    /// never reassign it.
    pub fn connect(&mut self, group: &str, object: ObjectId) -> Result<(), ShaderError> {
        let index = self.group_index(group)?;
        if let Some(cached) = self.lights[index].cached.take() {
            self.notifications.require_shadow_map(cached, false);
        }
        self.lights[index].bound = false;
        self.lights[index].mode = BindingMode::Explicit(object);
        self.lights[index].dirty = true;
        self.set_group_locked(index, true);
        self.notifications.mark_bindings_changed();
        Ok(())
    }

    /// Releases a light group back to automatic matching.
    pub fn disconnect(&mut self, group: &str) -> Result<(), ShaderError> {
        let index = self.group_index(group)?;
        self.release_group(index, BindingMode::Automatic);
        Ok(())
    }

    /// Puts a light group in shader-settings mode: no scene light drives
    /// it and its parameters stay editable.
    pub fn use_shader_settings(&mut self, group: &str) -> Result<(), ShaderError> {
        let index = self.group_index(group)?;
        self.release_group(index, BindingMode::ShaderSettings);
        Ok(())
    }

    fn release_group(&mut self, index: usize, mode: BindingMode) {
        if let BindingMode::Explicit(id) = self.lights[index].mode {
            self.notifications.require_shadow_map(id, false);
        }
        if let Some(cached) = self.lights[index].cached.take() {
            self.notifications.require_shadow_map(cached, false);
        }
        self.lights[index].bound = false;
        self.lights[index].mode = mode;
        self.lights[index].dirty = true;
        self.set_group_locked(index, false);
        self.notifications.mark_bindings_changed();
    }

    pub(crate) fn group_index(&self, group: &str) -> Result<usize, ShaderError> {
        self.lights
            .iter()
            .position(|l| l.name() == group)
            .ok_or_else(|| ShaderError::UnknownLightGroup(group.to_string()))
    }

    /// Locks or unlocks every visible parameter of a light group.
    pub(crate) fn set_group_locked(&mut self, group: usize, locked: bool) {
        for (param, _) in self.lights[group].role_list() {
            let flags = &mut self.parameters[param].ui.flags;
            if flags.contains(ParameterFlags::HIDDEN) {
                continue;
            }
            flags.set(ParameterFlags::LOCKED, locked);
        }
    }

    // -----------------------------------------------------------------
    // Per-geometry shadow state
    // -----------------------------------------------------------------

    /// Adjusts every shadow-enable parameter for the geometry about to be
    /// drawn.
    ///
    /// Whether shadows apply depends both on the bound lights (resolved
    /// during [`on_update`](Self::on_update)) and on the geometry's own
    /// receives-shadows state, which changes from one draw to the next.
    /// The first call per frame backs up the light-resolved values; later
    /// calls AND the geometry state over that backup, so flipping between
    /// receiving and non-receiving geometry is lossless.
    pub fn set_geometry_receives_shadows(&mut self, receives: bool) {
        if self.shadow_backup.is_none() {
            let mut backup = Vec::new();
            for light in &self.lights {
                for (param, role) in light.roles() {
                    if role == LightRole::ShadowOn {
                        let var = self.parameters[param].uniform.var;
                        let current = self
                            .effect
                            .read(var)
                            .and_then(|v| v.as_bool())
                            .unwrap_or(false);
                        backup.push((param, current));
                    }
                }
            }
            self.shadow_backup = Some(backup);
        }

        let backup = self.shadow_backup.clone().unwrap_or_default();
        for (param, resolved) in backup {
            let var = self.parameters[param].uniform.var;
            if let Err(err) = self.effect.write(var, EffectValue::Bool(resolved && receives)) {
                log::warn!("failed to set shadow flag: {err}");
            }
        }
    }
}

impl std::fmt::Debug for ShaderInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderInstance")
            .field("technique", &self.technique.name)
            .field("parameter_count", &self.parameters.len())
            .field("light_group_count", &self.lights.len())
            .finish()
    }
}

//! Per-frame light binding.
//!
//! Each draw, the fixed set of logical lights is reconciled against the
//! frame's scene-light list in ordered passes:
//!
//! 1. bookkeeping - scene lights held by explicit connections are taken out
//!    of the pool; in preview contexts every group becomes rebindable
//! 2. cache reuse - a group that bound a scene object on a previous frame
//!    keeps it, provided the object is still live, present and unclaimed
//! 3. exact type match - first unclaimed scene light of the group's
//!    category (or any category, for groups that adapt)
//! 4. compatibility match - first unclaimed scene light whose attributes
//!    are a superset of what the group needs
//! 5. shutdown - groups still unbound are turned off outright, never left
//!    with stale values
//!
//! Every pass short-circuits once either side runs out of unbound entries.

use fxlight_core::handle::SceneResolver;
use fxlight_core::scene::{LightCategory, SceneLightInfo};

use crate::groups::BindingMode;
use crate::instance::ShaderInstance;
use crate::semantic::LightKind;

/// Rendering context of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Normal scene draw. Binding work is skipped when the frame stamp has
    /// not advanced since the last update.
    Scene,
    /// Material preview draw. One preview light may drive many logical
    /// lights, and prior automatic bindings are overridden.
    Preview,
    /// Preview draw that must not touch light bindings at all.
    PreviewNoOverride,
    /// Scene draw with a single synthetic light standing in for scene
    /// illumination.
    SceneWithDefaultLight,
}

/// Exact category correspondence between a logical light and a scene
/// light.
fn kind_matches(kind: LightKind, category: LightCategory) -> bool {
    matches!(
        (kind, category),
        (LightKind::Undefined, LightCategory::Undefined)
            | (LightKind::Point, LightCategory::Point)
            | (LightKind::Spot, LightCategory::Spot)
            | (LightKind::Directional, LightCategory::Directional)
            | (LightKind::Ambient, LightCategory::Ambient)
            | (LightKind::Area, LightCategory::Area)
    )
}

/// Whether a scene light provides a superset of the attributes a logical
/// light needs.
fn compatible(kind: LightKind, category: LightCategory) -> bool {
    match category {
        // A spot light provides both position and direction.
        LightCategory::Spot => true,
        // Directional lights (and the synthetic headlamp) provide only a
        // direction.
        LightCategory::Directional | LightCategory::Default => {
            matches!(kind, LightKind::Directional | LightKind::Ambient)
        }
        // Point, area and volume lights provide only a position.
        LightCategory::Point | LightCategory::Area | LightCategory::Volume => {
            matches!(kind, LightKind::Point | LightKind::Ambient)
        }
        // An ambient light provides neither.
        LightCategory::Ambient => kind == LightKind::Ambient,
        LightCategory::Undefined => false,
    }
}

impl ShaderInstance {
    /// The per-frame entry point: reconciles logical lights against the
    /// frame's scene lights and pushes bound light state into the shader.
    ///
    /// `lights` is valid for this call only; the engine caches nothing from
    /// it beyond the owning [`ObjectId`](fxlight_core::handle::ObjectId)s,
    /// which are revalidated through `resolver` on every pass.
    pub fn on_update(
        &mut self,
        mode: RenderMode,
        frame_stamp: u64,
        lights: &[SceneLightInfo],
        resolver: &dyn SceneResolver,
    ) {
        self.shadow_backup = None;

        match mode {
            RenderMode::Scene => {
                // One shader instance may draw several geometries per
                // frame; only the first draw does binding work.
                if self.last_frame_stamp == Some(frame_stamp) {
                    return;
                }
                self.last_frame_stamp = Some(frame_stamp);
            }
            RenderMode::Preview | RenderMode::SceneWithDefaultLight => {
                self.last_frame_stamp = None;
            }
            RenderMode::PreviewNoOverride => {
                self.last_frame_stamp = None;
                return;
            }
        }

        let scene_mode = mode == RenderMode::Scene;

        // A scene draw whose only light is the synthetic headlamp behaves
        // like default-light mode for binding purposes.
        let mut effective = mode;
        if scene_mode && lights.len() == 1 && lights[0].category == LightCategory::Default {
            effective = RenderMode::SceneWithDefaultLight;
        }

        self.reset_dirty_parameters(scene_mode);
        self.update_implicit_connections(effective, lights, resolver);
        if scene_mode {
            self.update_explicit_connections(lights, resolver);
        }
    }

    /// Restores the stored values of every parameter in a dirty light
    /// group (every group, in preview contexts) before binding overwrites
    /// them.
    fn reset_dirty_parameters(&mut self, scene_mode: bool) {
        let mut to_reset = Vec::new();
        for light in &mut self.lights {
            if light.dirty || !scene_mode {
                to_reset.extend(light.role_list().into_iter().map(|(index, _)| index));
                // Automatically bound groups stay dirty: the scene lights
                // are outside our control and can change at any time.
                if scene_mode && !matches!(light.mode, BindingMode::Automatic) {
                    light.dirty = false;
                }
            }
        }

        for index in to_reset {
            let var = self.parameters[index].uniform.var;
            let value = self.stored[index].clone();
            if let Err(err) = self.effect.write(var, value) {
                log::warn!("failed to restore parameter value: {err}");
            }
        }
    }

    fn update_implicit_connections(
        &mut self,
        mode: RenderMode,
        lights: &[SceneLightInfo],
        resolver: &dyn SceneResolver,
    ) {
        let scene_mode = mode == RenderMode::Scene;
        let n_scene = lights.len();
        let n_shader = self.lights.len();

        let mut scene_used = vec![false; n_scene];
        let mut treated = vec![false; n_shader];
        let mut uses_implicit = vec![false; n_shader];
        let mut remaining_shader = n_shader;
        let mut remaining_scene = n_scene;
        let mut rebound = false;

        if scene_mode {
            // Scene lights claimed by explicit connections are out of the
            // pool, independent of type compatibility.
            for group in 0..n_shader {
                if remaining_shader == 0 || remaining_scene == 0 {
                    break;
                }
                let BindingMode::Explicit(id) = self.lights[group].mode else {
                    continue;
                };
                for (si, light) in lights.iter().enumerate() {
                    if light.source == Some(id) && !scene_used[si] {
                        scene_used[si] = true;
                        remaining_scene -= 1;
                    }
                }
                if self.lights[group].cached.take().is_some() {
                    // Explicitly connected now; the automatic cache is
                    // stale and the parameters are locked.
                    self.lights[group].bound = false;
                    self.set_group_locked(group, true);
                    rebound = true;
                }
            }

            // Revalidate and reuse cached bindings.
            for group in 0..n_shader {
                if remaining_shader == 0 {
                    break;
                }
                match self.lights[group].mode {
                    BindingMode::Automatic => {
                        uses_implicit[group] = true;
                        let Some(id) = self.lights[group].cached else {
                            continue;
                        };
                        if !resolver.is_live(id) {
                            // Gone from the scene; forget it and rematch.
                            self.lights[group].cached = None;
                            self.lights[group].bound = false;
                            self.set_group_locked(group, false);
                            rebound = true;
                            continue;
                        }
                        match lights.iter().position(|l| l.source == Some(id)) {
                            Some(si) if !scene_used[si] => {
                                self.connect_light(group, &lights[si], false);
                                self.lights[group].bound = true;
                                scene_used[si] = true;
                                remaining_scene -= 1;
                                treated[group] = true;
                                remaining_shader -= 1;
                            }
                            Some(_) => {
                                // Claimed by another group this frame;
                                // release and rematch below.
                                self.notifications.require_shadow_map(id, false);
                                self.lights[group].cached = None;
                                self.lights[group].bound = false;
                                self.set_group_locked(group, false);
                                rebound = true;
                            }
                            None => {
                                // Live but not drawn this frame: keep the
                                // binding, show the light as off.
                                self.turn_off_light(group);
                                treated[group] = true;
                                remaining_shader -= 1;
                            }
                        }
                    }
                    BindingMode::Explicit(_) | BindingMode::ShaderSettings => {
                        remaining_shader -= 1;
                    }
                }
            }
        } else {
            // Preview contexts override automatic bindings; the
            // default-light context overrides shader-settings groups too.
            for group in 0..n_shader {
                if remaining_shader == 0 || remaining_scene == 0 {
                    break;
                }
                let eligible = match self.lights[group].mode {
                    BindingMode::Automatic | BindingMode::Explicit(_) => true,
                    BindingMode::ShaderSettings => mode == RenderMode::SceneWithDefaultLight,
                };
                if eligible {
                    uses_implicit[group] = true;
                } else {
                    remaining_shader -= 1;
                }
            }
        }

        if scene_mode {
            self.implicit_ambient = None;
        }

        // Exact type match.
        for group in 0..n_shader {
            if remaining_shader == 0 || remaining_scene == 0 {
                break;
            }
            if !uses_implicit[group] || treated[group] {
                continue;
            }
            let kind = self.lights[group].kind();
            let adapts = self.lights[group].adapts_any();

            for si in 0..n_scene {
                if scene_used[si] {
                    continue;
                }
                let category = lights[si].category;
                if !kind_matches(kind, category) && !adapts {
                    continue;
                }

                self.connect_light(group, &lights[si], !scene_mode);
                treated[group] = true;
                remaining_shader -= 1;

                // A preview light drives every logical light at once,
                // except for groups that adapt to the light type; those
                // consume it exclusively.
                if mode != RenderMode::Preview || adapts {
                    scene_used[si] = true;
                    remaining_scene -= 1;
                }

                if scene_mode {
                    self.record_automatic_bind(group, &lights[si]);
                    rebound = true;
                    if category == LightCategory::Ambient && self.implicit_ambient.is_none() {
                        // First automatic ambient bind wins the label; a
                        // user-connected ambient group is never masked by
                        // a second automatic one.
                        self.implicit_ambient = Some(group);
                    }
                } else {
                    self.lights[group].dirty = true;
                }
                break;
            }
        }

        // Compatibility match.
        for group in 0..n_shader {
            if remaining_shader == 0 || remaining_scene == 0 {
                break;
            }
            if !uses_implicit[group] || treated[group] {
                continue;
            }
            let kind = self.lights[group].kind();
            let adapts = self.lights[group].adapts_any();

            for si in 0..n_scene {
                if scene_used[si] {
                    continue;
                }
                if !compatible(kind, lights[si].category) {
                    continue;
                }

                self.connect_light(group, &lights[si], !scene_mode);
                treated[group] = true;
                remaining_shader -= 1;

                if mode != RenderMode::Preview || adapts {
                    scene_used[si] = true;
                    remaining_scene -= 1;
                }

                if scene_mode {
                    self.record_automatic_bind(group, &lights[si]);
                    rebound = true;
                } else {
                    self.lights[group].dirty = true;
                }
                break;
            }
        }

        // Shutdown: anything still unbound goes dark rather than keeping
        // stale values.
        for group in 0..n_shader {
            if remaining_shader == 0 {
                break;
            }
            if !uses_implicit[group] || treated[group] {
                continue;
            }
            self.turn_off_light(group);
            if !scene_mode {
                self.lights[group].dirty = true;
            }
        }

        if rebound {
            self.notifications.mark_bindings_changed();
        }
    }

    fn record_automatic_bind(&mut self, group: usize, light: &SceneLightInfo) {
        if let Some(id) = light.source {
            self.notifications.require_shadow_map(id, true);
            self.lights[group].cached = Some(id);
        } else {
            self.lights[group].cached = None;
        }
        self.lights[group].bound = true;
        self.set_group_locked(group, true);
        log::debug!(
            "light group '{}' bound to {:?}",
            self.lights[group].name(),
            light.source
        );
    }

    /// Refreshes every explicitly connected group from the frame's lights.
    ///
    /// A connection absent from the frame falls back to reading the scene
    /// object directly when the frame carries ambient lights, since the
    /// host merges all ambient sources into one anonymous entry. A
    /// connection that is absent outright means the light is hidden or
    /// disabled; the group is turned off without breaking the connection.
    fn update_explicit_connections(&mut self, lights: &[SceneLightInfo], resolver: &dyn SceneResolver) {
        for group in 0..self.lights.len() {
            let BindingMode::Explicit(id) = self.lights[group].mode else {
                continue;
            };

            let mut has_ambient = false;
            let mut enabled = false;
            let mut found = false;

            for light in lights {
                if light.source == Some(id) {
                    self.notifications.require_shadow_map(id, true);
                    self.connect_light(group, light, false);
                    enabled = light.enabled;
                    found = true;
                    break;
                }
                if light.category == LightCategory::Ambient {
                    has_ambient = true;
                }
            }

            if !found && has_ambient {
                enabled = self.connect_explicit_ambient(group, id, resolver);
            }

            if !enabled {
                self.turn_off_light(group);
            }
        }
    }
}

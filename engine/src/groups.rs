//! Logical lights.
//!
//! Classified parameters that share a group key collapse into one
//! [`LogicalLight`]: the shader-side slot a scene light can drive. The
//! logical light owns the mapping from parameter indices to light roles and
//! all per-slot binding state.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use fxlight_core::handle::ObjectId;

use crate::semantic::{ClassifiedParameter, LightKind, LightRole};

/// How a logical light acquires its driving scene light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// The engine picks a compatible scene light every frame.
    Automatic,
    /// The user pinned a specific scene object.
    Explicit(ObjectId),
    /// No scene light drives it; the shader-file values apply.
    ShaderSettings,
}

/// Observable binding state of a logical light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Pinned to a specific scene light by the user; parameters locked.
    ExplicitlyConnected,
    /// Matched to a scene light by the engine; parameters locked.
    AutomaticBound,
    /// Driven by shader-file defaults; parameters editable.
    ShaderDefault,
}

/// One light slot expected by the shader.
#[derive(Debug)]
pub struct LogicalLight {
    name: String,
    declared: LightKind,
    resolved: OnceCell<LightKind>,
    adapts_any: bool,
    params: BTreeMap<usize, LightRole>,
    /// Parameter values must be refreshed before the next binding pass.
    pub(crate) dirty: bool,
    pub(crate) mode: BindingMode,
    /// Scene object bound during the last automatic pass. Revalidated
    /// before every reuse.
    pub(crate) cached: Option<ObjectId>,
    /// An automatic binding took effect this frame or a prior one.
    pub(crate) bound: bool,
}

impl LogicalLight {
    fn new(name: String) -> Self {
        Self {
            name,
            declared: LightKind::Undefined,
            resolved: OnceCell::new(),
            adapts_any: false,
            params: BTreeMap::new(),
            dirty: true,
            mode: BindingMode::Automatic,
            cached: None,
            bound: false,
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the shader declared a `LightType` parameter, meaning its
    /// code adapts to whatever scene light it receives.
    pub fn adapts_any(&self) -> bool {
        self.adapts_any
    }

    /// The light category this slot expects.
    ///
    /// When no semantic pinned a category, it is inferred once from the
    /// role set and memoized: position and direction mean spot, an area
    /// corner means area, position alone means point, direction alone means
    /// directional, neither means ambient.
    pub fn kind(&self) -> LightKind {
        if self.declared != LightKind::Undefined {
            return self.declared;
        }
        *self.resolved.get_or_init(|| {
            let mut has_position = false;
            let mut has_corner = false;
            let mut has_direction = false;
            for role in self.params.values() {
                match role {
                    LightRole::Position => has_position = true,
                    LightRole::AreaPosition0 => has_corner = true,
                    LightRole::Direction => has_direction = true,
                    _ => {}
                }
            }
            if has_position && has_direction {
                LightKind::Spot
            } else if has_corner {
                LightKind::Area
            } else if has_position {
                LightKind::Point
            } else if has_direction {
                LightKind::Directional
            } else {
                LightKind::Ambient
            }
        })
    }

    /// Current binding state.
    pub fn binding_state(&self) -> BindingState {
        match self.mode {
            BindingMode::Explicit(_) => BindingState::ExplicitlyConnected,
            BindingMode::Automatic if self.bound => BindingState::AutomaticBound,
            _ => BindingState::ShaderDefault,
        }
    }

    /// Parameter indices and their roles, in index order.
    pub fn roles(&self) -> impl Iterator<Item = (usize, LightRole)> + '_ {
        self.params.iter().map(|(&index, &role)| (index, role))
    }

    /// Number of owned parameters.
    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// Snapshot of the role map, for passes that mutate the effect while
    /// walking it.
    pub(crate) fn role_list(&self) -> Vec<(usize, LightRole)> {
        self.roles().collect()
    }

    pub(crate) fn insert_role(&mut self, index: usize, role: LightRole) {
        self.params.insert(index, role);
    }
}

/// Clusters classified parameters into logical lights.
///
/// `light_names` is the group-name registry produced during classification;
/// the result has one logical light per name, in registry order. Each
/// parameter index lands in at most one group.
pub fn build_light_groups(
    params: &[ClassifiedParameter],
    light_names: &[String],
) -> Vec<LogicalLight> {
    let mut lights: Vec<LogicalLight> = light_names
        .iter()
        .map(|name| LogicalLight::new(name.clone()))
        .collect();

    for (index, param) in params.iter().enumerate() {
        let Some(group) = param.light_group else {
            continue;
        };
        let Some(light) = lights.get_mut(group) else {
            continue;
        };

        // A group annotation without a recognized light role contributes
        // nothing to the slot itself.
        let Some(kind) = param.light_kind else {
            continue;
        };

        if let Some(role) = param.light_role {
            if role == LightRole::LightType {
                light.adapts_any = true;
            }
            light.insert_role(index, role);
        }

        if kind != LightKind::Undefined {
            light.declared = kind;
        }
    }

    lights
}

//! Pending host notifications.
//!
//! Binding work happens on the draw path, but the host's presentation layer
//! (attribute editors, binding indicators) and its shadow-map scheduler
//! should not be poked once per rebound parameter. The engine instead
//! records pending notifications here and the host integration drains them
//! once per idle tick.

use std::collections::BTreeMap;

use fxlight_core::handle::ObjectId;

/// A deferred notification for the host integration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// One or more light groups changed their bound scene light. Any number
    /// of rebinds within one update collapse into a single notification.
    LightBindingsChanged,
    /// A scene light's shadow map became required (or stopped being
    /// required) by the current bindings.
    ShadowMapRequired {
        /// The scene light in question.
        light: ObjectId,
        /// Whether its shadow map is now needed.
        required: bool,
    },
}

/// Coalescing queue of pending notifications.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    bindings_changed: bool,
    // Last-wins per light: require-then-release within one update nets out.
    shadow_requirements: BTreeMap<ObjectId, bool>,
}

impl NotificationQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that light bindings changed.
    pub fn mark_bindings_changed(&mut self) {
        self.bindings_changed = true;
    }

    /// Records a shadow-map requirement change for a scene light.
    pub fn require_shadow_map(&mut self, light: ObjectId, required: bool) {
        self.shadow_requirements.insert(light, required);
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        !self.bindings_changed && self.shadow_requirements.is_empty()
    }

    /// Drains all pending notifications.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        if std::mem::take(&mut self.bindings_changed) {
            out.push(Notification::LightBindingsChanged);
        }
        for (light, required) in std::mem::take(&mut self.shadow_requirements) {
            out.push(Notification::ShadowMapRequired { light, required });
        }
        out
    }
}

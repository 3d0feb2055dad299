//! Opaque scene-object handles and liveness resolution.
//!
//! The binding engine never holds references into the host scene graph.
//! It remembers scene objects by [`ObjectId`] and re-resolves them through a
//! [`SceneResolver`] before every use. A handle that no longer resolves is
//! cleared, never dereferenced.

use std::collections::HashMap;

use glam::Vec3;

/// Opaque identifier of a host scene object (a light shape, typically).
///
/// Ids are assigned by the host and carry no meaning inside the engine
/// beyond identity. An id may dangle; always check it through
/// [`SceneResolver::is_live`] before reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Creates an id from a raw host value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw host value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque identifier of a GPU texture resource (e.g. a shadow map).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Creates a handle from a raw resource value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw resource value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Color and intensity of an ambient light, read directly from the owning
/// scene object rather than from a frame snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLightInfo {
    /// Light color (linear RGB).
    pub color: Vec3,
    /// Light intensity.
    pub intensity: f32,
}

/// Host scene-graph lookup interface.
///
/// Supplied to the engine on every update so cached [`ObjectId`]s can be
/// revalidated against the live scene.
pub trait SceneResolver {
    /// Returns true if the object exists and is part of the active scene.
    fn is_live(&self, id: ObjectId) -> bool;

    /// Returns the object's display name, if it resolves.
    fn object_name(&self, id: ObjectId) -> Option<String>;

    /// Reads ambient color/intensity directly from the object, if it is an
    /// ambient light. Used when a connected ambient light is hidden behind
    /// the host's merged-ambient frame entry.
    fn ambient_info(&self, id: ObjectId) -> Option<AmbientLightInfo>;
}

#[derive(Debug, Clone)]
struct SceneObjectEntry {
    name: String,
    ambient: Option<AmbientLightInfo>,
}

/// In-memory [`SceneResolver`] implementation.
///
/// A simple registry of named objects for tests and hosts without their own
/// scene graph. Removing an object makes its id dangle, which is exactly
/// what the engine's revalidation paths need to exercise.
///
/// # Example
///
/// ```
/// use fxlight_core::handle::{SceneObjects, SceneResolver};
///
/// let mut objects = SceneObjects::new();
/// let lamp = objects.add("keyLight");
/// assert!(objects.is_live(lamp));
///
/// objects.remove(lamp);
/// assert!(!objects.is_live(lamp));
/// ```
#[derive(Debug, Default)]
pub struct SceneObjects {
    entries: HashMap<ObjectId, SceneObjectEntry>,
    next_id: u64,
}

impl SceneObjects {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object and returns its id.
    pub fn add(&mut self, name: impl Into<String>) -> ObjectId {
        self.insert(name.into(), None)
    }

    /// Registers an ambient light object with its color and intensity.
    pub fn add_ambient(&mut self, name: impl Into<String>, color: Vec3, intensity: f32) -> ObjectId {
        self.insert(name.into(), Some(AmbientLightInfo { color, intensity }))
    }

    /// Removes an object. Existing ids for it become dangling.
    pub fn remove(&mut self, id: ObjectId) {
        self.entries.remove(&id);
    }

    /// Returns the number of live objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no objects are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: String, ambient: Option<AmbientLightInfo>) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId::new(self.next_id);
        self.entries.insert(id, SceneObjectEntry { name, ambient });
        id
    }
}

impl SceneResolver for SceneObjects {
    fn is_live(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    fn object_name(&self, id: ObjectId) -> Option<String> {
        self.entries.get(&id).map(|e| e.name.clone())
    }

    fn ambient_info(&self, id: ObjectId) -> Option<AmbientLightInfo> {
        self.entries.get(&id).and_then(|e| e.ambient)
    }
}

static_assertions::assert_impl_all!(ObjectId: Send, Sync);
static_assertions::assert_impl_all!(SceneObjects: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let mut objects = SceneObjects::new();
        let a = objects.add("lightA");
        let b = objects.add("lightB");
        assert_ne!(a, b);
        assert_eq!(objects.object_name(a).as_deref(), Some("lightA"));

        objects.remove(a);
        assert!(!objects.is_live(a));
        assert!(objects.is_live(b));
    }

    #[test]
    fn test_ambient_info() {
        let mut objects = SceneObjects::new();
        let plain = objects.add("spot");
        let ambient = objects.add_ambient("fill", Vec3::new(0.2, 0.2, 0.3), 0.5);

        assert!(objects.ambient_info(plain).is_none());
        let info = objects.ambient_info(ambient).unwrap();
        assert_eq!(info.intensity, 0.5);
    }
}

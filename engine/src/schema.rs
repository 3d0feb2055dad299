//! Declarative binding-schema persistence.
//!
//! The per-group binding setup (automatic / explicit / shader settings,
//! plus the connected object) is the only light state worth persisting.
//! Instead of surgically mutating host attributes, the engine produces a
//! flat schema the host can store, and reconciles a stored schema against
//! the current light groups with an explicit diff.

use fxlight_core::handle::ObjectId;

use crate::groups::BindingMode;
use crate::instance::ShaderInstance;

/// Persistable binding mode of one light group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaBindingMode {
    /// Engine picks a scene light automatically.
    Automatic,
    /// Pinned to the object in [`LightGroupSchema::connection`].
    Explicit,
    /// Shader-file values; no scene light.
    ShaderSettings,
}

/// Persistable binding setup of one light group.
#[derive(Debug, Clone, PartialEq)]
pub struct LightGroupSchema {
    /// Light group name.
    pub group: String,
    /// Binding mode.
    pub mode: SchemaBindingMode,
    /// Pinned scene object, for explicit mode.
    pub connection: Option<ObjectId>,
}

/// Result of reconciling a stored schema against the current light groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDiff {
    /// Groups whose mode was applied from the schema.
    pub applied: Vec<String>,
    /// Schema entries naming no current group (dropped).
    pub unknown: Vec<String>,
    /// Current groups the schema does not mention (left untouched).
    pub missing: Vec<String>,
}

impl ShaderInstance {
    /// Produces the persistable binding schema for all light groups.
    pub fn binding_schema(&self) -> Vec<LightGroupSchema> {
        self.lights
            .iter()
            .map(|light| {
                let (mode, connection) = match light.mode {
                    BindingMode::Automatic => (SchemaBindingMode::Automatic, None),
                    BindingMode::Explicit(id) => (SchemaBindingMode::Explicit, Some(id)),
                    BindingMode::ShaderSettings => (SchemaBindingMode::ShaderSettings, None),
                };
                LightGroupSchema {
                    group: light.name().to_string(),
                    mode,
                    connection,
                }
            })
            .collect()
    }

    /// Reconciles a stored schema against the current light groups.
    ///
    /// Entries matching a current group by name are applied; entries for
    /// groups that no longer exist are reported and dropped; groups the
    /// schema does not cover keep their current setup. An explicit entry
    /// without a connection degrades to automatic.
    pub fn apply_binding_schema(&mut self, schema: &[LightGroupSchema]) -> SchemaDiff {
        let mut diff = SchemaDiff::default();

        for entry in schema {
            let Ok(index) = self.group_index(&entry.group) else {
                diff.unknown.push(entry.group.clone());
                continue;
            };

            match (entry.mode, entry.connection) {
                (SchemaBindingMode::Explicit, Some(id)) => {
                    let name = self.lights[index].name().to_string();
                    // group_index succeeded, connect cannot fail
                    let _ = self.connect(&name, id);
                }
                (SchemaBindingMode::Explicit, None) => {
                    log::warn!(
                        "schema pins group '{}' without a connection, using automatic",
                        entry.group
                    );
                    let name = self.lights[index].name().to_string();
                    let _ = self.disconnect(&name);
                }
                (SchemaBindingMode::Automatic, _) => {
                    let name = self.lights[index].name().to_string();
                    let _ = self.disconnect(&name);
                }
                (SchemaBindingMode::ShaderSettings, _) => {
                    let name = self.lights[index].name().to_string();
                    let _ = self.use_shader_settings(&name);
                }
            }
            diff.applied.push(entry.group.clone());
        }

        for light in &self.lights {
            if !schema.iter().any(|entry| entry.group == light.name()) {
                diff.missing.push(light.name().to_string());
            }
        }

        diff
    }
}

//! Presentation metadata extraction.
//!
//! Everything here is annotation-driven and affects only how a parameter is
//! presented by the host UI. Extraction failures fall back to defaults and
//! never affect binding correctness.

use bitflags::bitflags;
use fxlight_core::effect::{AnnotationValue, Effect, VariableHandle};

use crate::reflect::{ParameterType, UniformParameter};

bitflags! {
    /// Presentation state of a parameter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParameterFlags: u32 {
        /// Not shown in the host UI.
        const HIDDEN = 1 << 0;
        /// Can be animated/keyed by the host.
        const KEYABLE = 1 << 1;
        /// Driven by a light binding; not editable.
        const LOCKED = 1 << 2;
    }
}

/// Presentation metadata of one parameter.
#[derive(Debug, Clone)]
pub struct UiMetadata {
    /// Name the host exposes for the parameter.
    pub display_name: String,
    /// Human-friendly label, when it differs from the display name.
    pub nice_name: Option<String>,
    /// Display order. Defaults to reflection order; the `UIOrder`
    /// annotation overrides it.
    pub order: i32,
    /// Hard slider minimum.
    pub range_min: Option<f32>,
    /// Hard slider maximum.
    pub range_max: Option<f32>,
    /// Initial (soft) slider minimum.
    pub soft_min: Option<f32>,
    /// Initial (soft) slider maximum.
    pub soft_max: Option<f32>,
    /// Dropdown field labels for enum parameters.
    pub enum_fields: Option<Vec<String>>,
    /// Index of the owning UI group, if any.
    pub group: Option<usize>,
    /// Presentation flags.
    pub flags: ParameterFlags,
}

/// Looks up the first present annotation among several accepted spellings.
fn annotation_any(
    effect: &dyn Effect,
    var: VariableHandle,
    names: &[&str],
) -> Option<AnnotationValue> {
    names.iter().find_map(|name| effect.annotation(var, name))
}

fn float_annotation(effect: &dyn Effect, var: VariableHandle, names: &[&str]) -> Option<f32> {
    annotation_any(effect, var, names)
        .as_ref()
        .and_then(AnnotationValue::as_f32)
}

/// Extracts presentation metadata for one parameter.
///
/// When `variable_name_as_attribute_name` is set, the variable name is the
/// host-facing name and `UIName` only supplies the nice label; otherwise
/// `UIName` (when present) becomes the host-facing name itself.
pub fn extract_ui(
    effect: &dyn Effect,
    uniform: &UniformParameter,
    reflection_order: i32,
    variable_name_as_attribute_name: bool,
) -> UiMetadata {
    let var = uniform.var;

    let ui_name = effect
        .annotation(var, "UIName")
        .as_ref()
        .and_then(AnnotationValue::as_str)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let (display_name, nice_name) = if variable_name_as_attribute_name {
        (uniform.name.clone(), ui_name)
    } else {
        (ui_name.unwrap_or_else(|| uniform.name.clone()), None)
    };

    let order = annotation_any(effect, var, &["UIOrder"])
        .as_ref()
        .and_then(AnnotationValue::as_i32)
        .unwrap_or(reflection_order);

    let mut flags = ParameterFlags::empty();
    if let Some(visible) = effect
        .annotation(var, "SasUiVisible")
        .as_ref()
        .and_then(AnnotationValue::as_bool)
    {
        if !visible {
            flags |= ParameterFlags::HIDDEN;
        }
    } else {
        // Per the vendor annotation standards a control type of "None"
        // means the parameter has no UI at all.
        for name in ["UIType", "UIWidget"] {
            if let Some(control) = effect.annotation(var, name) {
                if control.as_str().is_some_and(|c| c.eq_ignore_ascii_case("None")) {
                    flags |= ParameterFlags::HIDDEN;
                }
            }
        }
    }

    if !flags.contains(ParameterFlags::HIDDEN) && !uniform.ty.is_texture() {
        flags |= ParameterFlags::KEYABLE;
    }

    let mut metadata = UiMetadata {
        display_name,
        nice_name,
        order,
        range_min: None,
        range_max: None,
        soft_min: None,
        soft_max: None,
        enum_fields: None,
        group: None,
        flags,
    };

    if matches!(uniform.ty, ParameterType::Float | ParameterType::Int) {
        metadata.range_min = float_annotation(effect, var, &["SasUiMin", "UIMin", "uimin"]);
        metadata.range_max = float_annotation(effect, var, &["SasUiMax", "UIMax", "uimax"]);
        metadata.soft_min = float_annotation(effect, var, &["SasUiSoftMin", "UISoftMin", "uisoftmin"]);
        metadata.soft_max = float_annotation(effect, var, &["SasUiSoftMax", "UISoftMax", "uisoftmax"]);
    }

    if uniform.ty == ParameterType::Enum {
        metadata.enum_fields = effect
            .annotation(var, "UIFieldNames")
            .as_ref()
            .and_then(AnnotationValue::as_str)
            .map(|fields| fields.split(':').map(str::to_string).collect());
    }

    metadata
}

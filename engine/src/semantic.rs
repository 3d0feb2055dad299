//! Semantic classification of reflected parameters.
//!
//! Raw reflected variables carry at most a semantic string and a bag of
//! annotations. Classification turns that into something the engine can
//! act on, in priority order: the explicit semantic, vendor bind-address
//! annotations, UI control-type annotations, and finally name-substring
//! heuristics for bare float vectors.
//!
//! Light affiliation runs after generic classification. Parameters whose
//! semantics, annotations or names tie them to a light receive a
//! [`LightRole`] and a light-group key; parameters that share a group key
//! later form one logical light.

use fxlight_core::effect::{AnnotationValue, Effect, VariableClass};

use crate::reflect::{ParameterType, UniformParameter};
use crate::ui::{self, UiMetadata};

/// Generic meaning of a uniform parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ParameterSemantic {
    Unknown,

    // Transform matrices.
    WorldMatrix,
    WorldTransposeMatrix,
    WorldInverseMatrix,
    WorldInverseTransposeMatrix,
    ViewMatrix,
    ViewTransposeMatrix,
    ViewInverseMatrix,
    ViewInverseTransposeMatrix,
    ProjectionMatrix,
    ProjectionTransposeMatrix,
    ProjectionInverseMatrix,
    ProjectionInverseTransposeMatrix,
    WorldViewMatrix,
    WorldViewTransposeMatrix,
    WorldViewInverseMatrix,
    WorldViewInverseTransposeMatrix,
    ViewProjectionMatrix,
    ViewProjectionTransposeMatrix,
    ViewProjectionInverseMatrix,
    ViewProjectionInverseTransposeMatrix,
    WorldViewProjectionMatrix,
    WorldViewProjectionTransposeMatrix,
    WorldViewProjectionInverseMatrix,
    WorldViewProjectionInverseTransposeMatrix,

    // Camera and viewport.
    LocalViewer,
    ViewportPixelSize,
    BackgroundColor,
    FrameNumber,
    Time,

    // Colors and surface inputs.
    Color,
    Normal,
    Bump,
    Environment,

    // Space-qualified positions and directions. `ViewPosition` and
    // `ViewDirection` double as the camera's own position/direction.
    ObjectPosition,
    WorldPosition,
    ViewPosition,
    ObjectDirection,
    WorldDirection,
    ViewDirection,

    // Textures with stock sources.
    ColorTexture,
    TranspDepthTexture,
    OpaqueDepthTexture,
}

/// Sub-role a parameter plays inside a logical light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum LightRole {
    Position,
    Direction,
    Color,
    SpecularColor,
    AmbientColor,
    DiffuseColor,
    Falloff,
    ShadowMap,
    ShadowMapBias,
    ShadowColor,
    ShadowViewProj,
    ShadowOn,
    Intensity,
    Hotspot,
    Enable,
    LightType,
    DecayRate,
    AreaPosition0,
    AreaPosition1,
    AreaPosition2,
    AreaPosition3,
}

/// Category a logical light expects from the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Not pinned by any semantic; resolved later from the role set.
    Undefined,
    /// Needs a position.
    Point,
    /// Needs position and direction.
    Spot,
    /// Needs a direction.
    Directional,
    /// Needs neither.
    Ambient,
    /// Needs four corner positions.
    Area,
}

impl LightKind {
    /// Lowercase display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Point => "point",
            Self::Spot => "spot",
            Self::Directional => "directional",
            Self::Ambient => "ambient",
            Self::Area => "area",
        }
    }
}

/// A fully classified uniform parameter.
#[derive(Debug, Clone)]
pub struct ClassifiedParameter {
    /// The underlying reflected parameter.
    pub uniform: UniformParameter,
    /// Generic semantic.
    pub semantic: ParameterSemantic,
    /// Light sub-role, if light-affiliated.
    pub light_role: Option<LightRole>,
    /// Pinned light category; `Some(LightKind::Undefined)` means
    /// light-affiliated but unpinned. `None` means not a light parameter.
    pub light_kind: Option<LightKind>,
    /// Index of the owning light group, if any.
    pub light_group: Option<usize>,
    /// Presentation metadata.
    pub ui: UiMetadata,
}

impl ClassifiedParameter {
    /// Variable name as declared in the effect.
    pub fn name(&self) -> &str {
        &self.uniform.name
    }
}

const MATRIX_SEMANTICS: &[(&str, ParameterSemantic)] = &[
    ("World", ParameterSemantic::WorldMatrix),
    ("WorldTranspose", ParameterSemantic::WorldTransposeMatrix),
    ("WorldInverse", ParameterSemantic::WorldInverseMatrix),
    ("WorldInverseTranspose", ParameterSemantic::WorldInverseTransposeMatrix),
    ("View", ParameterSemantic::ViewMatrix),
    ("ViewTranspose", ParameterSemantic::ViewTransposeMatrix),
    ("ViewInverse", ParameterSemantic::ViewInverseMatrix),
    ("ViewInverseTranspose", ParameterSemantic::ViewInverseTransposeMatrix),
    ("Projection", ParameterSemantic::ProjectionMatrix),
    ("ProjectionTranspose", ParameterSemantic::ProjectionTransposeMatrix),
    ("ProjectionInverse", ParameterSemantic::ProjectionInverseMatrix),
    ("ProjectionInverseTranspose", ParameterSemantic::ProjectionInverseTransposeMatrix),
    ("WorldView", ParameterSemantic::WorldViewMatrix),
    ("WorldViewTranspose", ParameterSemantic::WorldViewTransposeMatrix),
    ("WorldViewInverse", ParameterSemantic::WorldViewInverseMatrix),
    ("WorldViewInverseTranspose", ParameterSemantic::WorldViewInverseTransposeMatrix),
    ("ViewProjection", ParameterSemantic::ViewProjectionMatrix),
    ("ViewProjectionTranspose", ParameterSemantic::ViewProjectionTransposeMatrix),
    ("ViewProjectionInverse", ParameterSemantic::ViewProjectionInverseMatrix),
    (
        "ViewProjectionInverseTranspose",
        ParameterSemantic::ViewProjectionInverseTransposeMatrix,
    ),
    ("WorldViewProjection", ParameterSemantic::WorldViewProjectionMatrix),
    (
        "WorldViewProjectionTranspose",
        ParameterSemantic::WorldViewProjectionTransposeMatrix,
    ),
    (
        "WorldViewProjectionInverse",
        ParameterSemantic::WorldViewProjectionInverseMatrix,
    ),
    (
        "WorldViewProjectionInverseTranspose",
        ParameterSemantic::WorldViewProjectionInverseTransposeMatrix,
    ),
];

const SIMPLE_SEMANTICS: &[(&str, ParameterSemantic)] = &[
    ("ViewDirection", ParameterSemantic::ViewDirection),
    ("ViewPosition", ParameterSemantic::ViewPosition),
    ("LocalViewer", ParameterSemantic::LocalViewer),
    ("ViewportPixelSize", ParameterSemantic::ViewportPixelSize),
    ("BackgroundColor", ParameterSemantic::BackgroundColor),
    ("Frame", ParameterSemantic::FrameNumber),
    ("FrameNumber", ParameterSemantic::FrameNumber),
    ("AnimationTime", ParameterSemantic::Time),
    ("Time", ParameterSemantic::Time),
    ("Color", ParameterSemantic::Color),
    ("LightColor", ParameterSemantic::Color),
    ("Ambient", ParameterSemantic::Color),
    ("LightAmbientColor", ParameterSemantic::Color),
    ("Specular", ParameterSemantic::Color),
    ("LightSpecularColor", ParameterSemantic::Color),
    ("Diffuse", ParameterSemantic::Color),
    ("LightDiffuseColor", ParameterSemantic::Color),
    ("Normal", ParameterSemantic::Normal),
    ("Bump", ParameterSemantic::Bump),
    ("Environment", ParameterSemantic::Environment),
    ("ShadowMap", ParameterSemantic::ColorTexture),
    ("ShadowColor", ParameterSemantic::Color),
    ("TranspDepthTexture", ParameterSemantic::TranspDepthTexture),
    ("OpaqueDepthTexture", ParameterSemantic::OpaqueDepthTexture),
];

/// Semantics that carry no generic meaning but are recognized, so they must
/// not produce an unknown-semantic warning.
const RECOGNIZED_OPAQUE_SEMANTICS: &[&str] = &[
    "ShadowFlag",
    "ShadowMapBias",
    "ShadowMapMatrix",
    "ShadowMapXForm",
    "STANDARDSGLOBAL",
    "LightEnable",
    "LightIntensity",
    "LightFalloff",
    "Falloff",
    "Hotspot",
    "LightType",
    "DecayRate",
];

/// The reserved global-configuration semantic. Parameters carrying it are
/// control blocks for the integration, not user-facing values.
const STANDARDS_GLOBAL: &str = "STANDARDSGLOBAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpaceFamily {
    Position,
    Direction,
}

/// Case-insensitive substring search.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.to_ascii_lowercase();
    haystack.contains(&needle.to_ascii_lowercase())
}

/// Finds `needle` in `haystack` case-insensitively, returning the byte
/// offset just past the match.
fn find_ci_end(haystack: &str, needle: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    lower.find(&needle.to_ascii_lowercase()).map(|p| p + needle.len())
}

/// Derives the light-group key from a parameter name: everything up to and
/// including the first `light` occurrence plus any digits that follow, or
/// failing that up to and including the first digit run.
///
/// `DirectionalLightColor -> DirectionalLight`, `scene_light_position ->
/// scene_light`, `Lamp0Color -> Lamp0`.
fn group_key(name: &str) -> Option<&str> {
    let mut end = find_ci_end(name, "light");
    if end.is_none() {
        end = name.find(|c: char| c.is_ascii_digit());
    }
    let mut end = end?;

    let bytes = name.as_bytes();
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    Some(&name[..end])
}

/// Result of light-affiliation analysis for one parameter.
struct LightInfo {
    role: Option<LightRole>,
    kind: Option<LightKind>,
    group: Option<usize>,
    ui_group: Option<usize>,
}

/// Classifies reflected parameters and accumulates the light-group and
/// UI-group name registries they reference.
#[derive(Debug, Default)]
pub struct SemanticClassifier {
    light_names: Vec<String>,
    ui_group_names: Vec<String>,
    warnings: Vec<String>,
}

impl SemanticClassifier {
    /// Creates a classifier with empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Light-group names registered so far, in first-seen order.
    pub fn light_names(&self) -> &[String] {
        &self.light_names
    }

    /// UI-group names registered so far, in first-seen order.
    pub fn ui_group_names(&self) -> &[String] {
        &self.ui_group_names
    }

    /// Consumes the classifier, returning (light names, UI-group names,
    /// warnings).
    pub fn finish(self) -> (Vec<String>, Vec<String>, Vec<String>) {
        (self.light_names, self.ui_group_names, self.warnings)
    }

    /// Classifies one parameter. Returns `None` when the parameter is
    /// suppressed entirely (reserved global-configuration blocks).
    pub fn classify(
        &mut self,
        effect: &dyn Effect,
        uniform: UniformParameter,
        reflection_order: i32,
        variable_name_as_attribute_name: bool,
    ) -> Option<ClassifiedParameter> {
        let semantic = self.convert_semantic(effect, &uniform);
        let light = self.light_info(effect, &uniform);

        // A global-configuration block is consumed by the integration, not
        // exposed as a user parameter.
        if semantic == ParameterSemantic::Unknown
            && matches!(uniform.ty, ParameterType::Float | ParameterType::String)
        {
            if let Some(sem) = uniform.semantic.as_deref() {
                if sem.eq_ignore_ascii_case(STANDARDS_GLOBAL) {
                    return None;
                }
            }
        }

        let mut ui = ui::extract_ui(
            effect,
            &uniform,
            reflection_order,
            variable_name_as_attribute_name,
        );
        ui.group = light.ui_group.or_else(|| {
            effect
                .annotation(uniform.var, "UIGroup")
                .as_ref()
                .and_then(AnnotationValue::as_str)
                .filter(|name| !name.is_empty())
                .map(|name| self.ui_group_index(name))
        });

        Some(ClassifiedParameter {
            uniform,
            semantic,
            light_role: light.role,
            light_kind: light.kind,
            light_group: light.group,
            ui,
        })
    }

    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(message);
    }

    fn light_index(&mut self, name: &str) -> usize {
        if let Some(index) = self.light_names.iter().position(|n| n == name) {
            index
        } else {
            self.light_names.push(name.to_string());
            self.light_names.len() - 1
        }
    }

    fn ui_group_index(&mut self, name: &str) -> usize {
        if let Some(index) = self.ui_group_names.iter().position(|n| n == name) {
            index
        } else {
            self.ui_group_names.push(name.to_string());
            self.ui_group_names.len() - 1
        }
    }

    /// Resolves the space of a position/direction semantic through the
    /// `Space` annotation. World space is the default.
    fn convert_space(
        &mut self,
        effect: &dyn Effect,
        uniform: &UniformParameter,
        family: SpaceFamily,
    ) -> ParameterSemantic {
        let space = effect
            .annotation(uniform.var, "Space")
            .as_ref()
            .and_then(AnnotationValue::as_str)
            .map(str::to_string);

        let Some(space) = space else {
            return match family {
                SpaceFamily::Position => ParameterSemantic::WorldPosition,
                SpaceFamily::Direction => ParameterSemantic::WorldDirection,
            };
        };

        match family {
            SpaceFamily::Position => {
                if space.eq_ignore_ascii_case("Object") {
                    ParameterSemantic::ObjectPosition
                } else if space.eq_ignore_ascii_case("World") {
                    ParameterSemantic::WorldPosition
                } else if space.eq_ignore_ascii_case("View") || space.eq_ignore_ascii_case("Camera") {
                    ParameterSemantic::ViewPosition
                } else {
                    self.warn(format!("unknown space '{}' on parameter '{}'", space, uniform.name));
                    ParameterSemantic::WorldPosition
                }
            }
            SpaceFamily::Direction => {
                if space.eq_ignore_ascii_case("Object") {
                    ParameterSemantic::ObjectDirection
                } else if space.eq_ignore_ascii_case("World") {
                    ParameterSemantic::WorldDirection
                } else if space.eq_ignore_ascii_case("View") || space.eq_ignore_ascii_case("Camera") {
                    ParameterSemantic::ViewDirection
                } else {
                    self.warn(format!("unknown space '{}' on parameter '{}'", space, uniform.name));
                    ParameterSemantic::WorldDirection
                }
            }
        }
    }

    fn convert_semantic(&mut self, effect: &dyn Effect, uniform: &UniformParameter) -> ParameterSemantic {
        // First the explicit semantic string.
        if let Some(sem) = uniform.semantic.as_deref() {
            for (text, value) in MATRIX_SEMANTICS {
                if sem.eq_ignore_ascii_case(text) {
                    return *value;
                }
            }
            for (text, value) in SIMPLE_SEMANTICS {
                if sem.eq_ignore_ascii_case(text) {
                    return *value;
                }
            }

            if sem.eq_ignore_ascii_case("Position")
                || sem.eq_ignore_ascii_case("AreaPosition0")
                || sem.eq_ignore_ascii_case("AreaPosition1")
                || sem.eq_ignore_ascii_case("AreaPosition2")
                || sem.eq_ignore_ascii_case("AreaPosition3")
            {
                return self.convert_space(effect, uniform, SpaceFamily::Position);
            }
            if sem.eq_ignore_ascii_case("Direction") {
                return self.convert_space(effect, uniform, SpaceFamily::Direction);
            }

            if !RECOGNIZED_OPAQUE_SEMANTICS
                .iter()
                .any(|known| sem.eq_ignore_ascii_case(known))
            {
                self.warn(format!("unknown semantic '{}' on parameter '{}'", sem, uniform.name));
            }
        }

        // Next, a vendor bind-address annotation.
        if let Some(address) = effect
            .annotation(uniform.var, "SasBindAddress")
            .as_ref()
            .and_then(AnnotationValue::as_str)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
        {
            if address.eq_ignore_ascii_case("Sas.Skeleton.MeshToJointToWorld[0]") {
                return ParameterSemantic::WorldMatrix;
            } else if address.eq_ignore_ascii_case("Sas.Camera.WorldToView") {
                return ParameterSemantic::ViewMatrix;
            } else if address.eq_ignore_ascii_case("Sas.Camera.Projection") {
                return ParameterSemantic::ProjectionMatrix;
            } else if address.eq_ignore_ascii_case("Sas.Time.Now") {
                return ParameterSemantic::Time;
            } else if contains_ci(&address, ".Position") {
                return self.convert_space(effect, uniform, SpaceFamily::Position);
            } else if contains_ci(&address, ".Direction") && !contains_ci(&address, ".Directional") {
                return self.convert_space(effect, uniform, SpaceFamily::Direction);
            }
            self.warn(format!(
                "unknown bind address '{}' on parameter '{}'",
                address, uniform.name
            ));
        }

        // Next, a UI control-type annotation.
        let control = effect
            .annotation(uniform.var, "SasUiControl")
            .or_else(|| effect.annotation(uniform.var, "UIWidget"));
        if let Some(control) = control.as_ref().and_then(AnnotationValue::as_str) {
            if control.eq_ignore_ascii_case("ColorPicker") {
                return ParameterSemantic::Color;
            }
        }

        // Last, an obvious parameter name on a bare float vector.
        if uniform.semantic.is_none()
            && uniform.class == VariableClass::Vector
            && uniform.ty == ParameterType::Float
            && uniform.rows == 1
            && (3..=4).contains(&uniform.columns)
        {
            let name = &uniform.name;
            if contains_ci(name, "position") {
                return self.convert_space(effect, uniform, SpaceFamily::Position);
            }
            if contains_ci(name, "direction") && !contains_ci(name, "directional") {
                return self.convert_space(effect, uniform, SpaceFamily::Direction);
            }
            if contains_ci(name, "color")
                || contains_ci(name, "colour")
                || contains_ci(name, "diffuse")
                || contains_ci(name, "specular")
                || contains_ci(name, "ambient")
            {
                return ParameterSemantic::Color;
            }
        }

        ParameterSemantic::Unknown
    }

    /// Light-affiliation analysis: role, pinned category and group key.
    fn light_info(&mut self, effect: &dyn Effect, uniform: &UniformParameter) -> LightInfo {
        let mut info = LightInfo {
            role: None,
            kind: None,
            group: None,
            ui_group: None,
        };

        // An Object annotation names the light group directly and may pin
        // the category from substrings.
        if let Some(object) = effect
            .annotation(uniform.var, "Object")
            .as_ref()
            .and_then(AnnotationValue::as_str)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
        {
            info.group = Some(self.light_index(&object));
            info.ui_group = Some(self.ui_group_index(&object));
            if contains_ci(&object, "light") || contains_ci(&object, "lamp") {
                info.kind = Some(LightKind::Undefined);
                if contains_ci(&object, "point") {
                    info.kind = Some(LightKind::Point);
                } else if contains_ci(&object, "spot") {
                    info.kind = Some(LightKind::Spot);
                } else if contains_ci(&object, "directional") {
                    info.kind = Some(LightKind::Directional);
                } else if contains_ci(&object, "ambient") {
                    info.kind = Some(LightKind::Ambient);
                }
            }
        }

        let Some(sem) = uniform.semantic.as_deref().map(str::to_string) else {
            return info;
        };
        let sem = sem.as_str();

        if sem.eq_ignore_ascii_case("LightColor") {
            info.role = Some(LightRole::Color);
        } else if sem.eq_ignore_ascii_case("LightEnable") {
            info.role = Some(LightRole::Enable);
        } else if sem.eq_ignore_ascii_case("LightIntensity") {
            info.role = Some(LightRole::Intensity);
        } else if sem.eq_ignore_ascii_case("LightFalloff") || sem.eq_ignore_ascii_case("Falloff") {
            info.kind = Some(LightKind::Spot);
            info.role = Some(LightRole::Falloff);
        } else if sem.eq_ignore_ascii_case("LightDiffuseColor") {
            info.role = Some(LightRole::DiffuseColor);
        } else if sem.eq_ignore_ascii_case("LightAmbientColor") {
            info.role = Some(LightRole::AmbientColor);
            info.kind = Some(LightKind::Ambient);
        } else if sem.eq_ignore_ascii_case("LightSpecularColor") {
            info.role = Some(LightRole::SpecularColor);
        } else if sem.eq_ignore_ascii_case("ShadowMap") {
            info.role = Some(LightRole::ShadowMap);
        } else if sem.eq_ignore_ascii_case("ShadowMapBias") {
            info.role = Some(LightRole::ShadowMapBias);
        } else if sem.eq_ignore_ascii_case("ShadowFlag") {
            info.role = Some(LightRole::ShadowOn);
        } else if sem.eq_ignore_ascii_case("ShadowMapMatrix") || sem.eq_ignore_ascii_case("ShadowMapXForm") {
            // View-projection transform of the shadow-casting light.
            info.role = Some(LightRole::ShadowViewProj);
        } else if sem.eq_ignore_ascii_case("ShadowColor") {
            info.role = Some(LightRole::ShadowColor);
        } else if sem.eq_ignore_ascii_case("Hotspot") {
            info.role = Some(LightRole::Hotspot);
            info.kind = Some(LightKind::Spot);
        } else if sem.eq_ignore_ascii_case("LightType") {
            info.role = Some(LightRole::LightType);
        } else if sem.eq_ignore_ascii_case("DecayRate") {
            info.role = Some(LightRole::DecayRate);
        } else {
            // Generic semantics count as light parameters only when the
            // parameter is already light-affiliated.
            let is_light = info.kind.is_some() || contains_ci(&uniform.name, "light");
            if is_light {
                if sem.eq_ignore_ascii_case("Position") {
                    info.role = Some(LightRole::Position);
                } else if sem.eq_ignore_ascii_case("AreaPosition0") {
                    info.role = Some(LightRole::AreaPosition0);
                    info.kind = Some(LightKind::Area);
                } else if sem.eq_ignore_ascii_case("AreaPosition1") {
                    info.role = Some(LightRole::AreaPosition1);
                    info.kind = Some(LightKind::Area);
                } else if sem.eq_ignore_ascii_case("AreaPosition2") {
                    info.role = Some(LightRole::AreaPosition2);
                    info.kind = Some(LightKind::Area);
                } else if sem.eq_ignore_ascii_case("AreaPosition3") {
                    info.role = Some(LightRole::AreaPosition3);
                    info.kind = Some(LightKind::Area);
                } else if sem.eq_ignore_ascii_case("Direction") {
                    info.role = Some(LightRole::Direction);
                } else if sem.eq_ignore_ascii_case("Color") {
                    info.role = Some(LightRole::Color);
                } else if sem.eq_ignore_ascii_case("Ambient") {
                    info.role = Some(LightRole::AmbientColor);
                    info.kind = Some(LightKind::Ambient);
                } else if sem.eq_ignore_ascii_case("Diffuse") {
                    info.role = Some(LightRole::DiffuseColor);
                } else if sem.eq_ignore_ascii_case("Specular") {
                    info.role = Some(LightRole::SpecularColor);
                }
            }
        }

        // A parameter with a light role but no explicit group derives the
        // group key from its own name.
        if info.role.is_some() && info.group.is_none() {
            if info.kind.is_none() {
                info.kind = Some(LightKind::Undefined);
            }
            if let Some(key) = group_key(&uniform.name) {
                let key = key.to_string();
                info.group = Some(self.light_index(&key));
                info.ui_group = Some(self.ui_group_index(&key));
            }
        }

        info
    }
}

//! End-to-end binding behavior over an in-memory effect.

use fxlight_core::effect::{
    EffectValue, MemoryEffect, MemoryVariable, PassDesc, TechniqueDesc, VariableDesc,
};
use fxlight_core::handle::{SceneObjects, TextureHandle};
use fxlight_core::scene::SceneLightInfo;
use fxlight_engine::{
    BindingState, EngineOptions, LightKind, Notification, RenderMode, ShaderError, ShaderInstance,
};
use glam::{Mat4, Vec3};

fn light_var(name: &str, semantic: &str) -> MemoryVariable {
    MemoryVariable::new(VariableDesc::float_vector(name, 3).with_semantic(semantic))
}

fn scalar_var(name: &str, semantic: &str) -> MemoryVariable {
    MemoryVariable::new(VariableDesc::scalar(name).with_semantic(semantic))
}

fn bool_var(name: &str, semantic: &str) -> MemoryVariable {
    MemoryVariable::new(VariableDesc::bool_scalar(name).with_semantic(semantic))
}

/// One spot group ("keyLight") with the usual sub-roles.
fn spot_effect() -> MemoryEffect {
    MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main").with_pass(PassDesc::new("P0")))
        .with_variable(light_var("keyLightPos", "Position"))
        .with_variable(light_var("keyLightDir", "Direction"))
        .with_variable(light_var("keyLightColor", "LightColor"))
        .with_variable(scalar_var("keyLightIntensity", "LightIntensity"))
        .with_variable(bool_var("keyLightEnable", "LightEnable"))
}

fn load(effect: MemoryEffect) -> ShaderInstance {
    ShaderInstance::load(Box::new(effect), EngineOptions::new()).unwrap()
}

fn float_of(shader: &ShaderInstance, name: &str) -> f32 {
    shader.parameter_value(name).unwrap().as_float().unwrap()
}

fn bool_of(shader: &ShaderInstance, name: &str) -> bool {
    shader.parameter_value(name).unwrap().as_bool().unwrap()
}

fn floats_of(shader: &ShaderInstance, name: &str) -> Vec<f32> {
    shader.parameter_value(name).unwrap().as_floats().unwrap().to_vec()
}

#[test]
fn end_to_end_spot_binding() {
    let mut shader = load(spot_effect());
    let mut objects = SceneObjects::new();
    let spot = objects.add("stageSpot");

    let lights = [SceneLightInfo::spot(
        spot,
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::ONE,
        2.0,
        0.95,
        0.9,
    )];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    assert_eq!(shader.binding_state("keyLight").unwrap(), BindingState::AutomaticBound);
    assert_eq!(floats_of(&shader, "keyLightPos"), vec![0.0, 5.0, 0.0]);
    assert_eq!(float_of(&shader, "keyLightIntensity"), 2.0);
    assert!(bool_of(&shader, "keyLightEnable"));
    assert_eq!(
        shader.binding_source("keyLight", &objects).unwrap().as_deref(),
        Some("stageSpot")
    );
}

#[test]
fn binding_is_deterministic() {
    let mut objects = SceneObjects::new();
    let a = objects.add("a");
    let b = objects.add("b");
    let c = objects.add("c");
    let lights = [
        SceneLightInfo::point(a, Vec3::X, Vec3::ONE, 1.0),
        SceneLightInfo::spot(b, Vec3::Y, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8),
        SceneLightInfo::directional(c, Vec3::NEG_Z, Vec3::ONE, 1.0),
    ];

    let effect = spot_effect()
        .with_variable(light_var("fillLightPos", "Position"))
        .with_variable(light_var("fillLightColor", "LightColor"))
        .with_variable(light_var("rimLightDir", "Direction"));

    let run = || {
        let mut shader = load(effect.clone());
        shader.on_update(RenderMode::Scene, 1, &lights, &objects);
        (
            shader.binding_source("keyLight", &objects).unwrap(),
            shader.binding_source("fillLight", &objects).unwrap(),
            shader.binding_source("rimLight", &objects).unwrap(),
        )
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    // Spot group takes the spot, point group the point, directional the
    // directional, regardless of scene order.
    assert_eq!(first.0.as_deref(), Some("b"));
    assert_eq!(first.1.as_deref(), Some("a"));
    assert_eq!(first.2.as_deref(), Some("c"));
}

#[test]
fn unmatched_groups_shut_down() {
    let effect = spot_effect()
        .with_variable(light_var("fillLightPos", "Position"))
        .with_variable(light_var("fillLightColor", "LightColor"))
        .with_variable(scalar_var("fillLightIntensity", "LightIntensity"))
        .with_variable(bool_var("fillLightEnable", "LightEnable"));
    let mut shader = load(effect);

    let mut objects = SceneObjects::new();
    let spot = objects.add("onlySpot");
    let lights = [SceneLightInfo::spot(
        spot,
        Vec3::ZERO,
        Vec3::NEG_Y,
        Vec3::ONE,
        1.0,
        0.9,
        0.8,
    )];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    // The spot group wins the only scene light; the point group ends in
    // the shutdown state rather than keeping stale values.
    assert!(bool_of(&shader, "keyLightEnable"));
    assert!(!bool_of(&shader, "fillLightEnable"));
    assert_eq!(floats_of(&shader, "fillLightColor"), vec![0.0, 0.0, 0.0]);
    assert_eq!(float_of(&shader, "fillLightIntensity"), 0.0);
}

#[test]
fn extra_scene_lights_are_unused() {
    let mut shader = load(spot_effect());
    let mut objects = SceneObjects::new();
    let s1 = objects.add("s1");
    let s2 = objects.add("s2");
    let s3 = objects.add("s3");
    let lights = [
        SceneLightInfo::spot(s1, Vec3::X, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8),
        SceneLightInfo::spot(s2, Vec3::Y, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8),
        SceneLightInfo::spot(s3, Vec3::Z, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8),
    ];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    // First in host order wins; the others are simply unused.
    assert_eq!(shader.binding_source("keyLight", &objects).unwrap().as_deref(), Some("s1"));
}

#[test]
fn explicit_connection_takes_precedence() {
    let mut shader = load(spot_effect());
    let mut objects = SceneObjects::new();
    let a = objects.add("earlySpot");
    let b = objects.add("pinnedSpot");
    let lights = [
        SceneLightInfo::spot(a, Vec3::X, Vec3::NEG_Y, Vec3::ONE, 2.0, 0.9, 0.8),
        SceneLightInfo::spot(b, Vec3::Y, Vec3::NEG_Y, Vec3::ONE, 5.0, 0.9, 0.8),
    ];

    shader.connect("keyLight", b).unwrap();
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    // Automatic matching would have picked the earlier spot; the pinned
    // one wins and its values land in the parameters.
    assert_eq!(shader.binding_state("keyLight").unwrap(), BindingState::ExplicitlyConnected);
    assert_eq!(shader.binding_source("keyLight", &objects).unwrap().as_deref(), Some("pinnedSpot"));
    assert_eq!(float_of(&shader, "keyLightIntensity"), 5.0);
}

#[test]
fn explicit_connection_absent_from_frame_shuts_down() {
    let mut shader = load(spot_effect());
    let mut objects = SceneObjects::new();
    let visible = objects.add("visible");
    let hidden = objects.add("hidden");
    let lights = [SceneLightInfo::spot(visible, Vec3::X, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8)];

    shader.connect("keyLight", hidden).unwrap();
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    // The light is invisible this frame: off, but still connected.
    assert!(!bool_of(&shader, "keyLightEnable"));
    assert_eq!(shader.binding_state("keyLight").unwrap(), BindingState::ExplicitlyConnected);
}

#[test]
fn cached_binding_is_stable_across_frames() {
    let effect = MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main"))
        .with_variable(light_var("fillLightPos", "Position"))
        .with_variable(light_var("fillLightColor", "LightColor"));
    let mut shader = load(effect);

    let mut objects = SceneObjects::new();
    let p1 = objects.add("p1");
    let p2 = objects.add("p2");
    let lights = [
        SceneLightInfo::point(p1, Vec3::X, Vec3::ONE, 1.0),
        SceneLightInfo::point(p2, Vec3::Y, Vec3::ONE, 1.0),
    ];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);
    assert_eq!(shader.binding_source("fillLight", &objects).unwrap().as_deref(), Some("p1"));
    shader.take_notifications();

    // Same scene next frame: no churn, no rebind notification.
    shader.on_update(RenderMode::Scene, 2, &lights, &objects);
    assert_eq!(shader.binding_source("fillLight", &objects).unwrap().as_deref(), Some("p1"));
    assert!(!shader
        .take_notifications()
        .contains(&Notification::LightBindingsChanged));

    // The cached light dies: the cache self-heals and the group rematches.
    objects.remove(p1);
    let lights = [SceneLightInfo::point(p2, Vec3::Y, Vec3::ONE, 1.0)];
    shader.on_update(RenderMode::Scene, 3, &lights, &objects);
    assert_eq!(shader.binding_source("fillLight", &objects).unwrap().as_deref(), Some("p2"));
}

#[test]
fn same_frame_stamp_skips_binding() {
    let mut shader = load(spot_effect());
    let mut objects = SceneObjects::new();
    let a = objects.add("a");
    let b = objects.add("b");

    let first = [SceneLightInfo::spot(a, Vec3::X, Vec3::NEG_Y, Vec3::ONE, 2.0, 0.9, 0.8)];
    shader.on_update(RenderMode::Scene, 7, &first, &objects);
    assert_eq!(float_of(&shader, "keyLightIntensity"), 2.0);

    // Same stamp means same frame, different geometry: binding work is
    // skipped even though the list changed.
    let second = [SceneLightInfo::spot(b, Vec3::Y, Vec3::NEG_Y, Vec3::ONE, 9.0, 0.9, 0.8)];
    shader.on_update(RenderMode::Scene, 7, &second, &objects);
    assert_eq!(float_of(&shader, "keyLightIntensity"), 2.0);

    // New stamp: the cached light is live but absent from the frame, so
    // the group goes dark while the cache holds on.
    shader.on_update(RenderMode::Scene, 8, &second, &objects);
    assert!(!bool_of(&shader, "keyLightEnable"));

    // Once the cached light dies, the group rematches.
    objects.remove(a);
    shader.on_update(RenderMode::Scene, 9, &second, &objects);
    assert_eq!(float_of(&shader, "keyLightIntensity"), 9.0);
}

#[test]
fn color_only_group_binds_before_going_unbound() {
    let effect = MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main"))
        .with_variable(light_var("glowLightColor", "LightColor"))
        .with_variable(bool_var("glowLightEnable", "LightEnable"));
    let mut shader = load(effect);

    assert_eq!(shader.light_groups(), vec![("glowLight", LightKind::Ambient)]);

    let mut objects = SceneObjects::new();
    let p = objects.add("point");
    let lights = [SceneLightInfo::point(p, Vec3::X, Vec3::new(0.3, 0.4, 0.5), 1.0)];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    // A color-only group accepts any provider via the compatibility pass.
    assert!(bool_of(&shader, "glowLightEnable"));
    assert_eq!(floats_of(&shader, "glowLightColor"), vec![0.3, 0.4, 0.5]);
}

#[test]
fn spot_group_rejects_directional_provider() {
    let mut shader = load(spot_effect());
    let mut objects = SceneObjects::new();
    let sun = objects.add("sun");
    let lights = [SceneLightInfo::directional(sun, Vec3::NEG_Y, Vec3::ONE, 1.0)];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    // Direction-only providers cannot drive a group that needs a position.
    assert!(!bool_of(&shader, "keyLightEnable"));
    assert_eq!(shader.binding_source("keyLight", &objects).unwrap(), None);
}

#[test]
fn cone_angles_convert_to_radians() {
    let effect = spot_effect()
        .with_variable(scalar_var("keyLightHotspot", "Hotspot"))
        .with_variable(scalar_var("keyLightFalloff", "Falloff"));
    let mut shader = load(effect);

    let mut objects = SceneObjects::new();
    let spot = objects.add("spot");
    let (c1, c2) = (0.92f32, 0.81f32);
    let lights = [SceneLightInfo::spot(spot, Vec3::ZERO, Vec3::NEG_Y, Vec3::ONE, 1.0, c1, c2)];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    assert!((float_of(&shader, "keyLightHotspot") - c1.acos()).abs() < 1e-6);
    assert!((float_of(&shader, "keyLightFalloff") - c2.acos()).abs() < 1e-6);
}

#[test]
fn area_corners_average_into_position() {
    let effect = MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main"))
        .with_variable(light_var("panelLightPos", "Position"))
        .with_variable(light_var("panelLightLP0", "AreaPosition0"))
        .with_variable(light_var("panelLightLP1", "AreaPosition1"))
        .with_variable(light_var("panelLightLP2", "AreaPosition2"))
        .with_variable(light_var("panelLightLP3", "AreaPosition3"))
        .with_variable(light_var("panelLightColor", "LightColor"));
    let mut shader = load(effect);

    let corners = [
        Vec3::new(0.0, 2.0, 0.0),
        Vec3::new(4.0, 2.0, 0.0),
        Vec3::new(4.0, 6.0, 0.0),
        Vec3::new(0.0, 6.0, 0.0),
    ];
    let mut objects = SceneObjects::new();
    let panel = objects.add("panel");
    let lights = [SceneLightInfo::area(panel, corners, Vec3::ONE, 1.0)];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    // The single position slot collapses to the corner mean; each corner
    // slot receives its own corner.
    assert_eq!(floats_of(&shader, "panelLightPos"), vec![2.0, 4.0, 0.0]);
    assert_eq!(floats_of(&shader, "panelLightLP0"), vec![0.0, 2.0, 0.0]);
    assert_eq!(floats_of(&shader, "panelLightLP3"), vec![0.0, 6.0, 0.0]);
}

#[test]
fn preview_light_drives_every_group() {
    let effect = spot_effect()
        .with_variable(light_var("glowLightColor", "LightColor"))
        .with_variable(bool_var("glowLightEnable", "LightEnable"));
    let mut shader = load(effect);

    let mut objects = SceneObjects::new();
    let preview = objects.add("previewSpot");
    let lights = [SceneLightInfo::spot(
        preview,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::new(0.6, 0.7, 0.8),
        1.0,
        0.9,
        0.8,
    )];

    shader.on_update(RenderMode::Preview, 1, &lights, &objects);

    // One preview light feeds both groups, and no binding state sticks.
    assert!(bool_of(&shader, "keyLightEnable"));
    assert!(bool_of(&shader, "glowLightEnable"));
    // The spot group takes the color as-is; the color-only group resolves
    // to ambient, which previews tone down.
    assert_eq!(floats_of(&shader, "keyLightColor"), vec![0.6, 0.7, 0.8]);
    let dimmed = floats_of(&shader, "glowLightColor");
    assert!((dimmed[0] - 0.6 * 0.15).abs() < 1e-6);
    assert_eq!(shader.binding_state("keyLight").unwrap(), BindingState::ShaderDefault);
}

#[test]
fn preview_no_override_leaves_values_alone() {
    let mut shader = load(spot_effect());
    let mut objects = SceneObjects::new();
    let spot = objects.add("spot");
    let lights = [SceneLightInfo::spot(spot, Vec3::X, Vec3::NEG_Y, Vec3::ONE, 3.0, 0.9, 0.8)];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);
    assert_eq!(float_of(&shader, "keyLightIntensity"), 3.0);

    let other = [SceneLightInfo::spot(spot, Vec3::X, Vec3::NEG_Y, Vec3::ONE, 8.0, 0.9, 0.8)];
    shader.on_update(RenderMode::PreviewNoOverride, 2, &other, &objects);
    assert_eq!(float_of(&shader, "keyLightIntensity"), 3.0);
}

#[test]
fn headlamp_mode_drives_one_group_and_shuts_down_the_rest() {
    let effect = MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main"))
        .with_variable(light_var("sunLightDir", "Direction"))
        .with_variable(light_var("sunLightColor", "LightColor"))
        .with_variable(bool_var("sunLightEnable", "LightEnable"))
        .with_variable(light_var("fillLightPos", "Position"))
        .with_variable(bool_var("fillLightEnable", "LightEnable"));
    let mut shader = load(effect);

    let objects = SceneObjects::new();
    let lights = [SceneLightInfo::headlamp(Vec3::new(0.0, 0.0, -1.0), Vec3::ONE, 1.0)];

    // A scene draw whose only light is the headlamp binds like
    // default-light mode: the compatible group gets it, others go dark.
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    assert!(bool_of(&shader, "sunLightEnable"));
    assert_eq!(floats_of(&shader, "sunLightDir"), vec![0.0, 0.0, -1.0]);
    assert!(!bool_of(&shader, "fillLightEnable"));
}

#[test]
fn ambient_color_is_dimmed_in_preview() {
    let effect = MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main"))
        .with_variable(light_var("ambLightColor", "Ambient"));
    let mut shader = load(effect);

    let objects = SceneObjects::new();
    let lights = [SceneLightInfo::ambient(Vec3::ONE, 1.0)];

    shader.on_update(RenderMode::Preview, 1, &lights, &objects);
    let dimmed = floats_of(&shader, "ambLightColor");
    assert!((dimmed[0] - 0.15).abs() < 1e-6);

    // A scene draw transfers the color untouched.
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);
    assert_eq!(floats_of(&shader, "ambLightColor"), vec![1.0, 1.0, 1.0]);
}

#[test]
fn merged_ambient_reports_the_ambient_label() {
    let effect = MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main"))
        .with_variable(light_var("ambLightColor", "Ambient"));
    let mut shader = load(effect);

    let objects = SceneObjects::new();
    let lights = [SceneLightInfo::ambient(Vec3::ONE, 1.0)];
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    assert_eq!(
        shader.binding_source("ambLight", &objects).unwrap().as_deref(),
        Some("ambient")
    );
}

#[test]
fn explicit_ambient_falls_back_to_the_scene_object() {
    let effect = MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main"))
        .with_variable(light_var("ambLightColor", "Ambient"))
        .with_variable(scalar_var("ambLightIntensity", "LightIntensity"))
        .with_variable(bool_var("ambLightEnable", "LightEnable"));
    let mut shader = load(effect);

    let mut objects = SceneObjects::new();
    let fill = objects.add_ambient("fillAmbient", Vec3::new(0.5, 0.4, 0.3), 2.5);

    // The frame only carries the anonymous merged entry; the connected
    // object is read directly instead.
    shader.connect("ambLight", fill).unwrap();
    let lights = [SceneLightInfo::ambient(Vec3::ONE, 1.0)];
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    assert!(bool_of(&shader, "ambLightEnable"));
    assert_eq!(floats_of(&shader, "ambLightColor"), vec![0.5, 0.4, 0.3]);
    assert_eq!(float_of(&shader, "ambLightIntensity"), 2.5);
}

#[test]
fn shadow_enable_requires_fresh_map() {
    let effect = spot_effect().with_variable(bool_var("keyLightShadowOn", "ShadowFlag"));
    let mut shader = load(effect);

    let mut objects = SceneObjects::new();
    let spot = objects.add("spot");
    let base = || {
        SceneLightInfo::spot(spot, Vec3::ZERO, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8)
            .with_shadow_map(TextureHandle::new(3), Mat4::IDENTITY)
            .with_shadow_flags(true, true)
    };

    let lights = [base().with_shadow_dirty(true)];
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);
    assert!(!bool_of(&shader, "keyLightShadowOn"));

    let lights = [base()];
    shader.on_update(RenderMode::Scene, 2, &lights, &objects);
    assert!(bool_of(&shader, "keyLightShadowOn"));

    // Without the per-light cast flag the map alone is not enough.
    let lights = [base().with_shadow_flags(true, false)];
    shader.on_update(RenderMode::Scene, 3, &lights, &objects);
    assert!(!bool_of(&shader, "keyLightShadowOn"));
}

#[test]
fn per_geometry_shadow_flag_restores() {
    let effect = spot_effect().with_variable(bool_var("keyLightShadowOn", "ShadowFlag"));
    let mut shader = load(effect);

    let mut objects = SceneObjects::new();
    let spot = objects.add("spot");
    let lights = [
        SceneLightInfo::spot(spot, Vec3::ZERO, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8)
            .with_shadow_map(TextureHandle::new(3), Mat4::IDENTITY)
            .with_shadow_flags(true, true),
    ];
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);
    assert!(bool_of(&shader, "keyLightShadowOn"));

    // Geometry that does not receive shadows masks the flag; geometry
    // that does gets the light-resolved value back.
    shader.set_geometry_receives_shadows(false);
    assert!(!bool_of(&shader, "keyLightShadowOn"));
    shader.set_geometry_receives_shadows(true);
    assert!(bool_of(&shader, "keyLightShadowOn"));
}

#[test]
fn bound_parameters_lock_and_unlock() {
    let mut shader = load(spot_effect());
    let mut objects = SceneObjects::new();
    let spot = objects.add("spot");
    let lights = [SceneLightInfo::spot(spot, Vec3::ZERO, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8)];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    let err = shader
        .set_parameter("keyLightColor", EffectValue::FloatVec(vec![1.0, 0.0, 0.0]))
        .unwrap_err();
    assert!(matches!(err, ShaderError::ParameterLocked(_)));

    shader.use_shader_settings("keyLight").unwrap();
    assert_eq!(shader.binding_state("keyLight").unwrap(), BindingState::ShaderDefault);
    shader
        .set_parameter("keyLightColor", EffectValue::FloatVec(vec![1.0, 0.0, 0.0]))
        .unwrap();

    // The edit survives the next update: shader-settings groups restore
    // stored values instead of taking scene light state.
    shader.on_update(RenderMode::Scene, 2, &lights, &objects);
    assert_eq!(floats_of(&shader, "keyLightColor"), vec![1.0, 0.0, 0.0]);
}

#[test]
fn rebinds_coalesce_into_one_notification() {
    let effect = spot_effect()
        .with_variable(light_var("fillLightPos", "Position"))
        .with_variable(light_var("fillLightColor", "LightColor"));
    let mut shader = load(effect);

    let mut objects = SceneObjects::new();
    let spot = objects.add("spot");
    let point = objects.add("point");
    let lights = [
        SceneLightInfo::spot(spot, Vec3::X, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8),
        SceneLightInfo::point(point, Vec3::Y, Vec3::ONE, 1.0),
    ];

    shader.on_update(RenderMode::Scene, 1, &lights, &objects);

    let notifications = shader.take_notifications();
    let rebinds = notifications
        .iter()
        .filter(|n| matches!(n, Notification::LightBindingsChanged))
        .count();
    assert_eq!(rebinds, 1);
    // Both bound lights now need their shadow maps.
    assert!(notifications.contains(&Notification::ShadowMapRequired { light: spot, required: true }));
    assert!(notifications.contains(&Notification::ShadowMapRequired { light: point, required: true }));
}

#[test]
fn technique_switch_rebuilds_state() {
    let effect = spot_effect().with_technique(
        TechniqueDesc::new("Fancy").with_annotation("isTransparent", 1),
    );
    let mut shader = load(effect);
    assert_eq!(shader.technique_names(), vec!["Main", "Fancy"]);
    assert!(!shader.technique_traits().is_transparent);

    let mut objects = SceneObjects::new();
    let spot = objects.add("spot");
    let lights = [SceneLightInfo::spot(spot, Vec3::ZERO, Vec3::NEG_Y, Vec3::ONE, 1.0, 0.9, 0.8)];
    shader.on_update(RenderMode::Scene, 1, &lights, &objects);
    assert_eq!(shader.binding_state("keyLight").unwrap(), BindingState::AutomaticBound);

    shader.set_technique("Fancy").unwrap();
    assert!(shader.technique_traits().is_transparent);
    // Binding state does not survive a technique change.
    assert_eq!(shader.binding_state("keyLight").unwrap(), BindingState::ShaderDefault);

    assert!(matches!(
        shader.set_technique("Missing"),
        Err(ShaderError::TechniqueNotFound(_))
    ));
}

#[test]
fn zero_techniques_fail_to_load() {
    let effect = MemoryEffect::new().with_variable(light_var("keyLightColor", "LightColor"));
    let err = ShaderInstance::load(Box::new(effect), EngineOptions::new()).unwrap_err();
    assert_eq!(err, ShaderError::NoTechniques);
}

#[test]
fn schema_round_trips() {
    let effect = spot_effect()
        .with_variable(light_var("fillLightPos", "Position"))
        .with_variable(light_var("fillLightColor", "LightColor"));
    let mut shader = load(effect.clone());

    let mut objects = SceneObjects::new();
    let pinned = objects.add("pinned");
    shader.connect("keyLight", pinned).unwrap();
    shader.use_shader_settings("fillLight").unwrap();

    let schema = shader.binding_schema();

    let mut restored = load(effect);
    let diff = restored.apply_binding_schema(&schema);
    assert_eq!(diff.applied.len(), 2);
    assert!(diff.unknown.is_empty());
    assert!(diff.missing.is_empty());
    assert_eq!(
        restored.binding_state("keyLight").unwrap(),
        BindingState::ExplicitlyConnected
    );
    assert_eq!(
        restored.binding_source("keyLight", &objects).unwrap().as_deref(),
        Some("pinned")
    );

    // A schema naming a stale group reports it instead of failing.
    let mut stale = schema.clone();
    stale[0].group = "renamedLight".to_string();
    let diff = restored.apply_binding_schema(&stale);
    assert_eq!(diff.unknown, vec!["renamedLight".to_string()]);
    assert_eq!(diff.missing, vec!["keyLight".to_string()]);
}

#[test]
fn group_queries_list_parameters() {
    let mut shader = load(spot_effect());
    let params = shader.parameters_for_group("keyLight").unwrap();
    assert_eq!(
        params,
        vec![
            "keyLightPos",
            "keyLightDir",
            "keyLightColor",
            "keyLightIntensity",
            "keyLightEnable"
        ]
    );
    assert!(matches!(
        shader.parameters_for_group("nope"),
        Err(ShaderError::UnknownLightGroup(_))
    ));
    assert!(shader.take_notifications().is_empty());
}

//! Drives a small spot+ambient shader through a normal scene frame and a
//! default-lighting (headlamp) frame, printing the resulting bindings.

use fxlight_core::effect::{MemoryEffect, MemoryVariable, TechniqueDesc, VariableDesc};
use fxlight_core::handle::SceneObjects;
use fxlight_core::scene::SceneLightInfo;
use fxlight_engine::{EngineOptions, RenderMode, ShaderInstance};
use glam::Vec3;

fn main() {
    env_logger::init();

    let effect = MemoryEffect::new()
        .with_technique(TechniqueDesc::new("Main"))
        .with_variable(MemoryVariable::new(
            VariableDesc::float_vector("keyLightPos", 3).with_semantic("Position"),
        ))
        .with_variable(MemoryVariable::new(
            VariableDesc::float_vector("keyLightDir", 3).with_semantic("Direction"),
        ))
        .with_variable(MemoryVariable::new(
            VariableDesc::float_vector("keyLightColor", 3).with_semantic("LightColor"),
        ))
        .with_variable(MemoryVariable::new(
            VariableDesc::bool_scalar("keyLightEnable").with_semantic("LightEnable"),
        ))
        .with_variable(MemoryVariable::new(
            VariableDesc::float_vector("ambLightColor", 3).with_semantic("Ambient"),
        ));

    let mut shader = ShaderInstance::load(Box::new(effect), EngineOptions::new())
        .expect("effect has a technique");

    let mut objects = SceneObjects::new();
    let spot = objects.add("stageSpot");

    println!("light groups:");
    for (name, kind) in shader.light_groups() {
        println!("  {name} ({})", kind.as_str());
    }

    // A scene frame with a real spot light and the merged ambient entry.
    let scene = [
        SceneLightInfo::spot(spot, Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, Vec3::ONE, 2.0, 0.95, 0.9),
        SceneLightInfo::ambient(Vec3::new(0.2, 0.2, 0.3), 1.0),
    ];
    shader.on_update(RenderMode::Scene, 1, &scene, &objects);

    println!("\nscene frame:");
    for (name, _) in shader.light_groups() {
        let source = shader.binding_source(name, &objects).unwrap();
        println!("  {name} <- {}", source.as_deref().unwrap_or("none"));
    }

    // Default lighting: a single synthetic headlamp.
    let headlamp = [SceneLightInfo::headlamp(Vec3::NEG_Z, Vec3::ONE, 1.0)];
    shader.on_update(RenderMode::Scene, 2, &headlamp, &objects);

    println!("\nheadlamp frame:");
    println!(
        "  keyLightEnable = {:?}",
        shader.parameter_value("keyLightEnable").unwrap()
    );
    println!(
        "  ambLightColor  = {:?}",
        shader.parameter_value("ambLightColor").unwrap()
    );

    for notification in shader.take_notifications() {
        println!("pending: {notification:?}");
    }
}

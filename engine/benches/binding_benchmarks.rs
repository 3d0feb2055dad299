use criterion::{criterion_group, criterion_main, Criterion};

use fxlight_core::effect::{MemoryEffect, MemoryVariable, TechniqueDesc, VariableDesc};
use fxlight_core::handle::SceneObjects;
use fxlight_core::scene::SceneLightInfo;
use fxlight_engine::{EngineOptions, RenderMode, ShaderInstance};
use glam::Vec3;

fn four_group_effect() -> MemoryEffect {
    let mut effect = MemoryEffect::new().with_technique(TechniqueDesc::new("Main"));
    for prefix in ["keyLight", "fillLight", "rimLight", "bounceLight"] {
        effect = effect
            .with_variable(MemoryVariable::new(
                VariableDesc::float_vector(format!("{prefix}Pos"), 3).with_semantic("Position"),
            ))
            .with_variable(MemoryVariable::new(
                VariableDesc::float_vector(format!("{prefix}Dir"), 3).with_semantic("Direction"),
            ))
            .with_variable(MemoryVariable::new(
                VariableDesc::float_vector(format!("{prefix}Color"), 3).with_semantic("LightColor"),
            ))
            .with_variable(MemoryVariable::new(
                VariableDesc::scalar(format!("{prefix}Intensity")).with_semantic("LightIntensity"),
            ))
            .with_variable(MemoryVariable::new(
                VariableDesc::bool_scalar(format!("{prefix}Enable")).with_semantic("LightEnable"),
            ));
    }
    effect
}

fn scene_fixture() -> (SceneObjects, Vec<SceneLightInfo>) {
    let mut objects = SceneObjects::new();
    let mut lights = Vec::new();
    for i in 0..8 {
        let id = objects.add(format!("spot{i}"));
        lights.push(SceneLightInfo::spot(
            id,
            Vec3::new(i as f32, 5.0, 0.0),
            Vec3::NEG_Y,
            Vec3::ONE,
            1.0,
            0.9,
            0.8,
        ));
    }
    (objects, lights)
}

fn bench_load(c: &mut Criterion) {
    c.bench_function("load_and_classify", |b| {
        b.iter(|| {
            ShaderInstance::load(Box::new(four_group_effect()), EngineOptions::new()).unwrap()
        })
    });
}

fn bench_update(c: &mut Criterion) {
    let (objects, lights) = scene_fixture();

    c.bench_function("update_cached", |b| {
        let mut shader =
            ShaderInstance::load(Box::new(four_group_effect()), EngineOptions::new()).unwrap();
        let mut stamp = 0u64;
        b.iter(|| {
            stamp += 1;
            shader.on_update(RenderMode::Scene, stamp, &lights, &objects);
        })
    });

    c.bench_function("update_preview", |b| {
        let mut shader =
            ShaderInstance::load(Box::new(four_group_effect()), EngineOptions::new()).unwrap();
        let mut stamp = 0u64;
        b.iter(|| {
            stamp += 1;
            shader.on_update(RenderMode::Preview, stamp, &lights, &objects);
        })
    });
}

criterion_group!(benches, bench_load, bench_update);
criterion_main!(benches);

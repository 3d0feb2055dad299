//! Spot-cone angle conversion helpers.
//!
//! Hosts describe a spot light with a full cone angle and a signed penumbra
//! angle. Shaders want a hotspot (inner) and falloff (outer) half-angle.
//! A negative penumbra blends inward and narrows the hotspot; a positive
//! penumbra blends outward and widens the falloff.

/// Inner (hotspot) half-angle in radians for a full cone angle and a signed
/// penumbra angle, both in radians.
pub fn hotspot_from_cone(cone_angle: f32, penumbra_angle: f32) -> f32 {
    let half_cone = cone_angle * 0.5;
    let half_penumbra = penumbra_angle * 0.5;
    if half_penumbra < 0.0 {
        half_cone + half_penumbra
    } else {
        half_cone
    }
}

/// Outer (falloff) half-angle in radians for a full cone angle and a signed
/// penumbra angle, both in radians.
pub fn falloff_from_cone(cone_angle: f32, penumbra_angle: f32) -> f32 {
    let half_cone = cone_angle * 0.5;
    let half_penumbra = penumbra_angle * 0.5;
    if half_penumbra > 0.0 {
        half_cone + half_penumbra
    } else {
        half_cone
    }
}

//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use gearforge::{Mesh, float_types::Real, profile::Profile};
use nalgebra::Point3;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Relative comparison for volumes and areas.
pub fn rel_eq(a: Real, b: Real, rel: Real) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs())
}

/// Returns the bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]` of a mesh.
pub fn bounding_box(mesh: &Mesh) -> [Real; 6] {
    let bb = mesh.bounding_box();
    [
        bb.mins.x, bb.mins.y, bb.mins.z, bb.maxs.x, bb.maxs.y, bb.maxs.z,
    ]
}

/// Distance from the Z axis.
pub fn radius(p: &Point3<Real>) -> Real {
    p.x.hypot(p.y)
}

/// Smallest and largest distance from the Z axis over the outline points.
pub fn radius_range(profile: &Profile) -> (Real, Real) {
    profile
        .points()
        .iter()
        .map(radius)
        .fold((Real::MAX, Real::MIN), |(lo, hi), r| (lo.min(r), hi.max(r)))
}

/// Largest distance from the Z axis over all mesh vertices.
pub fn max_radius(mesh: &Mesh) -> Real {
    mesh.polygons
        .iter()
        .flat_map(|p| p.vertices.iter())
        .map(radius)
        .fold(0.0, Real::max)
}

//! Turning closed profiles into solids through a [`Kernel`].
//!
//! Spur profiles are extruded straight, helical ones are swept along the Z
//! axis while an auxiliary helix twists them, racks are extruded along a
//! skewed direction and bevel profiles are lofted from toe to heel.

use crate::errors::{ConstructionError, GearResult};
use crate::float_types::{PI, Real};
use crate::kernel::Kernel;
use crate::profile::{Profile, ProfileSegment};
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use tracing::{debug, warn};

/// Kernel wire through every segment of `profile`: one interpolated curve per
/// flank segment, one line per connector.
pub fn profile_wire<K: Kernel>(kernel: &K, profile: &Profile) -> GearResult<K::Wire> {
    let mut curves = Vec::new();
    for segment in profile.segments() {
        match segment {
            ProfileSegment::Tooth(tooth) => {
                for points in &tooth.segments {
                    curves.push(kernel.interpolate(points)?);
                }
            },
            ProfileSegment::Connector { start, end } => curves.push(kernel.line(start, end)?),
        }
    }
    kernel.make_wire(&curves)
}

/// Total rotation of a helical gear of pitch diameter `pitch_diameter` over
/// `height`: the pitch-circle arc `height * tan(helix_angle)` as an angle.
pub fn twist_angle(height: Real, helix_angle: Real, pitch_diameter: Real) -> Real {
    2.0 * height * helix_angle.tan() / pitch_diameter
}

/// Extrude `profile` by `height`, straight when `twist` is zero and as a
/// helical sweep turning by `twist` otherwise.
pub fn build<K: Kernel>(
    kernel: &K,
    profile: &Profile,
    height: Real,
    twist: Real,
) -> GearResult<K::Solid> {
    let wire = profile_wire(kernel, profile)?;
    let face = kernel.make_face(&wire)?;
    if twist == 0.0 {
        debug!(height, "straight extrusion");
        let solid = kernel.extrude(&face, &Vector3::new(0.0, 0.0, height))?;
        orient(kernel, solid)
    } else {
        helical_extrusion(kernel, &wire, &face, height, twist)
    }
}

/// Extrude along a direction leaning by `helix_angle` in the XZ plane, which
/// turns a straight rack into a helical one.
pub fn extrude_skewed<K: Kernel>(
    kernel: &K,
    profile: &Profile,
    height: Real,
    helix_angle: Real,
) -> GearResult<K::Solid> {
    let wire = profile_wire(kernel, profile)?;
    let face = kernel.make_face(&wire)?;
    let direction = Vector3::new(height * helix_angle.tan(), 0.0, height);
    let solid = kernel.extrude(&face, &direction)?;
    orient(kernel, solid)
}

/// Sweep `wire` up the Z axis by `height` while rotating it by `angle`.
///
/// The spine is a straight polyline on the axis; the auxiliary spine is a
/// unit-radius helix through the same number of stations, one more than
/// every quarter turn of `angle` so each guide segment stays well below
/// half a turn. The bottom face and its rotated, lifted copy close the
/// sweep into a shell.
pub fn helical_extrusion<K: Kernel>(
    kernel: &K,
    wire: &K::Wire,
    face: &K::Face,
    height: Real,
    angle: Real,
) -> GearResult<K::Solid> {
    let step = helix_steps(angle);
    let angle_inc = angle / (step - 1) as Real;
    let z_inc = height / (step - 1) as Real;
    let spine: Vec<Point3<Real>> = (0..step)
        .map(|i| Point3::new(0.0, 0.0, i as Real * z_inc))
        .collect();
    let auxiliary: Vec<Point3<Real>> = (0..step)
        .map(|i| {
            let a = i as Real * angle_inc;
            Point3::new(a.cos(), a.sin(), i as Real * z_inc)
        })
        .collect();
    debug!(height, angle, step, "helical extrusion");

    let lid = Matrix4::new_translation(&Vector3::new(0.0, 0.0, height))
        * Rotation3::from_axis_angle(&Vector3::z_axis(), angle).to_homogeneous();
    let top = kernel.transform_face(face, &lid);

    let sweep = kernel.pipe_shell(&spine, &auxiliary, wire);
    if !kernel.sweep_is_ready(&sweep) {
        return Err(ConstructionError::SweepNotReady(
            "kernel reports the pipe shell is not ready".to_string(),
        )
        .into());
    }
    let mut faces = vec![face.clone(), top];
    faces.extend(kernel.build_sweep(sweep)?);

    let shell = kernel.make_shell(faces)?;
    let solid = kernel.make_solid(shell)?;
    orient(kernel, solid)
}

/// Guide points of the auxiliary helix: one more than every quarter turn.
pub fn helix_steps(angle: Real) -> usize {
    2 + (angle.abs() / PI * 4.0).floor() as usize
}

/// Loft a bevel gear between its toe and heel outlines and cap both ends.
///
/// The two profiles must be segment-for-segment copies of each other at
/// different scales; each pair of segments becomes one ruled surface.
pub fn loft_bevel<K: Kernel>(kernel: &K, toe: &Profile, heel: &Profile) -> GearResult<K::Solid> {
    if toe.segments().len() != heel.segments().len() {
        return Err(ConstructionError::MismatchedRows {
            row: 1,
            expected: toe.segments().len(),
            actual: heel.segments().len(),
        }
        .into());
    }

    let mut faces = Vec::new();
    for (inner, outer) in toe.segments().iter().zip(heel.segments()) {
        match (inner, outer) {
            (ProfileSegment::Tooth(a), ProfileSegment::Tooth(b))
                if a.segments.len() == b.segments.len() =>
            {
                for (row_a, row_b) in a.segments.iter().zip(&b.segments) {
                    faces.push(kernel.loft(&[row_a.clone(), row_b.clone()])?);
                }
            },
            (
                ProfileSegment::Connector { start: s0, end: e0 },
                ProfileSegment::Connector { start: s1, end: e1 },
            ) => faces.push(kernel.loft(&[vec![*s0, *e0], vec![*s1, *e1]])?),
            _ => {
                return Err(ConstructionError::MismatchedRows {
                    row: 1,
                    expected: inner.points_len(),
                    actual: outer.points_len(),
                }
                .into());
            },
        }
    }
    faces.push(kernel.fill_wire(&profile_wire(kernel, toe)?)?);
    faces.push(kernel.fill_wire(&profile_wire(kernel, heel)?)?);
    debug!(faces = faces.len(), "lofted bevel faces");

    let shell = kernel.make_shell(faces)?;
    let solid = kernel.make_solid(shell)?;
    orient(kernel, solid)
}

/// Make the solid face outwards, reversing it once if its volume is negative.
fn orient<K: Kernel>(kernel: &K, solid: K::Solid) -> GearResult<K::Solid> {
    let volume = kernel.volume(&solid);
    let (solid, volume) = if volume < 0.0 {
        warn!(volume, "solid is inside out, reversing it");
        let reversed = kernel.reverse(solid);
        let volume = kernel.volume(&reversed);
        (reversed, volume)
    } else {
        (solid, volume)
    };
    if volume <= 0.0 {
        return Err(ConstructionError::NonPositiveVolume(volume).into());
    }
    Ok(solid)
}

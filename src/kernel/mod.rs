//! The host-kernel contract.
//!
//! Gear solids are never built directly. The solid builder only talks to a
//! [`Kernel`], which owns curve interpolation, faces, sweeps and solids, so
//! the same gear code drives any geometry backend. [`MeshKernel`] is the
//! polygon-mesh implementation shipped with the crate.

use crate::errors::GearResult;
use crate::float_types::Real;
use nalgebra::{Matrix4, Point3, Vector3};
use std::fmt::Debug;

pub mod mesh;

pub use mesh::MeshKernel;

/// Geometry operations a host kernel provides to the solid builder.
///
/// Construction is fallible: a kernel reports what it cannot build as a
/// [`ConstructionError`](crate::errors::ConstructionError) instead of
/// returning a partial shape.
pub trait Kernel {
    type Curve: Clone + Debug;
    type Wire: Clone + Debug;
    type Face: Clone + Debug;
    type Sweep: Debug;
    type Shell: Debug;
    type Solid: Clone + Debug;

    /// Smooth curve through `points`, in order.
    fn interpolate(&self, points: &[Point3<Real>]) -> GearResult<Self::Curve>;

    /// Straight edge from `start` to `end`.
    fn line(&self, start: &Point3<Real>, end: &Point3<Real>) -> GearResult<Self::Curve>;

    /// Chain curves end to start into one closed wire.
    fn make_wire(&self, curves: &[Self::Curve]) -> GearResult<Self::Wire>;

    /// Planar face bounded by a closed wire.
    fn make_face(&self, wire: &Self::Wire) -> GearResult<Self::Face>;

    /// Face spanning a closed, possibly non-planar wire.
    fn fill_wire(&self, wire: &Self::Wire) -> GearResult<Self::Face>;

    fn transform_face(&self, face: &Self::Face, matrix: &Matrix4<Real>) -> Self::Face;

    /// Prism swept by translating `face` along `direction`.
    fn extrude(&self, face: &Self::Face, direction: &Vector3<Real>) -> GearResult<Self::Solid>;

    /// Prepare a pipe shell sweeping `profile` along `spine`, with
    /// `auxiliary_spine` fixing the profile's rotation along the way.
    fn pipe_shell(
        &self,
        spine: &[Point3<Real>],
        auxiliary_spine: &[Point3<Real>],
        profile: &Self::Wire,
    ) -> Self::Sweep;

    fn sweep_is_ready(&self, sweep: &Self::Sweep) -> bool;

    /// Side faces of a ready sweep.
    fn build_sweep(&self, sweep: Self::Sweep) -> GearResult<Vec<Self::Face>>;

    /// Surface through `rows` of equally many points; rows run along the
    /// first parameter, consecutive rows along the second.
    fn loft(&self, rows: &[Vec<Point3<Real>>]) -> GearResult<Self::Face>;

    /// Sew faces into a closed shell.
    fn make_shell(&self, faces: Vec<Self::Face>) -> GearResult<Self::Shell>;

    fn make_solid(&self, shell: Self::Shell) -> GearResult<Self::Solid>;

    /// Signed volume; negative when the solid is inside out.
    fn volume(&self, solid: &Self::Solid) -> Real;

    /// Flip the solid's orientation.
    fn reverse(&self, solid: Self::Solid) -> Self::Solid;
}

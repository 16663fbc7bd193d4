//! Gear construction errors

use crate::float_types::Real;
use nalgebra::Point3;

/// Result type used across the crate.
pub type GearResult<T> = Result<T, GearError>;

/// Everything that can stop a gear from being built.
///
/// Nothing here is retried: the pipeline is deterministic, so the same
/// parameters always fail the same way.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GearError {
    /// A parameter is out of range, or a combination of parameters collapses
    /// a derived dimension (root radius, tip thickness, root gap, ...).
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter (or derived dimension) at fault.
        name: &'static str,
        /// Offending value.
        value: Real,
        /// Human readable explanation.
        reason: String,
    },
    /// The kernel could not turn valid curves into a solid.
    #[error("construction failed: {0}")]
    Construction(#[from] ConstructionError),
}

impl GearError {
    pub fn invalid(name: &'static str, value: Real, reason: impl Into<String>) -> Self {
        GearError::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }

    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(self, GearError::InvalidParameter { .. })
    }

    pub const fn is_construction(&self) -> bool {
        matches!(self, GearError::Construction(_))
    }
}

/// Failures reported by a [`Kernel`](crate::kernel::Kernel) while building
/// wires, faces, shells and solids.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    /// (TooFewPoints) A curve, wire or loft row has fewer than the minimal #points
    #[error("(TooFewPoints) need at least {min} points, got {actual}")]
    TooFewPoints { min: usize, actual: usize },
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// (DisconnectedWire) Consecutive curves of a wire do not meet
    #[error("(DisconnectedWire) curve {index} starts {gap} away from the previous end at: {at}")]
    DisconnectedWire {
        index: usize,
        gap: Real,
        at: Point3<Real>,
    },
    /// (WireNotClosed) The wire's first and last points differ
    #[error("(WireNotClosed) The wire's first({first}) and last({last}) points differ")]
    WireNotClosed {
        first: Point3<Real>,
        last: Point3<Real>,
    },
    /// (NonPlanar) A face boundary does not lie in one plane
    #[error("(NonPlanar) boundary point deviates {deviation} from its plane at: {at}")]
    NonPlanar { deviation: Real, at: Point3<Real> },
    /// (SelfIntersection) A profile self-intersects
    #[error("(SelfIntersection) A profile self-intersects at: {0}")]
    SelfIntersection(Point3<Real>),
    /// (MismatchedRows) Loft rows have different lengths
    #[error("(MismatchedRows) loft row {row} has {actual} points, expected {expected}")]
    MismatchedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// (SweepNotReady) The sweep spine, guide or profile cannot be swept
    #[error("(SweepNotReady) {0}")]
    SweepNotReady(String),
    /// (NonManifold) The assembled shell is open or has edges shared by more than two faces
    #[error("(NonManifold) {boundary_edges} boundary edges, {overshared_edges} edges shared by more than two faces")]
    NonManifold {
        boundary_edges: usize,
        overshared_edges: usize,
    },
    /// (NonOrientable) Neighbouring faces cannot be given a consistent winding
    #[error("(NonOrientable) The shell cannot be oriented consistently near: {0}")]
    NonOrientable(Point3<Real>),
    /// (NonPositiveVolume) The solid still has non-positive volume after the orientation flip
    #[error("(NonPositiveVolume) solid volume {0} after orientation flip")]
    NonPositiveVolume(Real),
}

//! Tooth-curve generators.
//!
//! Each family maps a [`GearSpec`] to the point sequences of **one** tooth,
//! centred on the +X axis. A tooth is traversed from the root of its upper
//! flank (positive polar angle), up to the tip, across the tip and down the
//! lower flank, so that consecutive teeth placed at `-i * phipart` chain
//! together clockwise.

use crate::errors::GearResult;
use crate::float_types::Real;
use crate::gear_spec::{GearSpec, ToothFamily};
use nalgebra::{Point3, Rotation3, Vector3};

pub mod bevel;
pub mod cycloid;
pub mod involute;
pub mod rack;

pub use bevel::BevelTooth;
pub use cycloid::CycloidTooth;
pub use involute::InvoluteTooth;
pub use rack::Rack;

/// The flank point sequences of one tooth.
///
/// `segments` are ordered and connected: the last point of a segment is the
/// first point of the next. Each segment is meant to be interpolated into
/// one smooth curve by the kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct ToothCurve {
    pub segments: Vec<Vec<Point3<Real>>>,
}

impl ToothCurve {
    pub const fn new(segments: Vec<Vec<Point3<Real>>>) -> Self {
        ToothCurve { segments }
    }

    /// First point of the first segment.
    pub fn start(&self) -> Option<Point3<Real>> {
        self.segments.first().and_then(|s| s.first()).copied()
    }

    /// Last point of the last segment.
    pub fn end(&self) -> Option<Point3<Real>> {
        self.segments.last().and_then(|s| s.last()).copied()
    }

    /// All points in traversal order, without repeating segment joints.
    pub fn points(&self) -> Vec<Point3<Real>> {
        let mut out: Vec<Point3<Real>> = Vec::new();
        for segment in &self.segments {
            let skip = usize::from(!out.is_empty());
            out.extend(segment.iter().skip(skip).copied());
        }
        out
    }

    /// Rotate every point about the Z (gear) axis.
    pub fn rotated(&self, angle: Real) -> Self {
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), angle);
        self.map(|p| rot * p)
    }

    /// Uniformly scale every point about the origin.
    pub fn scaled(&self, factor: Real) -> Self {
        self.map(|p| scale_point(p, factor))
    }

    /// Smallest and largest distance from the Z axis over all points.
    pub fn radius_range(&self) -> (Real, Real) {
        self.segments
            .iter()
            .flatten()
            .map(|p| p.x.hypot(p.y))
            .fold((Real::MAX, Real::MIN), |(lo, hi), r| (lo.min(r), hi.max(r)))
    }

    fn map(&self, f: impl Fn(&Point3<Real>) -> Point3<Real>) -> Self {
        ToothCurve {
            segments: self
                .segments
                .iter()
                .map(|segment| segment.iter().map(&f).collect())
                .collect(),
        }
    }
}

/// Scale a point about the origin by an explicit factor.
#[inline]
pub fn scale_point(p: &Point3<Real>, factor: Real) -> Point3<Real> {
    Point3::from(p.coords * factor)
}

/// Mirror a sequence of points across the XZ plane and reverse its order,
/// turning an upper flank (root to tip) into the lower flank (tip to root).
pub(crate) fn mirrored_reversed(points: &[Point3<Real>]) -> Vec<Point3<Real>> {
    points.iter().rev().map(|p| Point3::new(p.x, -p.y, p.z)).collect()
}

/// Assemble a symmetric tooth from the segments of its upper flank
/// (ordered root to tip). The lower flank is the mirror image, and a tip
/// segment joins the two.
pub(crate) fn symmetric_tooth(upper: Vec<Vec<Point3<Real>>>) -> ToothCurve {
    let lower: Vec<Vec<Point3<Real>>> =
        upper.iter().rev().map(|s| mirrored_reversed(s)).collect();
    let mut segments = Vec::with_capacity(upper.len() * 2 + 1);
    let tip_upper = upper.last().and_then(|s| s.last()).copied();
    let tip_lower = lower.first().and_then(|s| s.first()).copied();
    segments.extend(upper);
    if let (Some(a), Some(b)) = (tip_upper, tip_lower) {
        segments.push(vec![a, b]);
    }
    segments.extend(lower);
    ToothCurve::new(segments)
}

/// `num` evenly spaced values from `start` to `end` inclusive.
pub(crate) fn linspace(start: Real, end: Real, num: usize) -> impl Iterator<Item = Real> {
    let steps = num.max(2) - 1;
    (0..=steps).map(move |i| {
        if i == steps {
            end
        } else {
            start + (end - start) * (i as Real) / (steps as Real)
        }
    })
}

/// Point in the XY plane from polar coordinates.
#[inline]
pub(crate) fn polar(radius: Real, angle: Real) -> Point3<Real> {
    Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
}

/// Common interface of the circular tooth families.
pub trait ToothGenerator {
    /// Angular pitch, `2π / teeth`.
    fn phipart(&self) -> Real;

    /// Reference pitch diameter used for the helical twist.
    fn pitch_diameter(&self) -> Real;

    /// One tooth sampled with `num_points` points per flank segment.
    fn generate(&self, num_points: usize) -> GearResult<ToothCurve>;
}

/// What a family hands over to the assembler and solid builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// One planar tooth, to be replicated around the Z axis.
    Planar {
        tooth: ToothCurve,
        phipart: Real,
        pitch_diameter: Real,
    },
    /// Toe and heel copies of one bevel tooth on concentric spheres.
    Conical {
        toe: ToothCurve,
        heel: ToothCurve,
        phipart: Real,
    },
    /// A closed rack polygon in the XY plane.
    Rack { polygon: Vec<Point3<Real>> },
}

/// Generate the tooth geometry for `spec`, sampled with `num_points` points
/// per flank segment.
pub fn generate(spec: &GearSpec, num_points: usize) -> GearResult<Outline> {
    spec.validate()?;
    match spec.family {
        ToothFamily::Involute => planar(&InvoluteTooth::new(spec)?, num_points),
        ToothFamily::Cycloid { .. } => planar(&CycloidTooth::new(spec)?, num_points),
        ToothFamily::Bevel { .. } => {
            let bevel = BevelTooth::new(spec)?;
            let (toe, heel) = bevel.toe_and_heel(num_points)?;
            Ok(Outline::Conical {
                toe,
                heel,
                phipart: bevel.phipart(),
            })
        },
        ToothFamily::Rack { .. } => Ok(Outline::Rack {
            polygon: Rack::new(spec)?.polygon(),
        }),
    }
}

fn planar(generator: &impl ToothGenerator, num_points: usize) -> GearResult<Outline> {
    Ok(Outline::Planar {
        tooth: generator.generate(num_points)?,
        phipart: generator.phipart(),
        pitch_diameter: generator.pitch_diameter(),
    })
}

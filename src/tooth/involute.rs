//! Involute tooth, optionally with the trochoidal root a rack cutter leaves
//! behind when it undercuts the flank.
//!
//! Helical gears are generated in the transverse section: the module and the
//! pressure angle are converted with the helix angle before any radius is
//! derived, so the extruded section meshes with a normal-module rack.

use super::{ToothCurve, ToothGenerator, linspace, polar, symmetric_tooth};
use crate::errors::{GearError, GearResult};
use crate::float_types::{PI, Real, TAU, tolerance, tolerance_for};
use crate::gear_spec::GearSpec;
use nalgebra::Point3;
use tracing::debug;

/// Radii sampled when looking for the trochoid / involute junction.
const JUNCTION_SCAN: usize = 64;
/// Bisection and golden-section iterations refining the junction.
const REFINE_ITERATIONS: usize = 80;

/// Derived dimensions of one involute tooth in the transverse plane.
///
/// The upper flank sits at positive polar angles: its polar angle on radius
/// `R` is `theta0 - inv(acos(rb / R))`, where `theta0` is the half tooth
/// angle at the pitch circle plus `inv(alpha_t)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoluteTooth {
    teeth: usize,
    pitch_radius: Real,
    base_radius: Real,
    tip_radius: Real,
    root_radius: Real,
    pressure_angle: Real,
    /// Half tooth thickness at the pitch circle as an angle, backlash removed.
    half_angle: Real,
    undercut: bool,
}

#[inline]
fn inv(angle: Real) -> Real {
    angle.tan() - angle
}

impl InvoluteTooth {
    pub fn new(spec: &GearSpec) -> GearResult<Self> {
        let z = spec.teeth as Real;
        let normal_module = spec.module;
        let cos_beta = spec.helix_angle.cos();
        let transverse_module = normal_module / cos_beta;
        let pressure_angle = (spec.pressure_angle.tan() / cos_beta).atan();

        let pitch_radius = 0.5 * z * transverse_module;
        let tip_radius = pitch_radius + normal_module * (1.0 + spec.shift);
        let root_radius = pitch_radius - normal_module * (1.0 + spec.clearance - spec.shift);
        let base_radius = pitch_radius * pressure_angle.cos();
        debug!(
            pitch_radius,
            base_radius, tip_radius, root_radius, "involute tooth dimensions"
        );

        if root_radius <= 0.0 {
            return Err(GearError::invalid(
                "root_radius",
                root_radius,
                "clearance and profile shift collapse the root circle",
            ));
        }
        if tip_radius <= base_radius {
            return Err(GearError::invalid(
                "tip_radius",
                tip_radius,
                format!("tip circle lies inside the base circle {base_radius}"),
            ));
        }

        let thickness = 0.5 * PI * transverse_module
            + 2.0 * spec.shift * normal_module * pressure_angle.tan()
            - 0.5 * spec.backlash;
        let half_angle = thickness / (2.0 * pitch_radius);
        if half_angle <= 0.0 {
            return Err(GearError::invalid(
                "backlash",
                spec.backlash,
                "no tooth thickness left at the pitch circle",
            ));
        }

        let tooth = InvoluteTooth {
            teeth: spec.teeth,
            pitch_radius,
            base_radius,
            tip_radius,
            root_radius,
            pressure_angle,
            half_angle,
            undercut: spec.undercut,
        };

        let tip_angle = tooth.involute_angle(tip_radius);
        if tip_angle <= tolerance() {
            return Err(GearError::invalid(
                "shift",
                spec.shift,
                format!("teeth are pointed, tip half angle {tip_angle}"),
            ));
        }
        let root_angle = tooth.root_angle();
        if root_angle >= 0.5 * tooth.phipart() {
            return Err(GearError::invalid(
                "teeth",
                z,
                format!("adjacent teeth overlap at the root circle (root half angle {root_angle})"),
            ));
        }
        Ok(tooth)
    }

    pub const fn pitch_radius(&self) -> Real {
        self.pitch_radius
    }

    pub const fn base_radius(&self) -> Real {
        self.base_radius
    }

    pub const fn tip_radius(&self) -> Real {
        self.tip_radius
    }

    pub const fn root_radius(&self) -> Real {
        self.root_radius
    }

    /// Transverse pressure angle.
    pub const fn pressure_angle(&self) -> Real {
        self.pressure_angle
    }

    fn theta0(&self) -> Real {
        self.half_angle + inv(self.pressure_angle)
    }

    /// Roll parameter `tan(acos(rb / R))` of the involute at radius `R`.
    fn roll(&self, radius: Real) -> Real {
        ((radius / self.base_radius).powi(2) - 1.0).max(0.0).sqrt()
    }

    fn involute_angle(&self, radius: Real) -> Real {
        let t = self.roll(radius);
        self.theta0() - (t - t.atan())
    }

    fn involute_point(&self, t: Real) -> Point3<Real> {
        polar(
            self.base_radius * (1.0 + t * t).sqrt(),
            self.theta0() - (t - t.atan()),
        )
    }

    fn involute_points(&self, from_roll: Real, num: usize) -> Vec<Point3<Real>> {
        linspace(from_roll, self.roll(self.tip_radius), num)
            .map(|t| self.involute_point(t))
            .collect()
    }

    /// Polar angle of the cutter tip corner at `sigma = 0`, i.e. on the root circle.
    fn trochoid_offset(&self) -> Real {
        self.half_angle
            + (self.pitch_radius - self.root_radius) * self.pressure_angle.tan() / self.pitch_radius
    }

    /// Polar angle of the trochoid traced by the cutter tip corner, where
    /// `sigma` is the corner's offset along the tip line.
    fn trochoid_angle(&self, sigma: Real) -> Real {
        self.trochoid_offset() + sigma / self.pitch_radius - (sigma / self.root_radius).atan()
    }

    fn trochoid_point(&self, sigma: Real) -> Point3<Real> {
        polar(
            self.root_radius.hypot(sigma),
            self.trochoid_angle(sigma),
        )
    }

    /// Angular gap between trochoid and involute on radius `R`.
    fn flank_gap(&self, radius: Real) -> Real {
        let sigma = (radius * radius - self.root_radius * self.root_radius)
            .max(0.0)
            .sqrt();
        self.trochoid_angle(sigma) - self.involute_angle(radius)
    }

    fn root_angle(&self) -> Real {
        if self.undercut {
            self.trochoid_offset()
        } else {
            self.involute_angle(self.base_radius.max(self.root_radius))
        }
    }

    /// Radius where the trochoid hands over to the involute.
    ///
    /// When the cutter undercuts, the two curves cross; otherwise the trochoid
    /// only touches the involute at the form circle, the minimum of the gap.
    fn junction_radius(&self) -> GearResult<Real> {
        let lo = self.base_radius.max(self.root_radius);
        let radii: Vec<Real> = linspace(lo, self.tip_radius, JUNCTION_SCAN + 1).collect();
        let gaps: Vec<Real> = radii.iter().map(|&r| self.flank_gap(r)).collect();
        let undercut = gaps[0] < 0.0;
        let crossing = if undercut {
            gaps.iter().position(|&g| g >= 0.0)
        } else {
            gaps.iter().position(|&g| g < 0.0)
        };

        let radius = match crossing {
            Some(k) => bisect(|r| self.flank_gap(r), radii[k - 1], radii[k]),
            None if undercut => {
                return Err(GearError::invalid(
                    "teeth",
                    self.teeth as Real,
                    "undercut removes the whole involute flank",
                ));
            },
            None => {
                let k = gaps
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.total_cmp(b.1))
                    .map_or(0, |(k, _)| k);
                golden_min(
                    |r| self.flank_gap(r),
                    radii[k.saturating_sub(1)],
                    radii[(k + 1).min(JUNCTION_SCAN)],
                )
            },
        };
        if radius >= self.tip_radius - tolerance_for(self.tip_radius) {
            return Err(GearError::invalid(
                "teeth",
                self.teeth as Real,
                "undercut reaches the tip circle",
            ));
        }
        debug!(radius, undercut, "trochoid junction");
        Ok(radius)
    }
}

fn bisect(f: impl Fn(Real) -> Real, mut a: Real, mut b: Real) -> Real {
    let negative_at_a = f(a) < 0.0;
    for _ in 0..REFINE_ITERATIONS {
        let mid = 0.5 * (a + b);
        if (f(mid) < 0.0) == negative_at_a {
            a = mid;
        } else {
            b = mid;
        }
    }
    0.5 * (a + b)
}

fn golden_min(f: impl Fn(Real) -> Real, mut a: Real, mut b: Real) -> Real {
    let ratio = 0.5 * ((5.0 as Real).sqrt() - 1.0);
    let mut c = b - ratio * (b - a);
    let mut d = a + ratio * (b - a);
    for _ in 0..REFINE_ITERATIONS {
        if f(c) < f(d) {
            b = d;
        } else {
            a = c;
        }
        c = b - ratio * (b - a);
        d = a + ratio * (b - a);
    }
    0.5 * (a + b)
}

impl ToothGenerator for InvoluteTooth {
    fn phipart(&self) -> Real {
        TAU / self.teeth as Real
    }

    fn pitch_diameter(&self) -> Real {
        2.0 * self.pitch_radius
    }

    fn generate(&self, num_points: usize) -> GearResult<ToothCurve> {
        let upper = if self.undercut {
            let junction = self.junction_radius()?;
            let sigma_end = (junction * junction - self.root_radius * self.root_radius)
                .max(0.0)
                .sqrt();
            let mut trochoid: Vec<Point3<Real>> = linspace(0.0, sigma_end, num_points)
                .map(|sigma| self.trochoid_point(sigma))
                .collect();
            let involute = self.involute_points(self.roll(junction), num_points);
            if let (Some(last), Some(first)) = (trochoid.last_mut(), involute.first()) {
                *last = *first;
            }
            if trochoid.iter().any(|p| p.y.atan2(p.x) <= 0.0) {
                return Err(GearError::invalid(
                    "teeth",
                    self.teeth as Real,
                    "undercut cuts through the tooth root",
                ));
            }
            vec![trochoid, involute]
        } else if self.base_radius > self.root_radius {
            let involute = self.involute_points(0.0, num_points);
            let radial = vec![polar(self.root_radius, self.theta0()), involute[0]];
            vec![radial, involute]
        } else {
            vec![self.involute_points(self.roll(self.root_radius), num_points)]
        };
        Ok(symmetric_tooth(upper))
    }
}

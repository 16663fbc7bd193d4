//! Cycloidal tooth: an epicycloid addendum rolled outside the pitch circle
//! and a hypocycloid dedendum rolled inside it.

use super::{ToothCurve, ToothGenerator, linspace, symmetric_tooth};
use crate::errors::{GearError, GearResult};
use crate::float_types::{PI, Real, TAU, tolerance};
use crate::gear_spec::{GearSpec, ToothFamily};
use nalgebra::Point3;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CycloidTooth {
    teeth: usize,
    pitch_radius: Real,
    tip_radius: Real,
    root_radius: Real,
    /// Radius of the circle rolling inside the pitch circle.
    inner_radius: Real,
    /// Radius of the circle rolling outside the pitch circle.
    outer_radius: Real,
    half_angle: Real,
}

impl CycloidTooth {
    pub fn new(spec: &GearSpec) -> GearResult<Self> {
        let ToothFamily::Cycloid {
            inner_diameter,
            outer_diameter,
        } = spec.family
        else {
            return Err(GearError::invalid(
                "family",
                0.0,
                format!("expected a cycloid gear, got {}", spec.family.name()),
            ));
        };
        let m = spec.module;
        let pitch_radius = 0.5 * m * spec.teeth as Real;
        let tooth = CycloidTooth {
            teeth: spec.teeth,
            pitch_radius,
            tip_radius: pitch_radius + m,
            root_radius: pitch_radius - m * (1.0 + spec.clearance),
            inner_radius: 0.5 * inner_diameter,
            outer_radius: 0.5 * outer_diameter,
            half_angle: (0.5 * PI * m - 0.5 * spec.backlash) / (2.0 * pitch_radius),
        };
        debug!(
            pitch_radius,
            tip_radius = tooth.tip_radius,
            root_radius = tooth.root_radius,
            "cycloid tooth dimensions"
        );

        if tooth.root_radius <= 0.0 {
            return Err(GearError::invalid(
                "clearance",
                spec.clearance,
                "root circle collapses",
            ));
        }
        if tooth.half_angle <= 0.0 {
            return Err(GearError::invalid(
                "backlash",
                spec.backlash,
                "no tooth thickness left at the pitch circle",
            ));
        }
        if tooth.inner_radius > 0.5 * pitch_radius {
            return Err(GearError::invalid(
                "inner_diameter",
                inner_diameter,
                "inner rolling circle is larger than half the pitch circle",
            ));
        }

        let tip = tooth.upper(tooth.epicycloid(tooth.outer_end()?));
        let tip_angle = tip.y.atan2(tip.x);
        if tip_angle <= tolerance() {
            return Err(GearError::invalid(
                "outer_diameter",
                outer_diameter,
                format!("teeth are pointed, tip half angle {tip_angle}"),
            ));
        }
        let root = tooth.upper(tooth.hypocycloid(tooth.inner_end()?));
        let root_angle = root.y.atan2(root.x);
        if root_angle >= 0.5 * tooth.phipart() {
            return Err(GearError::invalid(
                "inner_diameter",
                inner_diameter,
                format!("adjacent teeth overlap at the root circle (root half angle {root_angle})"),
            ));
        }
        Ok(tooth)
    }

    pub const fn tip_radius(&self) -> Real {
        self.tip_radius
    }

    pub const fn root_radius(&self) -> Real {
        self.root_radius
    }

    /// Point traced by the outer rolling circle after rolling `t` radians of
    /// the pitch circle, starting at the pitch point `(r, 0)`.
    fn epicycloid(&self, t: Real) -> Point3<Real> {
        let (r, rho) = (self.pitch_radius, self.outer_radius);
        let k = (r + rho) / rho;
        Point3::new(
            (r + rho) * t.cos() - rho * (k * t).cos(),
            (r + rho) * t.sin() - rho * (k * t).sin(),
            0.0,
        )
    }

    /// Same for the inner rolling circle. Negative `t` rolls below the X axis.
    fn hypocycloid(&self, t: Real) -> Point3<Real> {
        let (r, rho) = (self.pitch_radius, self.inner_radius);
        let k = (r - rho) / rho;
        Point3::new(
            (r - rho) * t.cos() + rho * (k * t).cos(),
            (r - rho) * t.sin() - rho * (k * t).sin(),
            0.0,
        )
    }

    /// Rolling angle at which the epicycloid reaches the tip circle.
    fn outer_end(&self) -> GearResult<Real> {
        let (r, rho, ra) = (self.pitch_radius, self.outer_radius, self.tip_radius);
        let cos = ((r + rho).powi(2) + rho * rho - ra * ra) / (2.0 * rho * (r + rho));
        if !(-1.0..=1.0).contains(&cos) {
            return Err(GearError::invalid(
                "outer_diameter",
                2.0 * rho,
                "outer rolling circle cannot reach the tip circle",
            ));
        }
        Ok(rho / r * cos.acos())
    }

    /// Rolling angle (negative) at which the hypocycloid reaches the root circle.
    fn inner_end(&self) -> GearResult<Real> {
        let (r, rho, rf) = (self.pitch_radius, self.inner_radius, self.root_radius);
        let cos = (rf * rf - (r - rho).powi(2) - rho * rho) / (2.0 * rho * (r - rho));
        if !(-1.0..=1.0).contains(&cos) {
            return Err(GearError::invalid(
                "inner_diameter",
                2.0 * rho,
                "inner rolling circle cannot reach the root circle",
            ));
        }
        Ok(-rho / r * cos.acos())
    }

    /// Mirror a raw rolling point onto the upper flank, whose pitch point
    /// sits at polar angle `half_angle`.
    fn upper(&self, p: Point3<Real>) -> Point3<Real> {
        let (sin, cos) = self.half_angle.sin_cos();
        Point3::new(p.x * cos + p.y * sin, p.x * sin - p.y * cos, 0.0)
    }
}

impl ToothGenerator for CycloidTooth {
    fn phipart(&self) -> Real {
        TAU / self.teeth as Real
    }

    fn pitch_diameter(&self) -> Real {
        2.0 * self.pitch_radius
    }

    fn generate(&self, num_points: usize) -> GearResult<ToothCurve> {
        let dedendum: Vec<Point3<Real>> = linspace(self.inner_end()?, 0.0, num_points)
            .map(|t| self.upper(self.hypocycloid(t)))
            .collect();
        let mut addendum: Vec<Point3<Real>> = linspace(0.0, self.outer_end()?, num_points)
            .map(|t| self.upper(self.epicycloid(t)))
            .collect();
        if let (Some(pitch), Some(first)) = (dedendum.last(), addendum.first_mut()) {
            *first = *pitch;
        }
        Ok(symmetric_tooth(vec![dedendum, addendum]))
    }
}

//! Straight-sided rack, the involute gear of infinite radius.
//!
//! The pitch line is the X axis and the teeth point towards +Y, one circular
//! pitch `π·m` apart, with the first tooth centred on the origin. The body
//! below the root line is `thickness` deep.

use crate::errors::{GearError, GearResult};
use crate::float_types::{PI, Real, tolerance_for};
use crate::gear_spec::{GearSpec, ToothFamily};
use nalgebra::Point3;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Rack {
    teeth: usize,
    pitch: Real,
    /// Tooth thickness on the pitch line, backlash removed.
    thickness_at_pitch: Real,
    addendum: Real,
    dedendum: Real,
    flank_slope: Real,
    body: Real,
}

impl Rack {
    pub fn new(spec: &GearSpec) -> GearResult<Self> {
        let ToothFamily::Rack { thickness } = spec.family else {
            return Err(GearError::invalid(
                "family",
                0.0,
                format!("expected a rack, got {}", spec.family.name()),
            ));
        };
        let m = spec.module;
        let rack = Rack {
            teeth: spec.teeth,
            pitch: PI * m,
            thickness_at_pitch: 0.5 * PI * m - 0.5 * spec.backlash,
            addendum: m,
            dedendum: (1.0 + spec.clearance) * m,
            flank_slope: spec.pressure_angle.tan(),
            body: thickness,
        };

        let tip_width = rack.thickness_at_pitch - 2.0 * rack.addendum * rack.flank_slope;
        if tip_width <= tolerance_for(rack.addendum) {
            return Err(GearError::invalid(
                "pressure_angle",
                spec.pressure_angle,
                format!("rack teeth are pointed, tip width {tip_width}"),
            ));
        }
        let root_gap =
            rack.pitch - rack.thickness_at_pitch - 2.0 * rack.dedendum * rack.flank_slope;
        if root_gap < 0.0 {
            return Err(GearError::invalid(
                "clearance",
                spec.clearance,
                format!("adjacent rack teeth overlap at the root line by {}", -root_gap),
            ));
        }
        debug!(tip_width, root_gap, "rack tooth dimensions");
        Ok(rack)
    }

    pub const fn pitch(&self) -> Real {
        self.pitch
    }

    /// Closed counter-clockwise outline in the XY plane. The first point is
    /// not repeated at the end.
    pub fn polygon(&self) -> Vec<Point3<Real>> {
        let half = 0.5 * self.thickness_at_pitch;
        let tip_inset = self.addendum * self.flank_slope;
        let root_outset = self.dedendum * self.flank_slope;
        let root_y = -self.dedendum;

        let mut points = Vec::with_capacity(4 * self.teeth + 2);
        for i in 0..self.teeth {
            let x = i as Real * self.pitch;
            points.push(Point3::new(x - half - root_outset, root_y, 0.0));
            points.push(Point3::new(x - half + tip_inset, self.addendum, 0.0));
            points.push(Point3::new(x + half - tip_inset, self.addendum, 0.0));
            points.push(Point3::new(x + half + root_outset, root_y, 0.0));
        }
        let left = points.first().map_or(0.0, |p| p.x);
        let right = points.last().map_or(0.0, |p| p.x);
        points.push(Point3::new(right, root_y - self.body, 0.0));
        points.push(Point3::new(left, root_y - self.body, 0.0));
        // teeth were laid out left to right across the top
        points.reverse();
        points
    }
}

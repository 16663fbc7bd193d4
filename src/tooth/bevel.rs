//! Straight bevel tooth on a spherical involute.
//!
//! The flank is generated on the unit sphere centred on the cone apex, then
//! scaled onto two concentric spheres: the toe (inner end of the face) and
//! the heel (outer end). Lofting between the two copies gives a true conical
//! tooth surface, since every generator line of the flank passes through
//! the apex.

use super::{ToothCurve, ToothGenerator, linspace, symmetric_tooth};
use crate::errors::{GearError, GearResult};
use crate::float_types::{PI, Real, TAU, tolerance};
use crate::gear_spec::{GearSpec, ToothFamily};
use nalgebra::Point3;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct BevelTooth {
    teeth: usize,
    module: Real,
    /// Distance from the apex to the heel end of the pitch cone.
    cone_distance: Real,
    face_width: Real,
    pitch_cone: Real,
    base_cone: Real,
    tip_cone: Real,
    root_cone: Real,
    half_angle: Real,
}

impl BevelTooth {
    pub fn new(spec: &GearSpec) -> GearResult<Self> {
        let ToothFamily::Bevel { cone_angle } = spec.family else {
            return Err(GearError::invalid(
                "family",
                0.0,
                format!("expected a bevel gear, got {}", spec.family.name()),
            ));
        };
        let z = spec.teeth as Real;
        let m = spec.module;
        let cone_distance = m * z / (2.0 * cone_angle.sin());
        let base_cone = (cone_angle.sin() * spec.pressure_angle.cos()).asin();
        let tip_cone = cone_angle + (m / cone_distance).atan();
        let root_cone = cone_angle - ((1.0 + spec.clearance) * m / cone_distance).atan();

        let tooth = BevelTooth {
            teeth: spec.teeth,
            module: m,
            cone_distance,
            face_width: spec.height,
            pitch_cone: cone_angle,
            base_cone,
            tip_cone,
            root_cone,
            half_angle: (0.5 * PI * m - 0.5 * spec.backlash) / (m * z),
        };
        debug!(
            cone_distance,
            base_cone, tip_cone, root_cone, "bevel tooth dimensions"
        );

        if root_cone <= 0.0 {
            return Err(GearError::invalid(
                "clearance",
                spec.clearance,
                format!("root cone collapses through the axis ({root_cone} rad)"),
            ));
        }
        if tooth.toe_radius() <= 0.0 {
            return Err(GearError::invalid(
                "height",
                spec.height,
                format!("face width exceeds twice the cone distance {cone_distance}"),
            ));
        }
        if tooth.half_angle <= 0.0 {
            return Err(GearError::invalid(
                "backlash",
                spec.backlash,
                "no tooth thickness left at the pitch cone",
            ));
        }

        let tip = tooth.upper(tooth.involute(tooth.roll(tip_cone)));
        let tip_angle = tip.y.atan2(tip.x);
        if tip_angle <= tolerance() {
            return Err(GearError::invalid(
                "pressure_angle",
                spec.pressure_angle,
                format!("teeth are pointed, tip half angle {tip_angle}"),
            ));
        }
        let root_angle = tooth.root_azimuth();
        if root_angle >= 0.5 * tooth.phipart() {
            return Err(GearError::invalid(
                "teeth",
                z,
                format!("adjacent teeth overlap at the root cone (root half angle {root_angle})"),
            ));
        }
        Ok(tooth)
    }

    pub const fn cone_distance(&self) -> Real {
        self.cone_distance
    }

    pub fn toe_radius(&self) -> Real {
        self.cone_distance - 0.5 * self.face_width
    }

    pub fn heel_radius(&self) -> Real {
        self.cone_distance + 0.5 * self.face_width
    }

    /// Roll angle at which the spherical involute reaches polar angle `cone`.
    fn roll(&self, cone: Real) -> Real {
        let cos = (cone.cos() / self.base_cone.cos()).clamp(-1.0, 1.0);
        cos.acos() / self.base_cone.sin()
    }

    /// Spherical involute on the unit sphere, starting on the base cone at
    /// azimuth 0 and unwinding towards positive azimuth.
    fn involute(&self, theta: Real) -> Point3<Real> {
        let sin_b = self.base_cone.sin();
        let s = theta * sin_b;
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_s, cos_s) = s.sin_cos();
        Point3::new(
            sin_b * cos_t * cos_s + sin_t * sin_s,
            sin_b * sin_t * cos_s - cos_t * sin_s,
            self.base_cone.cos() * cos_s,
        )
    }

    /// Azimuth offset that puts the upper flank's pitch point at `half_angle`.
    fn pitch_offset(&self) -> Real {
        let p = self.involute(self.roll(self.pitch_cone));
        self.half_angle + p.y.atan2(p.x)
    }

    /// Reflect a raw involute point and rotate it onto the upper flank.
    fn upper(&self, p: Point3<Real>) -> Point3<Real> {
        let (sin, cos) = self.pitch_offset().sin_cos();
        Point3::new(p.x * cos + p.y * sin, p.x * sin - p.y * cos, p.z)
    }

    fn root_azimuth(&self) -> Real {
        if self.root_cone < self.base_cone {
            self.pitch_offset()
        } else {
            let p = self.upper(self.involute(self.roll(self.root_cone)));
            p.y.atan2(p.x)
        }
    }

    /// Toe and heel copies of the tooth, on spheres of radius
    /// `cone_distance ∓ face_width / 2`.
    pub fn toe_and_heel(&self, num_points: usize) -> GearResult<(ToothCurve, ToothCurve)> {
        let unit = self.generate(num_points)?;
        Ok((unit.scaled(self.toe_radius()), unit.scaled(self.heel_radius())))
    }
}

impl ToothGenerator for BevelTooth {
    fn phipart(&self) -> Real {
        TAU / self.teeth as Real
    }

    /// Pitch diameter at the heel.
    fn pitch_diameter(&self) -> Real {
        self.module * self.teeth as Real
    }

    /// One tooth on the unit sphere around the apex.
    fn generate(&self, num_points: usize) -> GearResult<ToothCurve> {
        let start_cone = self.root_cone.max(self.base_cone);
        let involute: Vec<Point3<Real>> =
            linspace(self.roll(start_cone), self.roll(self.tip_cone), num_points)
                .map(|theta| self.upper(self.involute(theta)))
                .collect();

        let upper = if self.root_cone < self.base_cone {
            let azimuth = self.pitch_offset();
            let (sin_a, cos_a) = azimuth.sin_cos();
            let mut meridian: Vec<Point3<Real>> =
                linspace(self.root_cone, self.base_cone, num_points)
                    .map(|cone| {
                        let (sin_c, cos_c) = cone.sin_cos();
                        Point3::new(sin_c * cos_a, sin_c * sin_a, cos_c)
                    })
                    .collect();
            if let (Some(last), Some(first)) = (meridian.last_mut(), involute.first()) {
                *last = *first;
            }
            vec![meridian, involute]
        } else {
            vec![involute]
        };
        Ok(symmetric_tooth(upper))
    }
}

//! `GearSpec`: the immutable parameter set a host hands over on every recompute.

use crate::errors::{GearError, GearResult};
use crate::float_types::{FRAC_PI_2, Real, module_from_diametral_pitch};

/// Smallest tooth count any family accepts.
pub const MIN_TEETH: usize = 3;

/// Which tooth family to generate, together with the parameters only that
/// family understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToothFamily {
    /// Involute of a circle, optionally with a trochoidal undercut root.
    Involute,
    /// Epicycloid tip and hypocycloid root, generated by two rolling circles.
    Cycloid {
        /// Diameter of the rolling circle inside the pitch circle (root flank).
        inner_diameter: Real,
        /// Diameter of the rolling circle outside the pitch circle (tip flank).
        outer_diameter: Real,
    },
    /// Spherical involute on a pitch cone of half-angle `cone_angle` (radians).
    Bevel { cone_angle: Real },
    /// Straight-sided rack backed by a body of the given thickness.
    Rack { thickness: Real },
}

impl ToothFamily {
    pub const fn name(&self) -> &'static str {
        match self {
            ToothFamily::Involute => "involute",
            ToothFamily::Cycloid { .. } => "cycloid",
            ToothFamily::Bevel { .. } => "bevel",
            ToothFamily::Rack { .. } => "rack",
        }
    }
}

/// Parameters of one gear instance.
///
/// Angles are radians, lengths share one unit (millimetres by convention).
/// A `GearSpec` is built fresh for every recompute; everything derived from
/// it is recomputed from scratch.
///
/// # Example
/// ```
/// use gearforge::gear_spec::GearSpec;
///
/// let spec = GearSpec::involute(15, 1.0)
///     .with_helix_angle_deg(15.0)
///     .with_undercut(false);
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GearSpec {
    pub teeth: usize,
    /// Normal module (pitch diameter per tooth for spur gears).
    pub module: Real,
    pub pressure_angle: Real,
    /// Helix angle `beta`. Zero gives a straight extrusion.
    pub helix_angle: Real,
    /// Dedendum clearance as a fraction of the module.
    pub clearance: Real,
    /// Circular backlash at the pitch circle, as a length.
    pub backlash: Real,
    /// Profile shift coefficient (multiples of the module).
    pub shift: Real,
    pub undercut: bool,
    /// Extrusion height, or face width for bevel gears.
    pub height: Real,
    /// Samples per flank segment.
    pub num_points: usize,
    pub family: ToothFamily,
}

impl GearSpec {
    fn with_family(teeth: usize, module: Real, family: ToothFamily) -> Self {
        GearSpec {
            teeth,
            module,
            pressure_angle: (20.0 as Real).to_radians(),
            helix_angle: 0.0,
            clearance: 0.25,
            backlash: 0.0,
            shift: 0.0,
            undercut: true,
            height: 5.0,
            num_points: 6,
            family,
        }
    }

    /// Involute spur gear with the usual defaults (20°, clearance 0.25, undercut on).
    pub fn involute(teeth: usize, module: Real) -> Self {
        Self::with_family(teeth, module, ToothFamily::Involute)
    }

    /// Cycloidal gear with both rolling circles of the given diameter.
    pub fn cycloid(teeth: usize, module: Real, rolling_diameter: Real) -> Self {
        GearSpec {
            num_points: 15,
            undercut: false,
            ..Self::with_family(
                teeth,
                module,
                ToothFamily::Cycloid {
                    inner_diameter: rolling_diameter,
                    outer_diameter: rolling_diameter,
                },
            )
        }
    }

    /// Bevel gear on a pitch cone of half-angle `cone_angle_deg`.
    pub fn bevel(teeth: usize, module: Real, cone_angle_deg: Real) -> Self {
        GearSpec {
            undercut: false,
            ..Self::with_family(
                teeth,
                module,
                ToothFamily::Bevel {
                    cone_angle: cone_angle_deg.to_radians(),
                },
            )
        }
    }

    /// Straight rack with `teeth` teeth and a backing body of `thickness`.
    pub fn rack(teeth: usize, module: Real, thickness: Real) -> Self {
        GearSpec {
            undercut: false,
            ..Self::with_family(teeth, module, ToothFamily::Rack { thickness })
        }
    }

    /// Replace the module by the one matching a diametral pitch (teeth per inch).
    pub fn with_diametral_pitch(mut self, diametral_pitch: Real) -> Self {
        self.module = module_from_diametral_pitch(diametral_pitch);
        self
    }

    pub fn with_pressure_angle_deg(mut self, degrees: Real) -> Self {
        self.pressure_angle = degrees.to_radians();
        self
    }

    pub fn with_helix_angle_deg(mut self, degrees: Real) -> Self {
        self.helix_angle = degrees.to_radians();
        self
    }

    pub const fn with_clearance(mut self, clearance: Real) -> Self {
        self.clearance = clearance;
        self
    }

    pub const fn with_backlash(mut self, backlash: Real) -> Self {
        self.backlash = backlash;
        self
    }

    pub const fn with_shift(mut self, shift: Real) -> Self {
        self.shift = shift;
        self
    }

    pub const fn with_undercut(mut self, undercut: bool) -> Self {
        self.undercut = undercut;
        self
    }

    pub const fn with_height(mut self, height: Real) -> Self {
        self.height = height;
        self
    }

    pub const fn with_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    /// Angular pitch between adjacent teeth, `2π / teeth`.
    pub fn phipart(&self) -> Real {
        crate::float_types::TAU / self.teeth as Real
    }

    /// Check every parameter on its own, before any geometry is generated.
    ///
    /// Combinations that only fail once radii are derived (e.g. a shift that
    /// collapses the root circle) are reported by the tooth generators.
    pub fn validate(&self) -> GearResult<()> {
        if self.teeth < MIN_TEETH {
            return Err(GearError::invalid(
                "teeth",
                self.teeth as Real,
                format!("need at least {MIN_TEETH} teeth"),
            ));
        }
        positive("module", self.module)?;
        positive("height", self.height)?;
        if !(self.pressure_angle > 0.0 && self.pressure_angle < FRAC_PI_2) {
            return Err(GearError::invalid(
                "pressure_angle",
                self.pressure_angle,
                "must lie strictly between 0 and 90 degrees",
            ));
        }
        if !(self.helix_angle.abs() < FRAC_PI_2) {
            return Err(GearError::invalid(
                "helix_angle",
                self.helix_angle,
                "must lie strictly between -90 and 90 degrees",
            ));
        }
        non_negative("clearance", self.clearance)?;
        non_negative("backlash", self.backlash)?;
        if !self.shift.is_finite() {
            return Err(GearError::invalid("shift", self.shift, "must be finite"));
        }
        if self.num_points < 2 {
            return Err(GearError::invalid(
                "num_points",
                self.num_points as Real,
                "need at least 2 samples per flank segment",
            ));
        }

        match self.family {
            ToothFamily::Involute => Ok(()),
            ToothFamily::Cycloid {
                inner_diameter,
                outer_diameter,
            } => {
                positive("inner_diameter", inner_diameter)?;
                positive("outer_diameter", outer_diameter)?;
                let pitch_diameter = self.module * self.teeth as Real;
                if inner_diameter >= pitch_diameter {
                    return Err(GearError::invalid(
                        "inner_diameter",
                        inner_diameter,
                        format!("must be smaller than the pitch diameter {pitch_diameter}"),
                    ));
                }
                Ok(())
            },
            ToothFamily::Bevel { cone_angle } => {
                if !(cone_angle > 0.0 && cone_angle < FRAC_PI_2) {
                    return Err(GearError::invalid(
                        "cone_angle",
                        cone_angle,
                        "must lie strictly between 0 and 90 degrees",
                    ));
                }
                if self.helix_angle != 0.0 {
                    return Err(GearError::invalid(
                        "helix_angle",
                        self.helix_angle,
                        "spiral bevel gears are not supported",
                    ));
                }
                Ok(())
            },
            ToothFamily::Rack { thickness } => positive("thickness", thickness),
        }
    }
}

fn positive(name: &'static str, value: Real) -> GearResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GearError::invalid(name, value, "must be positive"))
    }
}

fn non_negative(name: &'static str, value: Real) -> GearResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GearError::invalid(name, value, "must not be negative"))
    }
}

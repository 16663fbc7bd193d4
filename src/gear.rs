//! End-to-end gear construction: parameters in, solid out.

use crate::errors::GearResult;
use crate::gear_spec::GearSpec;
use crate::kernel::Kernel;
use crate::profile::{self, Profile};
use crate::solid;
use crate::tooth::{self, Outline};
use tracing::{debug, info};

/// The closed outline of `spec` in the XY plane.
///
/// Circular gears give the assembled tooth ring, racks their polygon. Bevel
/// gears give the heel outline, which lies on a sphere rather than a plane.
pub fn outline(spec: &GearSpec) -> GearResult<Profile> {
    match tooth::generate(spec, spec.num_points)? {
        Outline::Planar { tooth, .. } => profile::assemble(&tooth, spec.teeth),
        Outline::Conical { heel, .. } => profile::assemble(&heel, spec.teeth),
        Outline::Rack { polygon } => Profile::polygon(&polygon),
    }
}

/// Generate, assemble and build the solid for `spec` with `kernel`.
///
/// Every call starts from scratch; nothing is cached between builds.
///
/// # Example
/// ```
/// use gearforge::{GearSpec, MeshKernel, gear};
///
/// let solid = gear::build(&GearSpec::involute(15, 1.0), &MeshKernel::new()).unwrap();
/// assert!(solid.signed_volume() > 0.0);
/// ```
pub fn build<K: Kernel>(spec: &GearSpec, kernel: &K) -> GearResult<K::Solid> {
    info!(
        family = spec.family.name(),
        teeth = spec.teeth,
        module = spec.module,
        "building gear"
    );
    let solid = match tooth::generate(spec, spec.num_points)? {
        Outline::Planar {
            tooth,
            pitch_diameter,
            ..
        } => {
            let profile = profile::assemble(&tooth, spec.teeth)?;
            let twist = solid::twist_angle(spec.height, spec.helix_angle, pitch_diameter);
            debug!(twist, "planar profile ready");
            solid::build(kernel, &profile, spec.height, twist)?
        },
        Outline::Conical { toe, heel, .. } => {
            let toe = profile::assemble(&toe, spec.teeth)?;
            let heel = profile::assemble(&heel, spec.teeth)?;
            solid::loft_bevel(kernel, &toe, &heel)?
        },
        Outline::Rack { polygon } => {
            let profile = Profile::polygon(&polygon)?;
            solid::extrude_skewed(kernel, &profile, spec.height, spec.helix_angle)?
        },
    };
    info!(volume = kernel.volume(&solid), "gear built");
    Ok(solid)
}

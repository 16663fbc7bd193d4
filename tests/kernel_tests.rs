mod support;

use gearforge::{
    ConstructionError, GearError, GearResult, GearSpec, Kernel, Mesh, MeshKernel, Real, gear,
    kernel::mesh::{Loop, PipeSweep, Polyline},
    mesh::polygon::Polygon,
    profile::ProfileSegment,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::cell::Cell;
use support::rel_eq;

/// Mesh kernel that counts requests and can misbehave on demand: refuse
/// every sweep, hand back solids facing inwards, ignore `reverse`, or
/// report zero volume.
#[derive(Default)]
struct Recording {
    inner: MeshKernel,
    refuse_sweeps: bool,
    inside_out: bool,
    stubborn: bool,
    flat: bool,
    interpolations: Cell<usize>,
    lines: Cell<usize>,
    reversals: Cell<usize>,
}

impl Recording {
    fn turned(&self, solid: Mesh) -> Mesh {
        if self.inside_out { solid.inverse() } else { solid }
    }
}

impl Kernel for Recording {
    type Curve = Polyline;
    type Wire = Loop;
    type Face = Mesh;
    type Sweep = PipeSweep;
    type Shell = Mesh;
    type Solid = Mesh;

    fn interpolate(&self, points: &[Point3<Real>]) -> GearResult<Polyline> {
        self.interpolations.set(self.interpolations.get() + 1);
        self.inner.interpolate(points)
    }

    fn line(&self, start: &Point3<Real>, end: &Point3<Real>) -> GearResult<Polyline> {
        self.lines.set(self.lines.get() + 1);
        self.inner.line(start, end)
    }

    fn make_wire(&self, curves: &[Polyline]) -> GearResult<Loop> {
        self.inner.make_wire(curves)
    }

    fn make_face(&self, wire: &Loop) -> GearResult<Mesh> {
        self.inner.make_face(wire)
    }

    fn fill_wire(&self, wire: &Loop) -> GearResult<Mesh> {
        self.inner.fill_wire(wire)
    }

    fn transform_face(&self, face: &Mesh, matrix: &Matrix4<Real>) -> Mesh {
        self.inner.transform_face(face, matrix)
    }

    fn extrude(&self, face: &Mesh, direction: &Vector3<Real>) -> GearResult<Mesh> {
        self.inner.extrude(face, direction).map(|s| self.turned(s))
    }

    fn pipe_shell(
        &self,
        spine: &[Point3<Real>],
        auxiliary_spine: &[Point3<Real>],
        profile: &Loop,
    ) -> PipeSweep {
        self.inner.pipe_shell(spine, auxiliary_spine, profile)
    }

    fn sweep_is_ready(&self, sweep: &PipeSweep) -> bool {
        !self.refuse_sweeps && self.inner.sweep_is_ready(sweep)
    }

    fn build_sweep(&self, sweep: PipeSweep) -> GearResult<Vec<Mesh>> {
        self.inner.build_sweep(sweep)
    }

    fn loft(&self, rows: &[Vec<Point3<Real>>]) -> GearResult<Mesh> {
        self.inner.loft(rows)
    }

    fn make_shell(&self, faces: Vec<Mesh>) -> GearResult<Mesh> {
        self.inner.make_shell(faces)
    }

    fn make_solid(&self, shell: Mesh) -> GearResult<Mesh> {
        self.inner.make_solid(shell).map(|s| self.turned(s))
    }

    fn volume(&self, solid: &Mesh) -> Real {
        if self.flat { 0.0 } else { self.inner.volume(solid) }
    }

    fn reverse(&self, solid: Mesh) -> Mesh {
        self.reversals.set(self.reversals.get() + 1);
        if self.stubborn { solid } else { self.inner.reverse(solid) }
    }
}

#[test]
fn builder_asks_one_curve_per_flank_and_one_line_per_connector() {
    let spec = GearSpec::involute(15, 1.0);
    let kernel = Recording::default();
    gear::build(&spec, &kernel).unwrap();

    let outline = gear::outline(&spec).unwrap();
    let flanks: usize = outline
        .segments()
        .iter()
        .map(|s| match s {
            ProfileSegment::Tooth(tooth) => tooth.segments.len(),
            ProfileSegment::Connector { .. } => 0,
        })
        .sum();
    assert_eq!(kernel.interpolations.get(), flanks);
    assert_eq!(kernel.lines.get(), 15);
}

#[test]
fn refused_sweep_fails_the_helical_build() {
    let spec = GearSpec::involute(15, 1.0).with_helix_angle_deg(20.0);
    let kernel = Recording {
        refuse_sweeps: true,
        ..Recording::default()
    };
    let err = gear::build(&spec, &kernel).unwrap_err();
    assert!(matches!(
        err,
        GearError::Construction(ConstructionError::SweepNotReady(_))
    ));
    assert!(err.is_construction());

    // straight gears never sweep
    assert!(gear::build(&GearSpec::involute(15, 1.0), &kernel).is_ok());
}

#[test]
fn inward_solids_are_reversed_once() {
    let reference = MeshKernel::new();
    for spec in [
        GearSpec::involute(15, 1.0),
        GearSpec::involute(15, 1.0).with_helix_angle_deg(15.0),
        GearSpec::bevel(15, 1.0, 45.0),
    ] {
        let kernel = Recording {
            inside_out: true,
            ..Recording::default()
        };
        let solid = gear::build(&spec, &kernel).unwrap();
        assert_eq!(kernel.reversals.get(), 1);
        let expected = reference.volume(&gear::build(&spec, &reference).unwrap());
        assert!(kernel.volume(&solid) > 0.0);
        assert!(rel_eq(kernel.volume(&solid), expected, 1e-12));
    }

    // outward solids are left alone
    let kernel = Recording::default();
    gear::build(&GearSpec::involute(15, 1.0), &kernel).unwrap();
    assert_eq!(kernel.reversals.get(), 0);
}

#[test]
fn solid_that_stays_inward_is_rejected() {
    let kernel = Recording {
        inside_out: true,
        stubborn: true,
        ..Recording::default()
    };
    let err = gear::build(&GearSpec::rack(5, 1.0, 2.0), &kernel).unwrap_err();
    assert_eq!(kernel.reversals.get(), 1);
    match err {
        GearError::Construction(ConstructionError::NonPositiveVolume(volume)) => {
            assert!(volume < 0.0)
        },
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn zero_volume_is_rejected() {
    let kernel = Recording {
        flat: true,
        ..Recording::default()
    };
    let err = gear::build(&GearSpec::cycloid(15, 1.0, 5.0), &kernel).unwrap_err();
    assert!(matches!(
        err,
        GearError::Construction(ConstructionError::NonPositiveVolume(v)) if v == 0.0
    ));
    // nothing to reverse when the volume is not negative
    assert_eq!(kernel.reversals.get(), 0);
}

#[test]
fn sewing_restores_a_scrambled_gear() {
    let kernel = MeshKernel::new();
    let solid = gear::build(&GearSpec::cycloid(15, 1.0, 5.0), &kernel).unwrap();
    let scrambled: Vec<Polygon> = solid
        .polygons
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut p = p.clone();
            if i % 2 == 1 {
                p.flip();
            }
            p
        })
        .collect();
    let sewn = Mesh::from_polygons(scrambled).sew(1e-9).unwrap();
    assert!(rel_eq(sewn.signed_volume().abs(), solid.signed_volume(), 1e-9));
}

#[test]
fn open_shell_is_rejected() {
    let kernel = MeshKernel::new();
    let solid = gear::build(&GearSpec::involute(15, 1.0), &kernel).unwrap();
    let mut polygons = solid.polygons.clone();
    polygons.pop();
    let err = kernel.make_shell(vec![Mesh::from_polygons(polygons)]).unwrap_err();
    assert!(matches!(
        err,
        GearError::Construction(ConstructionError::NonManifold { .. })
    ));
}

#[test]
fn gap_between_curves_is_reported() {
    let kernel = MeshKernel::new();
    let a = kernel
        .line(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1.0, 0.0, 0.0))
        .unwrap();
    let b = kernel
        .line(&Point3::new(1.0, 0.5, 0.0), &Point3::new(0.0, 1.0, 0.0))
        .unwrap();
    let err = kernel.make_wire(&[a, b]).unwrap_err();
    assert!(matches!(
        err,
        GearError::Construction(ConstructionError::DisconnectedWire { index: 1, .. })
    ));
}

#[test]
fn micro_module_gears_scale_with_the_module() {
    let kernel = MeshKernel::new();
    let s: Real = 0.0005;
    let pairs = [
        (GearSpec::involute(15, 1.0), GearSpec::involute(15, s).with_height(5.0 * s)),
        (
            GearSpec::involute(15, 1.0).with_helix_angle_deg(15.0),
            GearSpec::involute(15, s)
                .with_helix_angle_deg(15.0)
                .with_height(5.0 * s),
        ),
        (GearSpec::cycloid(15, 1.0, 5.0), GearSpec::cycloid(15, s, 5.0 * s).with_height(5.0 * s)),
        (GearSpec::rack(10, 1.0, 3.0), GearSpec::rack(10, s, 3.0 * s).with_height(5.0 * s)),
        (GearSpec::bevel(15, 1.0, 45.0), GearSpec::bevel(15, s, 45.0).with_height(5.0 * s)),
    ];
    for (unit, micro) in pairs {
        let expected = kernel.volume(&gear::build(&unit, &kernel).unwrap()) * s * s * s;
        let solid = gear::build(&micro, &kernel)
            .unwrap_or_else(|e| panic!("{:?} failed: {e}", micro.family));
        let volume = kernel.volume(&solid);
        assert!(rel_eq(volume, expected, 1e-6), "{volume} vs {expected}");
    }
}

mod support;

use gearforge::{
    GearError, GearSpec, Kernel, MeshKernel, ToothGenerator, gear,
    float_types::TAU,
    profile,
    tooth::InvoluteTooth,
};
use support::{approx_eq, bounding_box, max_radius, radius_range, rel_eq};

#[test]
fn spur_gear_end_to_end() {
    let spec = GearSpec::involute(15, 1.0);
    let kernel = MeshKernel::new();
    let solid = gear::build(&spec, &kernel).unwrap();

    let [_, _, min_z, _, _, max_z] = bounding_box(&solid);
    assert!(approx_eq(min_z, 0.0, 1e-12));
    assert!(approx_eq(max_z, 5.0, 1e-12));
    let outer = 2.0 * max_radius(&solid);
    assert!(approx_eq(outer, 17.0, 0.05), "outer diameter {outer}");
    assert!(solid.is_manifold(1e-6));
    assert!(kernel.volume(&solid) > 0.0);
}

#[test]
fn outline_is_closed_with_one_connector_per_tooth() {
    let outline = gear::outline(&GearSpec::involute(15, 1.0)).unwrap();
    assert!(outline.is_closed());
    assert_eq!(outline.tooth_count(), 15);
    assert_eq!(outline.connector_count(), 15);
    // teeth are chained clockwise
    assert!(outline.signed_area() < 0.0);
}

#[test]
fn plain_root_spans_root_to_tip_circle() {
    let spec = GearSpec::involute(24, 2.0).with_undercut(false);
    let outline = gear::outline(&spec).unwrap();
    let (lo, hi) = radius_range(&outline);
    // df = m(z - 2.5), da = m(z + 2)
    assert!(approx_eq(lo, 0.5 * 2.0 * (24.0 - 2.5), 1e-9), "root {lo}");
    assert!(approx_eq(hi, 0.5 * 2.0 * (24.0 + 2.0), 1e-9), "tip {hi}");
}

#[test]
fn full_turn_brings_the_tooth_back() {
    let spec = GearSpec::involute(17, 1.5);
    let tooth = InvoluteTooth::new(&spec).unwrap();
    let curve = tooth.generate(8).unwrap();
    for turned in [curve.rotated(TAU), curve.rotated(17.0 * tooth.phipart())] {
        for (a, b) in curve.points().iter().zip(turned.points().iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }
}

#[test]
fn extruded_volume_is_area_times_height() {
    let spec = GearSpec::involute(15, 1.0).with_height(7.0);
    let kernel = MeshKernel::polyline();
    let area = gear::outline(&spec).unwrap().area();
    let volume = kernel.volume(&gear::build(&spec, &kernel).unwrap());
    assert!(rel_eq(volume, area * 7.0, 1e-9), "{volume} vs {}", area * 7.0);
}

#[test]
fn helical_sweep_converges() {
    let spec = GearSpec::involute(15, 1.0).with_helix_angle_deg(15.0);
    let volume = |sections: usize| {
        let kernel = MeshKernel::new().with_sweep_sections(sections);
        kernel.volume(&gear::build(&spec, &kernel).unwrap())
    };
    let (v8, v32, v64) = (volume(8), volume(32), volume(64));
    assert!((v32 - v64).abs() < 1e-3 * v64, "{v32} vs {v64}");
    assert!((v8 - v64).abs() < 1e-2 * v64, "{v8} vs {v64}");
}

#[test]
fn helical_gear_keeps_its_height_and_volume() {
    let spec = GearSpec::involute(20, 1.0)
        .with_helix_angle_deg(-20.0)
        .with_undercut(false);
    let kernel = MeshKernel::polyline().with_sweep_sections(32);
    let solid = gear::build(&spec, &kernel).unwrap();
    let [_, _, min_z, _, _, max_z] = bounding_box(&solid);
    assert!(approx_eq(max_z - min_z, 5.0, 1e-9));
    // twisting a prism does not change its volume
    let area = gear::outline(&spec).unwrap().area();
    assert!(rel_eq(kernel.volume(&solid), area * 5.0, 1e-3));
}

#[test]
fn collapsed_root_circle_is_invalid() {
    let spec = GearSpec::involute(3, 10.0).with_shift(-1.0);
    let err = gear::build(&spec, &MeshKernel::new()).unwrap_err();
    assert!(matches!(
        err,
        GearError::InvalidParameter {
            name: "root_radius",
            ..
        }
    ));
}

#[test]
fn pointed_teeth_are_invalid() {
    let spec = GearSpec::involute(3, 10.0).with_shift(1.0);
    let err = gear::build(&spec, &MeshKernel::new()).unwrap_err();
    assert!(err.is_invalid_parameter());
    assert!(!err.is_construction());
}

#[test]
fn assembled_teeth_are_rotated_copies() {
    let spec = GearSpec::involute(12, 1.0);
    let tooth = InvoluteTooth::new(&spec).unwrap();
    let curve = tooth.generate(6).unwrap();
    let outline = profile::assemble(&curve, 12).unwrap();
    let third = outline
        .segments()
        .iter()
        .filter_map(|s| match s {
            profile::ProfileSegment::Tooth(t) => Some(t),
            profile::ProfileSegment::Connector { .. } => None,
        })
        .nth(3)
        .unwrap();
    let expected = curve.rotated(-3.0 * tooth.phipart());
    for (a, b) in third.points().iter().zip(expected.points().iter()) {
        assert!((a - b).norm() < 1e-12);
    }
}

#[test]
fn flank_sampling_converges() {
    let spec = GearSpec::involute(15, 1.0);
    let sample = |n: usize| {
        let outline = gear::outline(&spec.clone().with_num_points(n)).unwrap();
        let (root, tip) = radius_range(&outline);
        (root, tip, outline.area())
    };
    let (root48, tip48, area48) = sample(48);
    for n in [6, 12, 24] {
        let (root, tip, _) = sample(n);
        // both ends of every flank are sampled exactly
        assert!(approx_eq(tip, tip48, 1e-9), "tip {tip} at {n} points");
        assert!(approx_eq(root, root48, 1e-9), "root {root} at {n} points");
    }
    assert!(approx_eq(tip48, 8.5, 1e-9));

    let (_, _, area12) = sample(12);
    let (_, _, area24) = sample(24);
    assert!(rel_eq(area12, area48, 1e-2), "{area12} vs {area48}");
    assert!(rel_eq(area24, area48, 1e-3), "{area24} vs {area48}");
}

#[test]
fn mirrored_helices_have_equal_volume() {
    let kernel = MeshKernel::new();
    let left = GearSpec::involute(20, 1.0)
        .with_helix_angle_deg(20.0)
        .with_undercut(false);
    let right = left.clone().with_helix_angle_deg(-20.0);
    let a = kernel.volume(&gear::build(&left, &kernel).unwrap());
    let b = kernel.volume(&gear::build(&right, &kernel).unwrap());
    assert!(rel_eq(a, b, 1e-9), "{a} vs {b}");
}

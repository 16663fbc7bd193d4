//! Polygon-mesh implementation of the [`Kernel`] contract.
//!
//! Curves are Catmull-Rom densified polylines, faces and solids are
//! [`Mesh`]es. Sweeps advance the profile through rigid stations read off the
//! auxiliary spine; shells are sewn by welding coincident vertices.

use super::Kernel;
use crate::errors::{ConstructionError, GearResult};
use crate::float_types::{Real, tolerance, tolerance_for};
use crate::mesh::{Mesh, diagonal, polygon::Polygon, polygon::build_orthonormal_basis};
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line};
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};
use tracing::{debug, trace};

/// A sampled curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point3<Real>>,
}

/// A closed loop of points; the first point is not repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub points: Vec<Point3<Real>>,
}

/// A prepared pipe shell: the profile and one rigid placement per station.
#[derive(Debug, Clone)]
pub struct PipeSweep {
    profile: Vec<Point3<Real>>,
    stations: Vec<Matrix4<Real>>,
    problem: Option<String>,
}

/// Reference kernel producing polygon meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshKernel {
    /// Polyline spans per interpolated span; 1 keeps the input points only.
    pub segments_per_span: usize,
    /// Stations per auxiliary spine segment in a pipe shell.
    pub sweep_sections: usize,
}

impl Default for MeshKernel {
    fn default() -> Self {
        MeshKernel {
            segments_per_span: 4,
            sweep_sections: 8,
        }
    }
}

impl MeshKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kernel that joins the given points with straight edges, so profile
    /// areas equal the area of the sampled polygon.
    pub fn polyline() -> Self {
        MeshKernel {
            segments_per_span: 1,
            ..Self::default()
        }
    }

    pub const fn with_segments_per_span(mut self, segments: usize) -> Self {
        self.segments_per_span = segments;
        self
    }

    pub const fn with_sweep_sections(mut self, sections: usize) -> Self {
        self.sweep_sections = sections;
        self
    }

    /// Uniform Catmull-Rom through `points`, hitting every input point.
    /// Fewer than three points stay a straight polyline.
    fn densify(&self, points: &[Point3<Real>]) -> Vec<Point3<Real>> {
        let n = points.len();
        let segments = self.segments_per_span.max(1);
        if segments == 1 || n < 3 {
            return points.to_vec();
        }
        let mut out = Vec::with_capacity((n - 1) * segments + 1);
        for i in 0..n - 1 {
            let p1 = points[i];
            let p2 = points[i + 1];
            let p0 = if i == 0 {
                p1 + (p1 - p2)
            } else {
                points[i - 1]
            };
            let p3 = if i + 2 < n {
                points[i + 2]
            } else {
                p2 + (p2 - p1)
            };
            out.push(p1);
            for k in 1..segments {
                let t = k as Real / segments as Real;
                out.push(catmull_rom(&p0, &p1, &p2, &p3, t));
            }
        }
        out.push(points[n - 1]);
        out
    }
}

fn catmull_rom(
    p0: &Point3<Real>,
    p1: &Point3<Real>,
    p2: &Point3<Real>,
    p3: &Point3<Real>,
    t: Real,
) -> Point3<Real> {
    let (a, b, c, d) = (p0.coords, p1.coords, p2.coords, p3.coords);
    let t2 = t * t;
    let t3 = t2 * t;
    Point3::from(
        (b * 2.0
            + (c - a) * t
            + (a * 2.0 - b * 5.0 + c * 4.0 - d) * t2
            + (b * 3.0 - a - c * 3.0 + d) * t3)
            * 0.5,
    )
}

fn check_finite(points: &[Point3<Real>]) -> Result<(), ConstructionError> {
    match points.iter().find(|p| !p.coords.iter().all(|c| c.is_finite())) {
        Some(p) => Err(ConstructionError::InvalidCoordinate(*p)),
        None => Ok(()),
    }
}

/// `points` without consecutive repeats, judged against the size of the curve.
fn dedup(points: &[Point3<Real>]) -> Vec<Point3<Real>> {
    let eps = tolerance_for(diagonal(points));
    let mut out: Vec<Point3<Real>> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|q| (p - q).norm() > eps) {
            out.push(*p);
        }
    }
    out
}

/// Largest distance of any point from the best-fit plane of the loop.
fn planarity(polygon: &Polygon) -> (Real, Point3<Real>) {
    let normal = polygon.normal();
    let centroid = polygon.centroid();
    polygon
        .vertices
        .iter()
        .map(|p| ((p - centroid).dot(&normal).abs(), *p))
        .fold((0.0, centroid), |acc, item| if item.0 > acc.0 { item } else { acc })
}

/// First crossing between two non-adjacent edges of the loop.
fn self_intersection(polygon: &Polygon) -> Option<Point3<Real>> {
    let n = polygon.vertices.len();
    let (u, v) = build_orthonormal_basis(polygon.normal());
    let origin = polygon.vertices[0];
    let flat: Vec<Coord<Real>> = polygon
        .vertices
        .iter()
        .map(|p| {
            let offset = p - origin;
            Coord {
                x: offset.dot(&u),
                y: offset.dot(&v),
            }
        })
        .collect();
    let edges: Vec<Line<Real>> = (0..n).map(|i| Line::new(flat[i], flat[(i + 1) % n])).collect();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let ka = edges[a].start.x.min(edges[a].end.x);
        let kb = edges[b].start.x.min(edges[b].end.x);
        ka.total_cmp(&kb)
    });

    for (pos, &i) in order.iter().enumerate() {
        let a = edges[i];
        let a_max_x = a.start.x.max(a.end.x);
        let (a_min_y, a_max_y) = (a.start.y.min(a.end.y), a.start.y.max(a.end.y));
        for &j in &order[pos + 1..] {
            let b = edges[j];
            if b.start.x.min(b.end.x) > a_max_x {
                break;
            }
            let adjacent = i.abs_diff(j) == 1 || i.abs_diff(j) == n - 1;
            if adjacent
                || b.start.y.max(b.end.y) < a_min_y
                || b.start.y.min(b.end.y) > a_max_y
            {
                continue;
            }
            let hit = match line_intersection(a, b) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => intersection,
                Some(LineIntersection::Collinear { intersection }) => intersection.start,
                None => continue,
            };
            return Some(origin + u * hit.x + v * hit.y);
        }
    }
    None
}

impl Kernel for MeshKernel {
    type Curve = Polyline;
    type Wire = Loop;
    type Face = Mesh;
    type Sweep = PipeSweep;
    type Shell = Mesh;
    type Solid = Mesh;

    fn interpolate(&self, points: &[Point3<Real>]) -> GearResult<Polyline> {
        check_finite(points)?;
        let distinct = dedup(points);
        if points.len() < 2 || distinct.len() < 2 {
            return Err(ConstructionError::TooFewPoints {
                min: 2,
                actual: distinct.len(),
            }
            .into());
        }
        Ok(Polyline {
            points: self.densify(&distinct),
        })
    }

    fn line(&self, start: &Point3<Real>, end: &Point3<Real>) -> GearResult<Polyline> {
        check_finite(&[*start, *end])?;
        Ok(Polyline {
            points: vec![*start, *end],
        })
    }

    fn make_wire(&self, curves: &[Polyline]) -> GearResult<Loop> {
        let all: Vec<Point3<Real>> = curves.iter().flat_map(|c| c.points.iter().copied()).collect();
        let eps = tolerance_for(diagonal(&all));
        let mut points: Vec<Point3<Real>> = Vec::new();
        for (index, curve) in curves.iter().enumerate() {
            if let (Some(end), Some(start)) = (points.last(), curve.points.first()) {
                let gap = (start - end).norm();
                if gap > eps {
                    return Err(ConstructionError::DisconnectedWire {
                        index,
                        gap,
                        at: *start,
                    }
                    .into());
                }
            }
            for p in &curve.points {
                if points.last().is_none_or(|q| (p - q).norm() > eps) {
                    points.push(*p);
                }
            }
        }
        let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) else {
            return Err(ConstructionError::TooFewPoints { min: 3, actual: 0 }.into());
        };
        if (last - first).norm() > eps {
            return Err(ConstructionError::WireNotClosed { first, last }.into());
        }
        points.pop();
        if points.len() < 3 {
            return Err(ConstructionError::TooFewPoints {
                min: 3,
                actual: points.len(),
            }
            .into());
        }
        trace!(points = points.len(), "closed wire");
        Ok(Loop { points })
    }

    fn make_face(&self, wire: &Loop) -> GearResult<Mesh> {
        let polygon = Polygon::new(wire.points.clone());
        let (deviation, at) = planarity(&polygon);
        let bb = Mesh::from_polygons(vec![polygon.clone()]).bounding_box();
        let extent = (bb.maxs - bb.mins).norm().max(1.0);
        if deviation > tolerance() * extent {
            return Err(ConstructionError::NonPlanar { deviation, at }.into());
        }
        if let Some(at) = self_intersection(&polygon) {
            return Err(ConstructionError::SelfIntersection(at).into());
        }
        Ok(Mesh::from_polygons(vec![polygon]))
    }

    fn fill_wire(&self, wire: &Loop) -> GearResult<Mesh> {
        let n = wire.points.len();
        let centroid = Polygon::new(wire.points.clone()).centroid();
        let fan = (0..n)
            .map(|i| Polygon::new(vec![centroid, wire.points[i], wire.points[(i + 1) % n]]))
            .collect();
        Ok(Mesh::from_polygons(fan))
    }

    fn transform_face(&self, face: &Mesh, matrix: &Matrix4<Real>) -> Mesh {
        face.transform(matrix)
    }

    fn extrude(&self, face: &Mesh, direction: &Vector3<Real>) -> GearResult<Mesh> {
        let mut polygons = Vec::new();
        for boundary in &face.polygons {
            let mut bottom = boundary.clone();
            let area = bottom.area_vector();
            let lift = area.dot(direction);
            // the direction must leave the face plane, whatever the part size
            if lift.abs() <= tolerance() * area.norm() * direction.norm() {
                return Err(ConstructionError::NonPositiveVolume(lift).into());
            }
            if lift < 0.0 {
                bottom.flip();
            }
            // `bottom` now winds counter-clockwise seen from the top
            let top: Vec<Point3<Real>> = bottom.vertices.iter().map(|p| p + direction).collect();
            let n = top.len();
            for i in 0..n {
                let j = (i + 1) % n;
                polygons.push(Polygon::new(vec![
                    bottom.vertices[i],
                    bottom.vertices[j],
                    top[j],
                    top[i],
                ]));
            }
            polygons.push(Polygon::new(top));
            bottom.flip();
            polygons.push(bottom);
        }
        debug!(polygons = polygons.len(), "extruded face");
        Ok(Mesh::from_polygons(polygons))
    }

    fn pipe_shell(
        &self,
        spine: &[Point3<Real>],
        auxiliary_spine: &[Point3<Real>],
        profile: &Loop,
    ) -> PipeSweep {
        match sweep_stations(spine, auxiliary_spine, self.sweep_sections.max(1)) {
            Ok(stations) if profile.points.len() >= 3 => PipeSweep {
                profile: profile.points.clone(),
                stations,
                problem: None,
            },
            Ok(_) => PipeSweep {
                profile: Vec::new(),
                stations: Vec::new(),
                problem: Some("profile wire has fewer than three points".to_string()),
            },
            Err(problem) => PipeSweep {
                profile: Vec::new(),
                stations: Vec::new(),
                problem: Some(problem),
            },
        }
    }

    fn sweep_is_ready(&self, sweep: &PipeSweep) -> bool {
        sweep.problem.is_none()
    }

    fn build_sweep(&self, sweep: PipeSweep) -> GearResult<Vec<Mesh>> {
        if let Some(problem) = sweep.problem {
            return Err(ConstructionError::SweepNotReady(problem).into());
        }
        let rows: Vec<Vec<Point3<Real>>> = sweep
            .stations
            .iter()
            .map(|m| sweep.profile.iter().map(|p| m.transform_point(p)).collect())
            .collect();
        let n = sweep.profile.len();
        let faces = (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                let band = rows
                    .windows(2)
                    .flat_map(|w| split_quad([w[0][i], w[0][j], w[1][j], w[1][i]]))
                    .collect();
                Mesh::from_polygons(band)
            })
            .collect();
        debug!(stations = rows.len(), edges = n, "swept profile");
        Ok(faces)
    }

    fn loft(&self, rows: &[Vec<Point3<Real>>]) -> GearResult<Mesh> {
        let Some(first) = rows.first() else {
            return Err(ConstructionError::TooFewPoints { min: 2, actual: 0 }.into());
        };
        if rows.len() < 2 {
            return Err(ConstructionError::TooFewPoints {
                min: 2,
                actual: rows.len(),
            }
            .into());
        }
        for (row, points) in rows.iter().enumerate() {
            if points.len() != first.len() {
                return Err(ConstructionError::MismatchedRows {
                    row,
                    expected: first.len(),
                    actual: points.len(),
                }
                .into());
            }
            check_finite(points)?;
        }

        // drop columns that repeat in the first row, the same way
        // `interpolate` drops repeated points
        let all: Vec<Point3<Real>> = rows.iter().flatten().copied().collect();
        let eps = tolerance_for(diagonal(&all));
        let keep: Vec<bool> = first
            .iter()
            .enumerate()
            .map(|(i, p)| i == 0 || (p - first[i - 1]).norm() > eps)
            .collect();
        let grid: Vec<Vec<Point3<Real>>> = rows
            .iter()
            .map(|row| {
                let kept: Vec<Point3<Real>> = row
                    .iter()
                    .zip(&keep)
                    .filter_map(|(p, &k)| k.then_some(*p))
                    .collect();
                self.densify(&kept)
            })
            .collect();
        if grid[0].len() < 2 {
            return Err(ConstructionError::TooFewPoints {
                min: 2,
                actual: grid[0].len(),
            }
            .into());
        }

        let mut polygons = Vec::new();
        for w in grid.windows(2) {
            for i in 0..w[0].len() - 1 {
                polygons.push(Polygon::new(vec![
                    w[0][i],
                    w[0][i + 1],
                    w[1][i + 1],
                    w[1][i],
                ]));
            }
        }
        Ok(Mesh::from_polygons(polygons))
    }

    fn make_shell(&self, faces: Vec<Mesh>) -> GearResult<Mesh> {
        let polygons: Vec<Polygon> = faces.into_iter().flat_map(|f| f.polygons).collect();
        let mesh = Mesh::from_polygons(polygons);
        let shell = mesh.sew(tolerance_for(mesh.thinnest_side()))?;
        debug!(polygons = shell.polygons.len(), "sewed shell");
        Ok(shell)
    }

    fn make_solid(&self, shell: Mesh) -> GearResult<Mesh> {
        if shell.polygons.len() < 4 {
            return Err(ConstructionError::TooFewPoints {
                min: 4,
                actual: shell.polygons.len(),
            }
            .into());
        }
        Ok(shell)
    }

    fn volume(&self, solid: &Mesh) -> Real {
        solid.signed_volume()
    }

    fn reverse(&self, solid: Mesh) -> Mesh {
        solid.inverse()
    }
}

/// Four triangles around the centre of a possibly twisted quad. Cutting both
/// diagonals alike keeps the enclosed volume independent of the twist
/// direction.
fn split_quad(quad: [Point3<Real>; 4]) -> impl Iterator<Item = Polygon> {
    let centre = Point3::from(quad.iter().map(|p| p.coords).sum::<Vector3<Real>>() / 4.0);
    (0..4).map(move |k| Polygon::new(vec![quad[k], quad[(k + 1) % 4], centre]))
}

/// Rigid placements of the profile along a straight spine, with the twist
/// read off the auxiliary spine. Each auxiliary segment is split into
/// `sections` stations.
fn sweep_stations(
    spine: &[Point3<Real>],
    auxiliary_spine: &[Point3<Real>],
    sections: usize,
) -> Result<Vec<Matrix4<Real>>, String> {
    let guides: Vec<Point3<Real>> = spine.iter().chain(auxiliary_spine).copied().collect();
    let eps = tolerance_for(diagonal(&guides));
    let (Some(origin), Some(end)) = (spine.first().copied(), spine.last().copied()) else {
        return Err("spine needs at least two points".to_string());
    };
    let length = (end - origin).norm();
    if spine.len() < 2 || length <= eps {
        return Err("spine has zero length".to_string());
    }
    let axis = Unit::new_normalize(end - origin);
    let dir = axis.into_inner();
    if let Some(p) = spine
        .iter()
        .find(|p| (*p - origin).cross(&dir).norm() > eps * length.max(1.0))
    {
        return Err(format!("spine is not straight at {p}"));
    }
    if auxiliary_spine.len() < 2 {
        return Err("auxiliary spine needs at least two points".to_string());
    }

    // axial position and radial direction of every guide point
    let mut guide = Vec::with_capacity(auxiliary_spine.len());
    for p in auxiliary_spine {
        let offset = p - origin;
        let axial = offset.dot(&dir);
        let radial = offset - dir * axial;
        if radial.norm() <= eps {
            return Err(format!("auxiliary spine touches the spine axis at {p}"));
        }
        guide.push((axial, radial));
    }

    let mut angles = vec![0.0];
    for (k, w) in guide.windows(2).enumerate() {
        if w[1].0 <= w[0].0 {
            return Err(format!("auxiliary spine does not advance at point {}", k + 1));
        }
        let turn = w[0].1.cross(&w[1].1).dot(&dir).atan2(w[0].1.dot(&w[1].1));
        angles.push(angles[k] + turn);
    }

    let start = guide[0].0;
    let place = |angle: Real, axial: Real| {
        let rotation = Rotation3::from_axis_angle(&axis, angle).to_homogeneous();
        Matrix4::new_translation(&(origin.coords + dir * (axial - start)))
            * rotation
            * Matrix4::new_translation(&-origin.coords)
    };
    let mut stations = Vec::with_capacity((guide.len() - 1) * sections + 1);
    for k in 0..guide.len() - 1 {
        for s in 0..sections {
            let t = s as Real / sections as Real;
            stations.push(place(
                angles[k] + t * (angles[k + 1] - angles[k]),
                guide[k].0 + t * (guide[k + 1].0 - guide[k].0),
            ));
        }
    }
    let last = guide.len() - 1;
    stations.push(place(angles[last], guide[last].0));
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_wire(kernel: &MeshKernel) -> Loop {
        let c = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let edges: Vec<Polyline> = (0..4)
            .map(|i| kernel.line(&c[i], &c[(i + 1) % 4]).unwrap())
            .collect();
        kernel.make_wire(&edges).unwrap()
    }

    #[test]
    fn densify_passes_through_inputs() {
        let kernel = MeshKernel::new();
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let curve = kernel.interpolate(&points).unwrap();
        assert_eq!(curve.points.len(), 9);
        assert_eq!(curve.points[0], points[0]);
        assert_eq!(curve.points[4], points[1]);
        assert_eq!(curve.points[8], points[2]);
    }

    #[test]
    fn disconnected_curves_are_rejected() {
        let kernel = MeshKernel::new();
        let a = kernel
            .line(&Point3::origin(), &Point3::new(1.0, 0.0, 0.0))
            .unwrap();
        let b = kernel
            .line(&Point3::new(1.5, 0.0, 0.0), &Point3::new(0.0, 1.0, 0.0))
            .unwrap();
        let err = kernel.make_wire(&[a, b]).unwrap_err();
        assert!(matches!(
            err,
            crate::errors::GearError::Construction(ConstructionError::DisconnectedWire {
                index: 1,
                ..
            })
        ));
    }

    #[test]
    fn extruded_square_is_a_unit_cube() {
        let kernel = MeshKernel::new();
        let face = kernel.make_face(&square_wire(&kernel)).unwrap();
        let solid = kernel.extrude(&face, &Vector3::z()).unwrap();
        assert!((kernel.volume(&solid) - 1.0).abs() < 1e-12);
        assert!(solid.is_manifold(1e-9));
    }

    #[test]
    fn bow_tie_is_not_a_face() {
        let kernel = MeshKernel::new();
        let wire = Loop {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        };
        assert!(kernel.make_face(&wire).is_err());
    }

    #[test]
    fn bent_spine_is_not_ready() {
        let kernel = MeshKernel::new();
        let wire = square_wire(&kernel);
        let spine = [
            Point3::origin(),
            Point3::new(0.5, 0.0, 1.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let guide = [Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 2.0)];
        let sweep = kernel.pipe_shell(&spine, &guide, &wire);
        assert!(!kernel.sweep_is_ready(&sweep));
        assert!(kernel.build_sweep(sweep).is_err());
    }

    fn twisted_square_volume(turn: Real, sections: usize) -> Real {
        let kernel = MeshKernel::new().with_sweep_sections(sections);
        let wire = square_wire(&kernel);
        let face = kernel.make_face(&wire).unwrap();
        let spine = [Point3::origin(), Point3::new(0.0, 0.0, 1.0)];
        let guide = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(turn.cos(), turn.sin(), 1.0),
        ];
        let sweep = kernel.pipe_shell(&spine, &guide, &wire);
        let mut faces = kernel.build_sweep(sweep).unwrap();
        let lid = Matrix4::new_translation(&Vector3::<Real>::z())
            * Rotation3::from_axis_angle(&Vector3::z_axis(), turn).to_homogeneous();
        faces.push(kernel.transform_face(&face, &lid));
        faces.push(face);
        let shell = kernel.make_shell(faces).unwrap();
        let solid = kernel.make_solid(shell).unwrap();
        kernel.volume(&solid).abs()
    }

    #[test]
    fn twisted_square_keeps_its_volume() {
        let volume = twisted_square_volume(0.5, 32);
        assert!((volume - 1.0).abs() < 1e-3, "volume {volume}");
        // error shrinks with the square of the section length
        let coarse = (twisted_square_volume(0.5, 8) - 1.0).abs();
        let fine = (twisted_square_volume(0.5, 16) - 1.0).abs();
        assert!(fine < 0.5 * coarse, "{fine} vs {coarse}");
    }

    #[test]
    fn twist_direction_does_not_change_the_volume() {
        let left = twisted_square_volume(0.5, 4);
        let right = twisted_square_volume(-0.5, 4);
        assert!((left - right).abs() < 1e-12, "{left} vs {right}");
    }

    #[test]
    fn tiny_extrusion_is_still_a_solid() {
        let kernel = MeshKernel::new();
        let s = 1e-4;
        let c = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(s, 0.0, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(0.0, s, 0.0),
        ];
        let edges: Vec<Polyline> = (0..4)
            .map(|i| kernel.line(&c[i], &c[(i + 1) % 4]).unwrap())
            .collect();
        let face = kernel.make_face(&kernel.make_wire(&edges).unwrap()).unwrap();
        let solid = kernel.extrude(&face, &Vector3::new(0.0, 0.0, s)).unwrap();
        assert!((kernel.volume(&solid) - s * s * s).abs() < 1e-24);
    }
}

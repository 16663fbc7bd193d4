//! `Mesh`: the polygon soup behind [`MeshKernel`](crate::kernel::MeshKernel)
//! faces, shells and solids.

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use nalgebra::{Matrix4, Point3, partial_max, partial_min};
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod manifold;
pub mod polygon;

use polygon::Polygon;

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Boundary polygons, wound counter-clockwise seen from outside.
    pub polygons: Vec<Polygon>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,
}

impl Mesh {
    pub fn new() -> Self {
        Mesh::default()
    }

    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Mesh {
            polygons,
            bounding_box: OnceLock::new(),
        }
    }

    /// Volume enclosed by the surface, by the divergence theorem. Positive
    /// when the polygons face outwards.
    pub fn signed_volume(&self) -> Real {
        #[cfg(feature = "parallel")]
        {
            self.polygons.par_iter().map(Polygon::signed_volume).sum()
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.polygons.iter().map(Polygon::signed_volume).sum()
        }
    }

    /// Invert this Mesh (flip inside vs. outside)
    pub fn inverse(&self) -> Mesh {
        let mut mesh = self.clone();
        for p in &mut mesh.polygons {
            p.flip();
        }
        mesh
    }

    pub fn transform(&self, matrix: &Matrix4<Real>) -> Mesh {
        Mesh::from_polygons(self.polygons.iter().map(|p| p.transformed(matrix)).collect())
    }

    /// Returns an [`Aabb`] containing every vertex, cached after the first call.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in self.polygons.iter().flat_map(|p| &p.vertices) {
                for k in 0..3 {
                    mins[k] = *partial_min(&mins[k], &v[k]).unwrap_or(&mins[k]);
                    maxs[k] = *partial_max(&maxs[k], &v[k]).unwrap_or(&maxs[k]);
                }
            }

            // no polygons: a trivial AABB at the origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Smallest non-zero side of the bounding box, or 0 for an empty or
    /// point-like mesh.
    pub fn thinnest_side(&self) -> Real {
        let bb = self.bounding_box();
        (bb.maxs - bb.mins)
            .iter()
            .copied()
            .filter(|side| *side > 0.0)
            .reduce(Real::min)
            .unwrap_or(0.0)
    }
}

/// Length of the bounding-box diagonal of `points`, 0 when empty.
pub fn diagonal(points: &[Point3<Real>]) -> Real {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let (mins, maxs) = points.iter().fold((*first, *first), |(lo, hi), p| {
        (lo.inf(p), hi.sup(p))
    });
    (maxs - mins).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn unit_cube() -> Mesh {
        let c = |x: Real, y: Real, z: Real| Point3::new(x, y, z);
        let quads = [
            [c(0., 0., 0.), c(0., 1., 0.), c(1., 1., 0.), c(1., 0., 0.)],
            [c(0., 0., 1.), c(1., 0., 1.), c(1., 1., 1.), c(0., 1., 1.)],
            [c(0., 0., 0.), c(1., 0., 0.), c(1., 0., 1.), c(0., 0., 1.)],
            [c(1., 0., 0.), c(1., 1., 0.), c(1., 1., 1.), c(1., 0., 1.)],
            [c(1., 1., 0.), c(0., 1., 0.), c(0., 1., 1.), c(1., 1., 1.)],
            [c(0., 1., 0.), c(0., 0., 0.), c(0., 0., 1.), c(0., 1., 1.)],
        ];
        Mesh::from_polygons(quads.iter().map(|q| Polygon::new(q.to_vec())).collect())
    }

    #[test]
    fn cube_volume_and_inverse() {
        let cube = unit_cube();
        assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
        assert!((cube.inverse().signed_volume() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn thinnest_side_skips_flat_axes() {
        let cube = unit_cube();
        assert_eq!(cube.thinnest_side(), 1.0);
        let slab = cube.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(3.0, 0.01, 2.0)));
        assert!((slab.thinnest_side() - 0.01).abs() < 1e-15);
        let flat = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.5, 0.0)];
        assert!((diagonal(&flat) - (4.25 as Real).sqrt()).abs() < 1e-12);
        assert_eq!(diagonal(&[]), 0.0);
    }

    #[test]
    fn bounding_box_spans_vertices() {
        let bb = unit_cube().bounding_box();
        assert_eq!(bb.mins, Point3::origin());
        assert_eq!(bb.maxs, Point3::new(1.0, 1.0, 1.0));
    }
}

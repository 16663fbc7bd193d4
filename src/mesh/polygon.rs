use crate::float_types::Real;
use nalgebra::{Matrix4, Point3, Vector3};

/// A planar or slightly twisted polygon, defined by its boundary in order.
/// The winding follows the right-hand rule around the outward normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point3<Real>>,
}

impl Polygon {
    pub const fn new(vertices: Vec<Point3<Real>>) -> Self {
        Polygon { vertices }
    }

    /// Reverses winding order, which flips the normal.
    pub fn flip(&mut self) {
        self.vertices.reverse();
    }

    /// Return an iterator over paired vertices each forming an edge of the polygon
    pub fn edges(&self) -> impl Iterator<Item = (&Point3<Real>, &Point3<Real>)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
    }

    /// Newell's area vector: normal direction, with length equal to the
    /// enclosed area for planar polygons.
    pub fn area_vector(&self) -> Vector3<Real> {
        let mut normal = Vector3::zeros();
        for (current, next) in self.edges() {
            normal.x += (current.y - next.y) * (current.z + next.z);
            normal.y += (current.z - next.z) * (current.x + next.x);
            normal.z += (current.x - next.x) * (current.y + next.y);
        }
        normal * 0.5
    }

    pub fn normal(&self) -> Vector3<Real> {
        let n = self.area_vector();
        let len = n.norm();
        if len > 0.0 { n / len } else { Vector3::z() }
    }

    pub fn centroid(&self) -> Point3<Real> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len().max(1) as Real)
    }

    /// This polygon's share of the enclosed volume, by the divergence
    /// theorem over a fan from the first vertex.
    pub fn signed_volume(&self) -> Real {
        let Some(origin) = self.vertices.first() else {
            return 0.0;
        };
        self.vertices
            .windows(2)
            .skip(1)
            .map(|w| origin.coords.dot(&w[0].coords.cross(&w[1].coords)))
            .sum::<Real>()
            / 6.0
    }

    pub fn transformed(&self, matrix: &Matrix4<Real>) -> Polygon {
        Polygon::new(
            self.vertices
                .iter()
                .map(|p| matrix.transform_point(p))
                .collect(),
        )
    }
}

/// Two unit vectors spanning the plane orthogonal to `n`.
pub fn build_orthonormal_basis(n: Vector3<Real>) -> (Vector3<Real>, Vector3<Real>) {
    let n = n.normalize();

    // cross with the axis least aligned with `n`
    let other = if n.x.abs() < n.y.abs() && n.x.abs() < n.z.abs() {
        Vector3::x()
    } else if n.y.abs() < n.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let v = n.cross(&other).normalize();
    let u = v.cross(&n).normalize();
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn area_vector_follows_winding() {
        let mut p = square();
        assert!((p.area_vector() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        p.flip();
        assert!((p.normal() + Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn basis_is_orthonormal_to_the_normal() {
        for n in [Vector3::x(), Vector3::new(1.0, 2.0, -3.0), -Vector3::z()] {
            let (u, v) = build_orthonormal_basis(n);
            let n = n.normalize();
            assert!(u.dot(&v).abs() < 1e-12);
            assert!(u.dot(&n).abs() < 1e-12 && v.dot(&n).abs() < 1e-12);
            assert!((u.norm() - 1.0).abs() < 1e-12 && (v.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn fan_volume_of_a_lifted_square() {
        // flux through z = 2: area times height over three
        let lid = square().transformed(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0)));
        assert!((lid.signed_volume() - 2.0 / 3.0).abs() < 1e-12);
    }
}

//! Vertex welding, edge analysis and orientation propagation.

use crate::errors::ConstructionError;
use crate::float_types::Real;
use crate::mesh::Mesh;
use hashbrown::HashMap;
use nalgebra::Point3;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct QuantizedPoint(i64, i64, i64);

fn quantize_point(p: &Point3<Real>, cell: Real) -> QuantizedPoint {
    QuantizedPoint(
        (p.x / cell).round() as i64,
        (p.y / cell).round() as i64,
        (p.z / cell).round() as i64,
    )
}

/// An already welded vertex within `cell` of `p`, searched in the
/// neighbouring grid cells too so that points straddling a cell boundary
/// still merge.
fn find_nearby(
    grid: &HashMap<QuantizedPoint, Vec<usize>>,
    welded: &[Point3<Real>],
    p: &Point3<Real>,
    cell: Real,
) -> Option<usize> {
    let QuantizedPoint(x, y, z) = quantize_point(p, cell);
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                let Some(ids) = grid.get(&QuantizedPoint(x + dx, y + dy, z + dz)) else {
                    continue;
                };
                if let Some(&id) = ids.iter().find(|&&id| (welded[id] - p).norm() <= cell) {
                    return Some(id);
                }
            }
        }
    }
    None
}

/// Polygons as loops of welded vertex indices.
#[derive(Debug, Clone)]
pub struct Welded {
    pub loops: Vec<Vec<usize>>,
    /// For every loop, the polygon it came from.
    pub source: Vec<usize>,
}

/// An undirected edge seen by one loop, traversed `a -> b`.
#[derive(Debug, Clone, Copy)]
struct EdgeUse {
    polygon: usize,
    forward: bool,
}

type EdgeKey = (usize, usize);

impl Welded {
    fn edge_uses(&self) -> HashMap<EdgeKey, Vec<EdgeUse>> {
        let mut edges: HashMap<EdgeKey, Vec<EdgeUse>> = HashMap::new();
        for (polygon, ids) in self.loops.iter().enumerate() {
            for (k, &a) in ids.iter().enumerate() {
                let b = ids[(k + 1) % ids.len()];
                edges
                    .entry((a.min(b), a.max(b)))
                    .or_default()
                    .push(EdgeUse {
                        polygon,
                        forward: a < b,
                    });
            }
        }
        edges
    }
}

impl Mesh {
    /// Merge vertices closer than `cell` and express every polygon as a
    /// loop of vertex indices. Repeated consecutive vertices are dropped,
    /// and loops left with fewer than three vertices vanish.
    pub fn weld(&self, cell: Real) -> Welded {
        let mut grid: HashMap<QuantizedPoint, Vec<usize>> = HashMap::new();
        let mut welded: Vec<Point3<Real>> = Vec::new();
        let mut loops = Vec::with_capacity(self.polygons.len());
        let mut source = Vec::with_capacity(self.polygons.len());
        for (i, poly) in self.polygons.iter().enumerate() {
            let mut ids: Vec<usize> = Vec::with_capacity(poly.vertices.len());
            for p in &poly.vertices {
                let id = match find_nearby(&grid, &welded, p, cell) {
                    Some(id) => id,
                    None => {
                        welded.push(*p);
                        let id = welded.len() - 1;
                        grid.entry(quantize_point(p, cell)).or_default().push(id);
                        id
                    },
                };
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
            while ids.len() > 1 && ids.first() == ids.last() {
                ids.pop();
            }
            if ids.len() >= 3 {
                loops.push(ids);
                source.push(i);
            }
        }
        Welded { loops, source }
    }

    /// Checks that every welded edge is shared by exactly two polygons.
    pub fn check_manifold(&self, cell: Real) -> Result<(), ConstructionError> {
        let edges = self.weld(cell).edge_uses();
        let boundary_edges = edges.values().filter(|uses| uses.len() < 2).count();
        let overshared_edges = edges.values().filter(|uses| uses.len() > 2).count();
        if boundary_edges == 0 && overshared_edges == 0 {
            Ok(())
        } else {
            Err(ConstructionError::NonManifold {
                boundary_edges,
                overshared_edges,
            })
        }
    }

    pub fn is_manifold(&self, cell: Real) -> bool {
        self.check_manifold(cell).is_ok()
    }

    /// Sew the polygons into a closed, consistently oriented surface.
    ///
    /// Degenerate polygons are dropped. Within each connected component the
    /// first polygon keeps its winding and its neighbours are flipped to
    /// agree with it, so two adjacent polygons always traverse their shared
    /// edge in opposite directions. Whether the result faces outwards is
    /// decided by the caller from the sign of the volume.
    pub fn sew(&self, cell: Real) -> Result<Mesh, ConstructionError> {
        let welded = self.weld(cell);
        let edges = welded.edge_uses();
        let boundary_edges = edges.values().filter(|uses| uses.len() < 2).count();
        let overshared_edges = edges.values().filter(|uses| uses.len() > 2).count();
        if boundary_edges > 0 || overshared_edges > 0 {
            return Err(ConstructionError::NonManifold {
                boundary_edges,
                overshared_edges,
            });
        }

        let mut neighbours: Vec<Vec<(usize, bool)>> = vec![Vec::new(); welded.loops.len()];
        for uses in edges.values() {
            let (a, b) = (uses[0], uses[1]);
            // same traversal direction means one of the two must flip
            let agree = a.forward != b.forward;
            neighbours[a.polygon].push((b.polygon, agree));
            neighbours[b.polygon].push((a.polygon, agree));
        }

        let mut flipped: Vec<Option<bool>> = vec![None; welded.loops.len()];
        let mut queue = VecDeque::new();
        for seed in 0..welded.loops.len() {
            if flipped[seed].is_some() {
                continue;
            }
            flipped[seed] = Some(false);
            queue.push_back(seed);
            while let Some(p) = queue.pop_front() {
                let flip_p = flipped[p].unwrap_or(false);
                for &(q, agree) in &neighbours[p] {
                    let wanted = if agree { flip_p } else { !flip_p };
                    match flipped[q] {
                        None => {
                            flipped[q] = Some(wanted);
                            queue.push_back(q);
                        },
                        Some(f) if f != wanted => {
                            return Err(ConstructionError::NonOrientable(
                                self.polygons[welded.source[q]].centroid(),
                            ));
                        },
                        Some(_) => {},
                    }
                }
            }
        }

        let polygons = welded
            .source
            .iter()
            .zip(flipped)
            .map(|(&i, flip)| {
                let mut poly = self.polygons[i].clone();
                if flip == Some(true) {
                    poly.flip();
                }
                poly
            })
            .collect();
        Ok(Mesh::from_polygons(polygons))
    }
}

//! Full closed gear outline assembled from one tooth.

use crate::errors::{ConstructionError, GearError, GearResult};
use crate::float_types::{Real, TAU, tolerance_for};
use crate::gear_spec::MIN_TEETH;
use crate::mesh::diagonal;
use crate::tooth::ToothCurve;
use geo::{Area, Coord, LineString, Polygon as GeoPolygon};
use nalgebra::Point3;
use tracing::debug;

/// One piece of an assembled profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileSegment {
    /// A rotated copy of the generated tooth.
    Tooth(ToothCurve),
    /// Straight line bridging two consecutive pieces.
    Connector {
        start: Point3<Real>,
        end: Point3<Real>,
    },
}

impl ProfileSegment {
    pub fn start(&self) -> Option<Point3<Real>> {
        match self {
            ProfileSegment::Tooth(curve) => curve.start(),
            ProfileSegment::Connector { start, .. } => Some(*start),
        }
    }

    pub fn end(&self) -> Option<Point3<Real>> {
        match self {
            ProfileSegment::Tooth(curve) => curve.end(),
            ProfileSegment::Connector { end, .. } => Some(*end),
        }
    }

    /// Number of sampled points, joints counted once.
    pub fn points_len(&self) -> usize {
        match self {
            ProfileSegment::Tooth(curve) => curve.points().len(),
            ProfileSegment::Connector { .. } => 2,
        }
    }

    pub const fn is_tooth(&self) -> bool {
        matches!(self, ProfileSegment::Tooth(_))
    }
}

/// Ordered, closed sequence of teeth and connectors.
///
/// The end of each segment is the start of the next, and the end of the last
/// segment is the start of the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    segments: Vec<ProfileSegment>,
}

/// Replicate `curve` `teeth` times around the Z axis and chain the copies.
///
/// Copy `i` is rotated by `-i * 2π / teeth`. A connector joins the end of
/// each copy to the start of the next, and a final connector closes the
/// loop back to the first tooth. The result holds `teeth` teeth and `teeth`
/// connectors.
pub fn assemble(curve: &ToothCurve, teeth: usize) -> GearResult<Profile> {
    if teeth < MIN_TEETH {
        return Err(GearError::invalid(
            "teeth",
            teeth as Real,
            format!("need at least {MIN_TEETH} teeth"),
        ));
    }
    let (Some(_), Some(_)) = (curve.start(), curve.end()) else {
        return Err(ConstructionError::TooFewPoints { min: 2, actual: 0 }.into());
    };
    let phipart = TAU / teeth as Real;
    let mut segments = Vec::with_capacity(2 * teeth);
    for i in 0..teeth {
        let tooth = curve.rotated(-(i as Real) * phipart);
        if let (Some(end), Some(start)) = (
            segments.last().and_then(ProfileSegment::end),
            tooth.start(),
        ) {
            segments.push(ProfileSegment::Connector { start: end, end: start });
        }
        segments.push(ProfileSegment::Tooth(tooth));
    }
    let mut profile = Profile { segments };
    profile.close();
    debug!(
        teeth,
        segments = profile.segments.len(),
        "assembled gear profile"
    );
    Ok(profile)
}

impl Profile {
    /// Closed polygon through `points`, one connector per edge.
    pub fn polygon(points: &[Point3<Real>]) -> GearResult<Profile> {
        if points.len() < 3 {
            return Err(ConstructionError::TooFewPoints {
                min: 3,
                actual: points.len(),
            }
            .into());
        }
        let segments = points
            .windows(2)
            .map(|w| ProfileSegment::Connector {
                start: w[0],
                end: w[1],
            })
            .collect();
        let mut profile = Profile { segments };
        profile.close();
        Ok(profile)
    }

    fn close(&mut self) {
        let first = self.segments.first().and_then(ProfileSegment::start);
        let last = self.segments.last().and_then(ProfileSegment::end);
        if let (Some(start), Some(end)) = (first, last) {
            self.segments.push(ProfileSegment::Connector { start: end, end: start });
        }
    }

    pub fn segments(&self) -> &[ProfileSegment] {
        &self.segments
    }

    pub fn tooth_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_tooth()).count()
    }

    pub fn connector_count(&self) -> usize {
        self.segments.len() - self.tooth_count()
    }

    /// Coincidence tolerance scaled to the size of the outline.
    fn tolerance(&self) -> Real {
        let all: Vec<Point3<Real>> = self
            .segments
            .iter()
            .flat_map(|segment| match segment {
                ProfileSegment::Tooth(curve) => curve.points(),
                ProfileSegment::Connector { start, end } => vec![*start, *end],
            })
            .collect();
        tolerance_for(diagonal(&all))
    }

    /// True when every segment starts where the previous one ended.
    pub fn is_closed(&self) -> bool {
        let eps = self.tolerance();
        let n = self.segments.len();
        n > 0
            && (0..n).all(|i| {
                match (self.segments[i].end(), self.segments[(i + 1) % n].start()) {
                    (Some(end), Some(start)) => (end - start).norm() <= eps,
                    _ => false,
                }
            })
    }

    /// Boundary points in traversal order, without repeating joints or the
    /// closing point.
    pub fn points(&self) -> Vec<Point3<Real>> {
        let eps = self.tolerance();
        let mut out: Vec<Point3<Real>> = Vec::new();
        for segment in &self.segments {
            let points = match segment {
                ProfileSegment::Tooth(curve) => curve.points(),
                ProfileSegment::Connector { start, end } => vec![*start, *end],
            };
            for p in points {
                if out.last().is_none_or(|q| (p - q).norm() > eps) {
                    out.push(p);
                }
            }
        }
        if out.len() > 1 && out.first().zip(out.last()).is_some_and(|(a, b)| (a - b).norm() <= eps)
        {
            out.pop();
        }
        out
    }

    /// The outline as a planar `geo` polygon (Z dropped).
    pub fn to_geo(&self) -> GeoPolygon<Real> {
        let coords: Vec<Coord<Real>> = self
            .points()
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect();
        GeoPolygon::new(LineString::new(coords), Vec::new())
    }

    /// Signed area of the polygon through the sampled points; negative for
    /// the clockwise outlines produced by [`assemble`].
    pub fn signed_area(&self) -> Real {
        self.to_geo().signed_area()
    }

    pub fn area(&self) -> Real {
        self.to_geo().unsigned_area()
    }
}

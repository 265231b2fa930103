//! Closed-ring polygons on the integer grid.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::contains::{Containment, Contains};
use crate::error::{GeometryError, GeometryResult};
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::Segment;
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// A polygon: a single closed ring of integer-coordinate vertices.
///
/// The ring is stored explicitly closed (the first point is repeated as the
/// last) and is assumed to wind counter-clockwise, which the clipping
/// algorithm relies on. Holes are not supported.
///
/// The bounding box is cached and recomputed whenever the coordinates are
/// translated or transformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<Point>,
    bbox: Rect,
}

impl Polygon {
    /// Creates a polygon from a closed ring of vertices.
    ///
    /// The ring must contain at least 3 distinct vertices and must close on
    /// itself (first point equal to last).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let tri = Polygon::new(vec![
    ///     Point::new(0, 0),
    ///     Point::new(4, 0),
    ///     Point::new(0, 4),
    ///     Point::new(0, 0),
    /// ])
    /// .unwrap();
    /// assert_eq!(tri.vertex_count(), 3);
    /// ```
    ///
    /// A ring that does not close is rejected:
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let result = Polygon::new(vec![Point::new(0, 0), Point::new(4, 0), Point::new(0, 4)]);
    /// assert!(result.is_err());
    /// ```
    pub fn new(points: Vec<Point>) -> GeometryResult<Self> {
        if points.len() < 4 {
            return Err(GeometryError::MalformedPolygon {
                reason: "a closed ring needs at least 3 distinct vertices",
                vertices: points.len(),
            });
        }
        if points.first() != points.last() {
            return Err(GeometryError::MalformedPolygon {
                reason: "ring is not closed",
                vertices: points.len(),
            });
        }
        let bbox = ring_bbox(&points);
        Ok(Self { points, bbox })
    }

    /// Creates the counter-clockwise rectangular polygon covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        let ll = rect.lower_left();
        let ur = rect.upper_right();
        let lr = Point::new(ur.x, ll.y);
        let ul = Point::new(ll.x, ur.y);
        Self {
            points: vec![ll, lr, ur, ul, ll],
            bbox: rect,
        }
    }

    /// The closed ring of points, first point repeated as last.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The distinct vertices of the ring (closure point omitted).
    pub fn vertices(&self) -> &[Point] {
        &self.points[..self.points.len() - 1]
    }

    /// The number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        self.points.len() - 1
    }

    /// The cached bounding box of the polygon.
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Iterates over the ring's edges.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points.windows(2).map(|w| Segment::new(w[0], w[1]))
    }

    /// Returns this polygon with counter-clockwise winding, reversing the
    /// ring when it winds the other way.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// # use geometry::polygon::is_ccw;
    /// let cw = Polygon::new(vec![
    ///     Point::new(0, 0),
    ///     Point::new(0, 4),
    ///     Point::new(4, 4),
    ///     Point::new(4, 0),
    ///     Point::new(0, 0),
    /// ])
    /// .unwrap();
    /// assert!(!is_ccw(cw.points()));
    /// assert!(is_ccw(cw.into_ccw().points()));
    /// ```
    pub fn into_ccw(self) -> Self {
        if is_ccw(&self.points) {
            self
        } else {
            let mut points = self.points;
            points.reverse();
            Self {
                points,
                bbox: self.bbox,
            }
        }
    }

    /// The area of the polygon, by the shoelace formula.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let square = Polygon::from_rect(Rect::from_sides(0, 0, 4, 4));
    /// assert_eq!(square.area(), 16.0);
    /// ```
    pub fn area(&self) -> f64 {
        let mut cross: i128 = 0;
        for w in self.points.windows(2) {
            cross += w[0].x as i128 * w[1].y as i128 - w[1].x as i128 * w[0].y as i128;
        }
        (cross as f64 / 2.0).abs()
    }
}

fn ring_bbox(points: &[Point]) -> Rect {
    let left = points.iter().map(|p| p.x).min().unwrap();
    let right = points.iter().map(|p| p.x).max().unwrap();
    let bot = points.iter().map(|p| p.y).min().unwrap();
    let top = points.iter().map(|p| p.y).max().unwrap();
    Rect::from_sides(left, bot, right, top)
}

impl Bbox for Polygon {
    fn bbox(&self) -> Option<Rect> {
        Some(self.bbox)
    }
}

impl Contains<Point> for Polygon {
    /// Tests a point against the polygon by ray casting.
    ///
    /// Vertices and edge points report [`Containment::Boundary`]; the ray
    /// cast proper uses the half-open `[y_min, y_max)` rule so a ray passing
    /// exactly through a shared vertex is counted once.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let square = Polygon::from_rect(Rect::from_sides(0, 0, 4, 4));
    /// assert!(square.contains(&Point::new(2, 2)).is_full());
    /// assert!(square.contains(&Point::new(0, 2)).is_inside());
    /// assert!(!square.contains(&Point::new(5, 2)).is_inside());
    /// ```
    fn contains(&self, p: &Point) -> Containment {
        // Cheap reject before walking edges.
        if !self.bbox.contains(p).is_inside() {
            return Containment::None;
        }

        if self.vertices().contains(p) {
            return Containment::Boundary;
        }
        for edge in self.edges() {
            if edge.contains_point(*p) {
                return Containment::Boundary;
            }
        }

        // Horizontal ray toward +x; count crossings of the half-open
        // [y_min, y_max) span of each non-horizontal edge.
        let mut crossings = 0usize;
        for edge in self.edges() {
            let (lo, hi) = if edge.p1.y <= edge.p2.y {
                (edge.p1, edge.p2)
            } else {
                (edge.p2, edge.p1)
            };
            if lo.y == hi.y || p.y < lo.y || p.y >= hi.y {
                continue;
            }
            let t = (hi.x - lo.x) as i128 * (p.y - lo.y) as i128
                - (hi.y - lo.y) as i128 * (p.x - lo.x) as i128;
            if t > 0 {
                crossings += 1;
            }
        }
        if crossings % 2 == 1 {
            Containment::Full
        } else {
            Containment::None
        }
    }
}

impl TranslateMut for Polygon {
    fn translate_mut(&mut self, p: Point) {
        self.points.translate_mut(p);
        self.bbox.translate_mut(p);
    }
}

impl TransformMut for Polygon {
    /// Applies `trans` to every vertex.
    ///
    /// Invariant: a reflecting transformation reverses the ring's point
    /// order, so the winding stays counter-clockwise.
    fn transform_mut(&mut self, trans: Transformation) {
        self.points.transform_mut(trans);
        if trans.reflects() {
            self.points.reverse();
        }
        self.bbox = ring_bbox(&self.points);
    }
}

/// Returns `true` if the ring `points` winds counter-clockwise.
///
/// Computed from the sign of the shoelace sum; colinear "rings" report
/// `false`.
pub fn is_ccw(points: &[Point]) -> bool {
    let mut cross: i128 = 0;
    for w in points.windows(2) {
        cross += w[0].x as i128 * w[1].y as i128 - w[1].x as i128 * w[0].y as i128;
    }
    cross > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Rotation, Transform};
    use approx::assert_relative_eq;

    fn unit_square() -> Polygon {
        Polygon::from_rect(Rect::from_sides(0, 0, 4, 4))
    }

    fn l_shape() -> Polygon {
        // An L: the unit square with its upper-right quadrant removed.
        Polygon::new(vec![
            Point::new(0, 0),
            Point::new(4, 0),
            Point::new(4, 2),
            Point::new(2, 2),
            Point::new(2, 4),
            Point::new(0, 4),
            Point::new(0, 0),
        ])
        .unwrap()
    }

    #[test]
    fn vertices_and_edge_midpoints_are_inside() {
        for poly in [unit_square(), l_shape()] {
            for v in poly.vertices() {
                assert!(poly.contains(v).is_inside(), "vertex {:?} not inside", v);
            }
            for edge in poly.edges() {
                let mid = Point::new((edge.p1.x + edge.p2.x) / 2, (edge.p1.y + edge.p2.y) / 2);
                assert!(poly.contains(&mid).is_inside(), "midpoint {:?} not inside", mid);
            }
        }
    }

    #[test]
    fn concave_notch_is_outside() {
        let poly = l_shape();
        assert!(!poly.contains(&Point::new(3, 3)).is_inside());
        assert!(poly.contains(&Point::new(1, 3)).is_full());
        assert!(poly.contains(&Point::new(3, 1)).is_full());
    }

    #[test]
    fn double_reflection_round_trips() {
        let original = l_shape();
        let poly = original
            .clone()
            .transform(Transformation::reflect_x())
            .transform(Transformation::reflect_x());
        assert_eq!(poly.bbox(), original.bbox());
        assert_eq!(poly.vertex_count(), original.vertex_count());
        for v in original.vertices() {
            assert!(poly.vertices().contains(v));
        }
    }

    #[test]
    fn four_quarter_turns_round_trip() {
        let original = l_shape();
        let mut poly = original.clone();
        for _ in 0..4 {
            poly.transform_mut(Transformation::rotate(Rotation::R90));
        }
        assert_eq!(poly, original);
    }

    #[test]
    fn area_is_invariant_under_rigid_transforms(){
        let poly = l_shape();
        let transforms = [
            Transformation::translate(100, -250),
            Transformation::rotate(Rotation::R90),
            Transformation::rotate(Rotation::R270),
            Transformation::reflect_x(),
            Transformation::from_opts(Point::new(7, 9), true, Rotation::R180),
        ];
        for trans in transforms {
            let transformed = poly.clone().transform(trans);
            assert_relative_eq!(transformed.area(), poly.area());
        }
    }

    #[test]
    fn reflection_preserves_winding() {
        let poly = l_shape();
        assert!(is_ccw(poly.points()));
        let reflected = poly.transform(Transformation::reflect_x());
        assert!(is_ccw(reflected.points()));
    }

    #[test]
    fn malformed_rings_are_rejected() {
        assert!(matches!(
            Polygon::new(vec![Point::new(0, 0), Point::new(1, 1)]),
            Err(GeometryError::MalformedPolygon { .. })
        ));
        assert!(matches!(
            Polygon::new(vec![
                Point::new(0, 0),
                Point::new(4, 0),
                Point::new(4, 4),
                Point::new(0, 4),
            ]),
            Err(GeometryError::MalformedPolygon { .. })
        ));
    }
}

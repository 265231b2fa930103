//! Line segments and the exact predicates built on them.
//!
//! All predicates use integer arithmetic (widened to `i128` where products
//! appear), so there is no floating-point tolerance to tune: two segments
//! either intersect or they do not.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// The orientation of an ordered point triple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Orientation {
    /// All three points lie on one line.
    Colinear,
    /// The triple turns clockwise.
    Clockwise,
    /// The triple turns counterclockwise.
    CounterClockwise,
}

/// Returns the [`Orientation`] of the ordered triple `(a, b, c)`.
///
/// # Example
///
/// ```
/// # use geometry::prelude::*;
/// # use geometry::segment::{orientation, Orientation};
/// let a = Point::new(0, 0);
/// let b = Point::new(4, 0);
/// assert_eq!(orientation(a, b, Point::new(4, 4)), Orientation::CounterClockwise);
/// assert_eq!(orientation(a, b, Point::new(4, -4)), Orientation::Clockwise);
/// assert_eq!(orientation(a, b, Point::new(8, 0)), Orientation::Colinear);
/// ```
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let cross = (b.y - a.y) as i128 * (c.x - b.x) as i128
        - (b.x - a.x) as i128 * (c.y - b.y) as i128;
    match cross {
        0 => Orientation::Colinear,
        c if c > 0 => Orientation::Clockwise,
        _ => Orientation::CounterClockwise,
    }
}

/// A directed line segment between two points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub struct Segment {
    /// The starting point.
    pub p1: Point,
    /// The ending point.
    pub p2: Point,
}

impl Segment {
    /// Creates a new [`Segment`] from `p1` to `p2`.
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// The standard-form coefficients `(a, b, c)` of the segment's line,
    /// satisfying `a*x + b*y = c`.
    pub fn standard_form(&self) -> (i64, i64, i64) {
        let a = self.p1.y - self.p2.y;
        let b = self.p2.x - self.p1.x;
        let c = self.p2.x * self.p1.y - self.p1.x * self.p2.y;
        (a, b, c)
    }

    /// Returns `true` if `p` lies within the segment's bounding rectangle.
    ///
    /// Only meaningful when `p` is already known to be colinear with the
    /// segment; together the two conditions place `p` on the segment itself.
    pub fn contains_colinear(&self, p: Point) -> bool {
        p.x <= self.p1.x.max(self.p2.x)
            && p.x >= self.p1.x.min(self.p2.x)
            && p.y <= self.p1.y.max(self.p2.y)
            && p.y >= self.p1.y.min(self.p2.y)
    }

    /// Returns `true` if `p` lies on the segment (endpoints included).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let seg = Segment::new(Point::new(0, 0), Point::new(4, 4));
    /// assert!(seg.contains_point(Point::new(2, 2)));
    /// assert!(!seg.contains_point(Point::new(2, 3)));
    /// assert!(!seg.contains_point(Point::new(5, 5)));
    /// ```
    pub fn contains_point(&self, p: Point) -> bool {
        orientation(self.p1, self.p2, p) == Orientation::Colinear && self.contains_colinear(p)
    }

    /// Returns `true` if the two segments share at least one point.
    ///
    /// The general case checks that each segment's endpoints straddle the
    /// other's line; colinear overlap is handled by the on-segment special
    /// cases.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Segment::new(Point::new(0, 0), Point::new(4, 4));
    /// let b = Segment::new(Point::new(0, 4), Point::new(4, 0));
    /// assert!(a.intersects(&b));
    /// let c = Segment::new(Point::new(5, 5), Point::new(9, 5));
    /// assert!(!a.intersects(&c));
    /// ```
    pub fn intersects(&self, other: &Segment) -> bool {
        let o1 = orientation(self.p1, self.p2, other.p1);
        let o2 = orientation(self.p1, self.p2, other.p2);
        let o3 = orientation(other.p1, other.p2, self.p1);
        let o4 = orientation(other.p1, other.p2, self.p2);

        // General case: endpoints straddle on both sides.
        if o1 != o2 && o3 != o4 {
            return true;
        }

        // Colinear endpoints landing on the other segment.
        if o1 == Orientation::Colinear && self.contains_colinear(other.p1) {
            return true;
        }
        if o2 == Orientation::Colinear && self.contains_colinear(other.p2) {
            return true;
        }
        if o3 == Orientation::Colinear && other.contains_colinear(self.p1) {
            return true;
        }
        if o4 == Orientation::Colinear && other.contains_colinear(self.p2) {
            return true;
        }

        false
    }

    /// The intersection point of two segments, via Cramer's rule on their
    /// standard-form coefficients.
    ///
    /// Returns [`None`] if the segments do not intersect or if their lines
    /// are parallel (zero determinant); this includes colinear overlap, so
    /// overlapping parallel segments produce no intersection vertex.
    ///
    /// The division is exact when either segment is axis-aligned at the
    /// crossing; for skew crossings off the integer grid the result is
    /// rounded to the nearest database unit.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Segment::new(Point::new(0, 0), Point::new(4, 4));
    /// let b = Segment::new(Point::new(0, 4), Point::new(4, 0));
    /// assert_eq!(a.intersection(&b), Some(Point::new(2, 2)));
    /// ```
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        if !self.intersects(other) {
            return None;
        }
        let (a1, b1, c1) = self.standard_form();
        let (a2, b2, c2) = other.standard_form();
        let det = a1 as i128 * b2 as i128 - a2 as i128 * b1 as i128;
        if det == 0 {
            return None;
        }
        let det_x = c1 as i128 * b2 as i128 - c2 as i128 * b1 as i128;
        let det_y = a1 as i128 * c2 as i128 - a2 as i128 * c1 as i128;
        Some(Point::new(div_round(det_x, det), div_round(det_y, det)))
    }
}

/// Division rounding to the nearest integer, ties away from zero.
fn div_round(n: i128, d: i128) -> i64 {
    let (n, d) = if d < 0 { (-n, -d) } else { (n, d) };
    let q = if n >= 0 {
        (n + d / 2) / d
    } else {
        (n - d / 2) / d
    };
    q as i64
}

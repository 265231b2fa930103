//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::contains::{Containment, Contains};
use crate::dir::Dir;
use crate::point::Point;
use crate::side::Side;
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(
    Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a rectangle from two corner points, sorting the coordinates
    /// so that the lower-left/upper-right invariant holds.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::new(Point::new(30, 20), Point::new(10, 40));
    /// assert_eq!(rect.lower_left(), Point::new(10, 20));
    /// assert_eq!(rect.upper_right(), Point::new(30, 40));
    /// ```
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15, 20, 30, 40);
    /// assert_eq!(rect.left(), 15);
    /// assert_eq!(rect.bot(), 20);
    /// assert_eq!(rect.right(), 30);
    /// assert_eq!(rect.top(), 40);
    /// ```
    ///
    /// # Panics
    ///
    /// This method panics if `left > right` or if `bot > top`.
    pub fn from_sides(left: i64, bot: i64, right: i64, top: i64) -> Self {
        assert!(
            left <= right,
            "Rect::from_sides requires that left ({}) <= right ({})",
            left,
            right
        );
        assert!(
            bot <= top,
            "Rect::from_sides requires that bot ({}) <= top ({})",
            bot,
            top
        );
        Self {
            p0: Point::new(left, bot),
            p1: Point::new(right, top),
        }
    }

    /// Creates a rectangle from all 4 sides, returning [`None`] if the sides
    /// would make the rectangle empty.
    pub fn from_sides_option(left: i64, bot: i64, right: i64, top: i64) -> Option<Self> {
        if left > right || bot > top {
            None
        } else {
            Some(Self::from_sides(left, bot, right, top))
        }
    }

    /// Creates a zero-area rectangle containing the given point.
    #[inline]
    pub const fn from_point(p: Point) -> Self {
        Self { p0: p, p1: p }
    }

    /// The lower-left corner.
    #[inline]
    pub const fn lower_left(&self) -> Point {
        self.p0
    }

    /// The upper-right corner.
    #[inline]
    pub const fn upper_right(&self) -> Point {
        self.p1
    }

    /// The leftmost x-coordinate.
    #[inline]
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// The bottommost y-coordinate.
    #[inline]
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// The rightmost x-coordinate.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// The topmost y-coordinate.
    #[inline]
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// The coordinate of the given [`Side`].
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15, 20, 30, 40);
    /// assert_eq!(rect.side(Side::Left), 15);
    /// assert_eq!(rect.side(Side::Top), 40);
    /// ```
    pub const fn side(&self, side: Side) -> i64 {
        match side {
            Side::Left => self.left(),
            Side::Bot => self.bot(),
            Side::Right => self.right(),
            Side::Top => self.top(),
        }
    }

    /// The width of the rectangle.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.p1.x - self.p0.x
    }

    /// The height of the rectangle.
    #[inline]
    pub const fn height(&self) -> i64 {
        self.p1.y - self.p0.y
    }

    /// The length of the rectangle along the given direction.
    pub const fn length(&self, dir: Dir) -> i64 {
        match dir {
            Dir::Horiz => self.width(),
            Dir::Vert => self.height(),
        }
    }

    /// The direction in which the rectangle is longer, ties horizontal.
    pub const fn longer_dir(&self) -> Dir {
        if self.height() > self.width() {
            Dir::Vert
        } else {
            Dir::Horiz
        }
    }

    /// The center point of the rectangle, rounded down.
    pub const fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2, (self.p0.y + self.p1.y) / 2)
    }

    /// The area of the rectangle.
    pub const fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// The perimeter of the rectangle: `2 * (width + height)`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 30, 10);
    /// assert_eq!(rect.perimeter(), 80);
    /// ```
    pub const fn perimeter(&self) -> i64 {
        2 * (self.width() + self.height())
    }

    /// Returns a new [`Rect`] expanded by `amount` on all four sides.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(10, 10, 20, 20);
    /// assert_eq!(rect.expand_all(5), Rect::from_sides(5, 5, 25, 25));
    /// ```
    pub const fn expand_all(&self, amount: i64) -> Self {
        Self {
            p0: Point::new(self.p0.x - amount, self.p0.y - amount),
            p1: Point::new(self.p1.x + amount, self.p1.y + amount),
        }
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p0: Point::new(self.p0.x.min(other.p0.x), self.p0.y.min(other.p0.y)),
            p1: Point::new(self.p1.x.max(other.p1.x), self.p1.y.max(other.p1.y)),
        }
    }

    /// Returns `true` if `self` and `other` overlap.
    ///
    /// Rectangles that merely share an edge or a corner count as
    /// overlapping.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Rect::from_sides(0, 0, 10, 10);
    /// assert!(a.overlaps(&Rect::from_sides(5, 5, 15, 15)));
    /// assert!(a.overlaps(&Rect::from_sides(10, 0, 20, 10)));
    /// assert!(!a.overlaps(&Rect::from_sides(11, 0, 20, 10)));
    /// ```
    pub const fn overlaps(&self, other: &Self) -> bool {
        // One box strictly to the left of, or strictly above, the other.
        if self.p1.x < other.p0.x || other.p1.x < self.p0.x {
            return false;
        }
        if self.p1.y < other.p0.y || other.p1.y < self.p0.y {
            return false;
        }
        true
    }

    /// The intersection of `self` and `other`, or [`None`] if they do not
    /// overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        Self::from_sides_option(
            self.left().max(other.left()),
            self.bot().max(other.bot()),
            self.right().min(other.right()),
            self.top().min(other.top()),
        )
    }

    /// The corners of the rectangle scaled to microns.
    ///
    /// `dbu_per_micron` is the number of database units per micron.
    pub fn corners_microns(&self, dbu_per_micron: i64) -> [(f64, f64); 2] {
        let s = dbu_per_micron as f64;
        [
            (self.p0.x as f64 / s, self.p0.y as f64 / s),
            (self.p1.x as f64 / s, self.p1.y as f64 / s),
        ]
    }
}

impl Contains<Point> for Rect {
    /// Tests whether the rectangle contains a point, boundary inclusive.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 10, 10);
    /// assert!(rect.contains(&Point::new(5, 5)).is_full());
    /// assert!(rect.contains(&Point::new(0, 5)).is_inside());
    /// assert!(!rect.contains(&Point::new(-1, 5)).is_inside());
    /// ```
    fn contains(&self, other: &Point) -> Containment {
        if other.x < self.p0.x || other.x > self.p1.x || other.y < self.p0.y || other.y > self.p1.y
        {
            Containment::None
        } else if other.x == self.p0.x
            || other.x == self.p1.x
            || other.y == self.p0.y
            || other.y == self.p1.y
        {
            Containment::Boundary
        } else {
            Containment::Full
        }
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl TranslateMut for Rect {
    fn translate_mut(&mut self, p: Point) {
        self.p0.translate_mut(p);
        self.p1.translate_mut(p);
    }
}

impl TransformMut for Rect {
    fn transform_mut(&mut self, trans: Transformation) {
        *self = Rect::new(trans.apply(self.p0), trans.apply(self.p1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Rotation, Transform};

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (Rect::from_sides(0, 0, 10, 10), Rect::from_sides(5, 5, 15, 15)),
            (Rect::from_sides(0, 0, 10, 10), Rect::from_sides(10, 10, 20, 20)),
            (Rect::from_sides(0, 0, 10, 10), Rect::from_sides(11, 11, 20, 20)),
            (Rect::from_sides(0, 0, 4, 4), Rect::from_sides(4, 0, 8, 4)),
        ];
        for (a, b) in cases {
            assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }

    #[test]
    fn touching_edges_overlap() {
        let a = Rect::from_sides(0, 0, 4, 4);
        let b = Rect::from_sides(4, 0, 8, 4);
        assert!(a.overlaps(&b));
        assert_eq!(a.intersection(&b), Some(Rect::from_sides(4, 0, 4, 4)));
    }

    #[test]
    fn rotated_rect_stays_normalized() {
        let r = Rect::from_sides(0, 0, 100, 200)
            .transform(Transformation::rotate(Rotation::R90));
        assert_eq!(r, Rect::from_sides(-200, 0, 0, 100));
    }
}

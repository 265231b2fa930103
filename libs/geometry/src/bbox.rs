//! Axis-aligned rectangular bounding boxes.

use crate::rect::Rect;

/// A geometric shape that has a bounding box.
///
/// # Examples
///
/// ```
/// # use geometry::prelude::*;
/// let rect = Rect::from_sides(0, 0, 100, 200);
/// assert_eq!(rect.bbox(), Some(Rect::from_sides(0, 0, 100, 200)));
/// ```
pub trait Bbox {
    /// Computes the axis-aligned rectangular bounding box.
    ///
    /// If empty, this method should return `None`. Note that points and
    /// zero-area rectangles are not empty: they contain a single point, and
    /// their bounding box implementations will return `Some(_)`.
    fn bbox(&self) -> Option<Rect>;

    /// Computes the axis-aligned rectangular bounding box, panicking
    /// if it is empty.
    fn bbox_rect(&self) -> Rect {
        self.bbox().unwrap()
    }
}

impl<T> Bbox for &T
where
    T: Bbox,
{
    fn bbox(&self) -> Option<Rect> {
        T::bbox(*self)
    }
}

impl<T: Bbox> Bbox for Vec<T> {
    fn bbox(&self) -> Option<Rect> {
        let mut bbox: Option<Rect> = None;
        for item in self {
            bbox = match (bbox, item.bbox()) {
                (Some(a), Some(b)) => Some(a.union(&b)),
                (a, None) => a,
                (None, b) => b,
            };
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use crate::polygon::Polygon;

    #[test]
    fn bbox_works_for_vecs() {
        let v = vec![
            Rect::from_sides(0, 0, 100, 200),
            Rect::from_sides(-50, 20, 90, 250),
        ];
        assert_eq!(v.bbox(), Some(Rect::from_sides(-50, 0, 100, 250)));
    }

    #[test]
    fn bbox_works_for_polygon() {
        let polygon = Polygon::new(vec![
            Point::new(-10, 25),
            Point::new(0, 16),
            Point::new(40, -20),
            Point::new(-10, 25),
        ])
        .unwrap();
        assert_eq!(Bbox::bbox(&polygon), Some(Rect::from_sides(-10, -20, 40, 25)));
    }
}

//! A prelude exporting commonly used items.

pub use crate::bbox::Bbox;
pub use crate::contains::{Containment, Contains};
pub use crate::dir::Dir;
pub use crate::error::{GeometryError, GeometryResult};
pub use crate::point::Point;
pub use crate::polygon::Polygon;
pub use crate::rect::Rect;
pub use crate::segment::Segment;
pub use crate::side::Side;
pub use crate::transform::{
    Rotation, Transform, TransformMut, Transformation, Translate, TranslateMut,
};

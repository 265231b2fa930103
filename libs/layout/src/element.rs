//! The closed set of layout elements a structure may contain.
//!
//! Element kinds are modeled as enums rather than downcasts so that a match
//! over them is checked at compile time, and so that unsupported reference
//! transforms (arbitrary angles, magnification) are unrepresentable: they
//! are rejected at import, before an [`Element`] is ever built.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use geometry::point::Point;
use geometry::transform::Rotation;

/// How a path's ends extend beyond its endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PathStyle {
    /// Square ends, flush with the endpoints (GDSII path type 0).
    #[default]
    Flush,
    /// Square ends extended past the endpoints by half the width
    /// (GDSII path type 2).
    Square,
    /// Custom square-end extension (GDSII path type 4); treated as a
    /// half-width extension.
    Custom,
}

impl PathStyle {
    /// Maps a GDSII path type to a [`PathStyle`].
    ///
    /// Returns [`None`] for the path types this tool does not support
    /// (e.g. round-ended type 1).
    pub fn from_gds(path_type: Option<i16>) -> Option<Self> {
        match path_type {
            None | Some(0) => Some(PathStyle::Flush),
            Some(2) => Some(PathStyle::Square),
            Some(4) => Some(PathStyle::Custom),
            _ => None,
        }
    }

    /// Whether the path extends past its endpoints along its axis.
    pub fn extends_ends(&self) -> bool {
        !matches!(self, PathStyle::Flush)
    }
}

/// A wire segment: a Manhattan centerline with a width.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Path {
    /// The GDSII layer number.
    pub layer: i16,
    /// The GDSII datatype.
    pub datatype: i16,
    /// The wire width, in database units.
    pub width: i64,
    /// The end style.
    pub style: PathStyle,
    /// The two endpoints of the centerline.
    pub endpoints: [Point; 2],
    /// The net this path belongs to, when annotated in the source file.
    pub net: Option<ArcStr>,
}

/// A filled polygon, stored as a closed counter-clockwise ring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Boundary {
    /// The GDSII layer number.
    pub layer: i16,
    /// The GDSII datatype.
    pub datatype: i16,
    /// The closed ring (first point repeated as last).
    pub points: Vec<Point>,
}

/// A single placement of another structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructRef {
    /// The name of the referenced structure.
    pub target: ArcStr,
    /// Where the referenced structure's origin lands.
    pub origin: Point,
    /// Reflect about the x-axis before rotating.
    pub reflect_x: bool,
    /// Counter-clockwise rotation applied after any reflection.
    pub rotation: Rotation,
}

/// A rectangular array of placements of another structure.
///
/// GDSII describes the array with three anchor points: the origin, the far
/// corner along the column (x) direction, and the far corner along the row
/// (y) direction. Column/row pitch is each anchor displacement divided by
/// the corresponding count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArrayRef {
    /// The name of the referenced structure.
    pub target: ArcStr,
    /// Number of rows.
    pub rows: i64,
    /// Number of columns.
    pub cols: i64,
    /// The array origin.
    pub origin: Point,
    /// The anchor spanning all columns.
    pub col_anchor: Point,
    /// The anchor spanning all rows.
    pub row_anchor: Point,
    /// Reflect about the x-axis before rotating.
    pub reflect_x: bool,
    /// Counter-clockwise rotation applied after any reflection.
    pub rotation: Rotation,
}

/// An element of a layout structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Element {
    /// A wire segment.
    Path(Path),
    /// A filled polygon.
    Boundary(Boundary),
    /// A single structure reference.
    SRef(StructRef),
    /// An array structure reference.
    ARef(ArrayRef),
}

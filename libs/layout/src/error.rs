//! Layout result and error types.

use arcstr::ArcStr;

/// The [`LayoutError`] result type.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// A layout import or flattening error.
///
/// All of these are unrecoverable for the structure or element being
/// processed; callers decide whether to abort the run or skip the unit of
/// work.
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    /// A reference transform outside the supported whitelist: reflection
    /// other than about the x-axis, rotation off the 90-degree grid, or a
    /// magnification.
    #[error("unsupported transform on reference to `{target}` in `{structure}`: {detail}")]
    UnsupportedTransform {
        /// The structure containing the offending reference.
        structure: ArcStr,
        /// The referenced structure.
        target: ArcStr,
        /// What was unsupported about the transform.
        detail: String,
    },
    /// A GDSII element kind this tool does not handle (box, node).
    #[error("unsupported {kind} element in structure `{structure}`")]
    UnsupportedElementKind {
        /// The structure containing the element.
        structure: ArcStr,
        /// The element kind name.
        kind: &'static str,
    },
    /// A path with an unsupported shape: missing width, an unsupported end
    /// style, or more than two centerline points.
    #[error("unsupported path in structure `{structure}`: {detail}")]
    UnsupportedPath {
        /// The structure containing the path.
        structure: ArcStr,
        /// What was unsupported about the path.
        detail: String,
    },
    /// A path whose centerline is neither horizontal nor vertical.
    #[error("non-Manhattan path in structure `{structure}` between ({x1}, {y1}) and ({x2}, {y2})")]
    NonManhattanPath {
        /// The structure containing the path.
        structure: ArcStr,
        /// First endpoint x.
        x1: i64,
        /// First endpoint y.
        y1: i64,
        /// Second endpoint x.
        x2: i64,
        /// Second endpoint y.
        y2: i64,
    },
    /// A reference to a structure that does not exist in the library.
    #[error("reference to unknown structure `{target}` in `{structure}`")]
    UnknownStructureReference {
        /// The structure containing the reference.
        structure: ArcStr,
        /// The missing structure name.
        target: ArcStr,
    },
    /// Reference nesting deeper than the supported bound, which in valid
    /// layouts only happens when the reference graph contains a cycle.
    #[error("reference depth exceeded {depth} levels at `{structure}`; the hierarchy likely contains a cycle")]
    CircularReference {
        /// The structure at which the bound was hit.
        structure: ArcStr,
        /// The depth bound.
        depth: usize,
    },
    /// Two structures in one library share a name.
    #[error("duplicate structure name `{name}` in library")]
    DuplicateStructure {
        /// The duplicated name.
        name: ArcStr,
    },
    /// A malformed polygon ring (unclosed or too few vertices).
    #[error("invalid boundary in structure `{structure}`: {source}")]
    InvalidBoundary {
        /// The structure containing the boundary.
        structure: ArcStr,
        /// The underlying geometry error.
        source: geometry::error::GeometryError,
    },
    /// An error reading the GDSII file itself.
    #[error("error reading GDSII: {0:?}")]
    Gds(#[from] gds21::GdsError),
}

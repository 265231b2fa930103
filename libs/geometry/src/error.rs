//! Geometry result and error types.

/// The [`GeometryError`] result type.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// A geometry error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A polygon ring had too few vertices or did not close on itself.
    #[error("malformed polygon: {reason} ({vertices} vertices)")]
    MalformedPolygon {
        /// Why the ring was rejected.
        reason: &'static str,
        /// The number of coordinates supplied.
        vertices: usize,
    },
    /// Polygon clipping failed to terminate within its iteration bound.
    ///
    /// Indicates a malformed or self-intersecting input polygon.
    #[error("polygon clipping exceeded {bound} iterations; input is likely self-intersecting")]
    ClipDivergence {
        /// The iteration bound that was exceeded.
        bound: usize,
    },
}

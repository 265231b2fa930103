//! Analysis result and error types.

use arcstr::ArcStr;

/// The [`ScoreError`] result type.
pub type ScoreResult<T> = Result<T, ScoreError>;

/// An analysis error.
///
/// Every variant is unrecoverable for the unit of work (net segment,
/// structure, clip operation) it arose in; the driver decides whether to
/// abort or skip.
#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    /// A geometry kernel error.
    #[error(transparent)]
    Geometry(#[from] geometry::error::GeometryError),
    /// A layout import or flattening error.
    #[error(transparent)]
    Layout(#[from] layout::LayoutError),
    /// A technology model error.
    #[error(transparent)]
    Tech(#[from] tech::TechError),
    /// An error located within the analysis of one net segment.
    #[error("while analyzing net `{net}` segment {segment}: {source}")]
    InNet {
        /// The net's full name.
        net: ArcStr,
        /// The 1-based segment ordinal.
        segment: usize,
        /// The underlying error.
        source: Box<ScoreError>,
    },
    /// The top structure named in the configuration does not exist.
    #[error("top structure `{name}` not found in the layout")]
    MissingTopStructure {
        /// The configured top structure name.
        name: ArcStr,
    },
    /// A critical net segment sits on GDS geometry with no routing layer.
    #[error("net `{net}` has geometry on GDS layer {gds_layer}/{datatype}, which maps to no routing layer")]
    UnroutedCriticalNet {
        /// The net's full name.
        net: ArcStr,
        /// The GDS layer number.
        gds_layer: i16,
        /// The GDS datatype.
        datatype: i16,
    },
}

impl ScoreError {
    /// Wraps this error with the net segment it arose in.
    pub fn in_net(self, net: ArcStr, segment: usize) -> Self {
        ScoreError::InNet {
            net,
            segment,
            source: Box::new(self),
        }
    }
}

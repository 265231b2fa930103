//! Technology result and error types.

use arcstr::ArcStr;

/// The [`TechError`] result type.
pub type TechResult<T> = Result<T, TechError>;

/// An error in technology data or one of its input files.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TechError {
    /// A derived spacing/width value is not an exact integer number of
    /// database units.
    ///
    /// The blockage scanner steps in whole database units, so this is a
    /// process-setup invariant, checked once when the layer model is built.
    #[error(
        "{quantity} of `{name}` ({microns} um) is not an integer multiple of the database unit (1/{database_units} um)"
    )]
    NonIntegerDatabaseUnit {
        /// The offending layer, site, or cell.
        name: ArcStr,
        /// Which derived quantity failed.
        quantity: &'static str,
        /// The micron value that failed to convert.
        microns: f64,
        /// Database units per micron.
        database_units: i64,
    },
    /// A malformed record in an input file.
    #[error("parse error in {context} at line {line}: {message}")]
    Parse {
        /// A short description of the file being parsed.
        context: &'static str,
        /// 1-indexed line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// A record the model cannot be built without was never seen.
    #[error("missing {what}")]
    MissingRecord {
        /// The missing record.
        what: &'static str,
    },
    /// A placement row names a site that was not defined in the LEF.
    #[error("placement row references unknown site `{name}`")]
    UnknownSite {
        /// The site name.
        name: ArcStr,
    },
    /// A lookup for a routing layer that does not exist.
    #[error("unknown routing layer `{name}`")]
    UnknownLayer {
        /// The layer name or number.
        name: String,
    },
}

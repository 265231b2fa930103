//! Placement sites and standard cells.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// A legal placement slot, as defined by a LEF `SITE`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacementSite {
    /// The site name.
    pub name: ArcStr,
    /// The LEF site class (`CORE`, `PAD`, ...).
    pub class: Option<ArcStr>,
    /// Site width, in database units.
    pub width: i64,
    /// Site height, in database units.
    pub height: i64,
}

/// A standard cell, as defined by a LEF `MACRO`.
///
/// Cells with class `SPACER` are fill cells: they occupy area without
/// implementing logic, and the open-space analysis treats the sites under
/// them as free.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandardCell {
    /// The macro name.
    pub name: ArcStr,
    /// Cell width, in database units.
    pub width: i64,
    /// Cell height, in database units.
    pub height: i64,
    /// Whether the cell is a fill/spacer cell.
    pub is_filler: bool,
}

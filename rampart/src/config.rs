//! Analysis configuration.
//!
//! All knobs live in one explicit struct passed into each entry point; the
//! engine keeps no process-wide mutable state.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// Configuration for a scoring run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreConfig {
    /// The name of the top-level structure to analyze.
    pub top_cell: ArcStr,
    /// Step size for the same-layer perimeter scan, in database units.
    pub net_blockage_step: i64,
    /// GDS layers strictly below this number are device layers; their
    /// geometry colors the placement grid for the trigger-space analysis.
    pub first_routing_gds_layer: i16,
    /// The smallest 4-connected open region (in placement sites) considered
    /// large enough to host a trigger circuit.
    pub target_trigger_size: usize,
    /// Segments whose weighted blockage percentage is at or above this
    /// value are considered unreachable and skipped by the routing-distance
    /// metric.
    pub max_blockage: f64,
    /// Structure names to skip while flattening device geometry, in
    /// addition to the LEF fill cells.
    pub ignored_cells: Vec<ArcStr>,
}

impl ScoreConfig {
    /// Creates a configuration with default knobs for the given top cell.
    pub fn new(top_cell: impl Into<ArcStr>) -> Self {
        Self {
            top_cell: top_cell.into(),
            net_blockage_step: 1,
            first_routing_gds_layer: 0,
            target_trigger_size: 4,
            max_blockage: 100.0,
            ignored_cells: Vec::new(),
        }
    }
}

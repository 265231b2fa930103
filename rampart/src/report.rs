//! Report types: aggregation over the core outputs, serializable and
//! renderable as text.

use std::collections::BTreeMap;
use std::fmt::Display;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use tech::GridCell;

use crate::net::Net;
use crate::route::RouteEstimate;

/// Blockage statistics for one scanned segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentBlockage {
    /// The net's full name.
    pub net: ArcStr,
    /// The segment's 1-based ordinal.
    pub segment: usize,
    /// The routing layer name.
    pub layer: ArcStr,
    /// Same-layer blocked percentage.
    pub same_layer_percentage: f64,
    /// Adjacent-layer blocked percentage.
    pub diff_layer_percentage: f64,
    /// Combined blocked percentage.
    pub weighted_percentage: f64,
    /// Faces with at least one open window.
    pub unblocked_sides: Vec<String>,
    /// Bounding-box perimeter, in database units.
    pub perimeter: i64,
    /// Top and bottom face area, in square database units.
    pub faces: f64,
}

/// The net blockage report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockageReport {
    /// Per-segment statistics.
    pub segments: Vec<SegmentBlockage>,
    /// Blocked percentage across all scanned faces of all segments.
    pub overall_percentage: f64,
}

impl BlockageReport {
    /// Aggregates the scan results stored on `nets`.
    ///
    /// Segments that have not been scanned are skipped.
    pub fn from_nets(nets: &[Net]) -> Self {
        let mut segments = Vec::new();
        let (mut blocked, mut checked) = (0u64, 0u64);
        for net in nets {
            for seg in &net.segments {
                let Some(result) = &seg.blockage else {
                    continue;
                };
                blocked += result.same_layer_blocked + result.diff_layer_blocked;
                checked += result.same_layer_checked + result.diff_layer_checked;
                let surface = seg.attack_surface();
                segments.push(SegmentBlockage {
                    net: seg.net_fullname.clone(),
                    segment: seg.ordinal,
                    layer: seg.layer_name.clone(),
                    same_layer_percentage: result.same_layer_percentage(),
                    diff_layer_percentage: result.diff_layer_percentage(),
                    weighted_percentage: result.weighted_percentage(),
                    unblocked_sides: result
                        .unblocked_sides
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    perimeter: surface.perimeter,
                    faces: surface.faces,
                });
            }
        }
        let overall_percentage = if checked == 0 {
            0.0
        } else {
            blocked as f64 / checked as f64 * 100.0
        };
        Self {
            segments,
            overall_percentage,
        }
    }
}

impl Display for BlockageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Net Blockage")?;
        for seg in &self.segments {
            writeln!(
                f,
                "  {} #{} ({}): same-layer {:.2}%, adjacent {:.2}%, open sides [{}]",
                seg.net,
                seg.segment,
                seg.layer,
                seg.same_layer_percentage,
                seg.diff_layer_percentage,
                seg.unblocked_sides.join(" ")
            )?;
        }
        writeln!(f, "  overall: {:.2}% blocked", self.overall_percentage)
    }
}

/// The open trigger-space report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerSpaceReport {
    /// Total open placement sites.
    pub open_sites: usize,
    /// Region count per region size.
    pub histogram: BTreeMap<usize, usize>,
}

impl TriggerSpaceReport {
    /// Builds the histogram from the flood-fill region map.
    pub fn from_regions(regions: &BTreeMap<usize, Vec<Vec<GridCell>>>) -> Self {
        let histogram: BTreeMap<usize, usize> =
            regions.iter().map(|(size, spaces)| (*size, spaces.len())).collect();
        let open_sites = regions
            .iter()
            .map(|(size, spaces)| size * spaces.len())
            .sum();
        Self {
            open_sites,
            histogram,
        }
    }
}

impl Display for TriggerSpaceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Trigger Spaces ({} open sites)", self.open_sites)?;
        for (size, count) in &self.histogram {
            writeln!(f, "  {size:>8} sites x {count}")?;
        }
        Ok(())
    }
}

/// The routing-distance report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteReport {
    /// One estimate per (region, segment) pair.
    pub estimates: Vec<RouteEstimate>,
}

impl Display for RouteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Routing Distance")?;
        for e in &self.estimates {
            write!(
                f,
                "  trigger {} (size {}): net {} #{} at {:.2} um",
                e.region_index, e.region_size, e.net_basename, e.segment, e.distance_microns
            )?;
            match (e.net_sigmas_from_mean, e.connection_sigmas_from_mean) {
                (Some(n), Some(c)) => writeln!(f, " (net {n:+.2} sigma, conn {c:+.2} sigma)")?,
                _ => writeln!(f)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_regions_by_size() {
        let mut regions: BTreeMap<usize, Vec<Vec<GridCell>>> = BTreeMap::new();
        regions.insert(2, vec![vec![GridCell::new(0, 0), GridCell::new(0, 1)]; 3]);
        regions.insert(5, vec![vec![GridCell::new(1, 0); 5]]);
        let report = TriggerSpaceReport::from_regions(&regions);
        assert_eq!(report.open_sites, 11);
        assert_eq!(report.histogram[&2], 3);
        assert_eq!(report.histogram[&5], 1);
    }

    #[test]
    fn empty_report_renders() {
        let report = BlockageReport {
            segments: Vec::new(),
            overall_percentage: 0.0,
        };
        let text = report.to_string();
        assert!(text.contains("overall: 0.00% blocked"));
    }
}

//! Routing-distance estimation.
//!
//! For each open region big enough to host a trigger, estimates the wiring
//! distance an attacker would need to connect trigger logic placed there to
//! each critical net segment: the Manhattan distance from the segment's
//! center to the closest open placement site of the region, compared
//! against the design's own wire-length distribution.

use std::collections::BTreeMap;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use geometry::point::Point;
use tech::{GridCell, PlacementGrid, Tech, WireStats};

use crate::config::ScoreConfig;
use crate::net::Net;

/// The estimated attack wiring distance from one open region to one net
/// segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteEstimate {
    /// The net's full name.
    pub net_fullname: ArcStr,
    /// The net's basename.
    pub net_basename: ArcStr,
    /// The segment's 1-based ordinal within the net.
    pub segment: usize,
    /// The size of the open region, in placement sites.
    pub region_size: usize,
    /// The region's index within its size bucket.
    pub region_index: usize,
    /// Manhattan distance to the closest open site, in microns.
    pub distance_microns: f64,
    /// The center(s) of the closest site(s); more than one on ties.
    pub site_centers: Vec<Point>,
    /// Standard deviations from the design's mean net length.
    pub net_sigmas_from_mean: Option<f64>,
    /// Standard deviations from the design's mean connection length.
    pub connection_sigmas_from_mean: Option<f64>,
}

/// Estimates routing distances from every sufficiently large open region to
/// every reachable critical net segment.
///
/// Segments whose weighted blockage percentage is at or above the
/// configured maximum are skipped: there is no point estimating a route to
/// a wire the attacker cannot tap.
pub fn analyze_routing_distance(
    nets: &[Net],
    regions: &BTreeMap<usize, Vec<Vec<GridCell>>>,
    grid: &PlacementGrid,
    tech: &Tech,
    wire_stats: Option<&WireStats>,
    config: &ScoreConfig,
) -> Vec<RouteEstimate> {
    let mut estimates = Vec::new();
    for (&size, spaces) in regions {
        if size < config.target_trigger_size {
            continue;
        }
        for (region_index, space) in spaces.iter().enumerate() {
            for net in nets {
                for seg in &net.segments {
                    if let Some(blockage) = &seg.blockage {
                        if blockage.weighted_percentage() >= config.max_blockage {
                            continue;
                        }
                    }
                    let center = seg.bbox.center();
                    let Some((distance, site_centers)) = closest_sites(center, space, grid)
                    else {
                        continue;
                    };
                    let distance_microns = distance as f64 / tech.database_units as f64;
                    estimates.push(RouteEstimate {
                        net_fullname: seg.net_fullname.clone(),
                        net_basename: seg.net_basename.clone(),
                        segment: seg.ordinal,
                        region_size: size,
                        region_index,
                        distance_microns,
                        site_centers,
                        net_sigmas_from_mean: wire_stats
                            .and_then(|s| sigmas(distance_microns, s.net_mean, s.net_sigma)),
                        connection_sigmas_from_mean: wire_stats.and_then(|s| {
                            sigmas(distance_microns, s.connection_mean, s.connection_sigma)
                        }),
                    });
                }
            }
        }
    }
    estimates
}

/// The minimum Manhattan distance from `from` to the region's site centers,
/// along with every site achieving it.
fn closest_sites(
    from: Point,
    space: &[GridCell],
    grid: &PlacementGrid,
) -> Option<(i64, Vec<Point>)> {
    let mut best: Option<(i64, Vec<Point>)> = None;
    for cell in space {
        let center = grid.site_center(*cell);
        let distance = from.manhattan_distance(center);
        match &mut best {
            None => best = Some((distance, vec![center])),
            Some((bd, centers)) => {
                if distance < *bd {
                    *bd = distance;
                    centers.clear();
                    centers.push(center);
                } else if distance == *bd {
                    centers.push(center);
                }
            }
        }
    }
    best
}

fn sigmas(value: f64, mean: f64, sigma: f64) -> Option<f64> {
    if sigma == 0.0 {
        None
    } else {
        Some((value - mean) / sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::extract_critical_nets;
    use crate::testutil::{test_config, test_library, test_tech};
    use crate::trigger::find_open_regions;
    use indexmap::IndexSet;
    use tech::grid::PlacementRow;

    fn small_grid() -> PlacementGrid {
        let site = tech::PlacementSite {
            name: ArcStr::from("unit"),
            class: None,
            width: 20,
            height: 200,
        };
        let rows: Vec<PlacementRow> = (0..2)
            .map(|i| PlacementRow {
                id: ArcStr::from(format!("ROW_{i}")),
                site: ArcStr::from("unit"),
                origin: Point::new(0, i * 200),
                orient: ArcStr::from("N"),
                count_x: 4,
                count_y: 1,
                step: Point::new(20, 0),
            })
            .collect();
        PlacementGrid::new(&rows, &site).unwrap()
    }

    #[test]
    fn closest_site_distance_is_minimal_and_ties_collect() {
        let grid = small_grid();
        let space = vec![
            GridCell::new(0, 0),
            GridCell::new(0, 1),
            GridCell::new(1, 0),
        ];
        // Site centers: (10,100), (30,100), (10,300).
        let (d, centers) = closest_sites(Point::new(20, 100), &space, &grid).unwrap();
        assert_eq!(d, 10);
        assert_eq!(centers, vec![Point::new(10, 100), Point::new(30, 100)]);
    }

    #[test]
    fn estimates_cover_regions_at_or_above_the_target_size() {
        let (lib, tech, mut config) = (test_library(), test_tech(), test_config());
        config.target_trigger_size = 8;
        let critical: IndexSet<ArcStr> = [ArcStr::from("key_reg")].into_iter().collect();
        let nets = extract_critical_nets(&lib, &tech, &config, &critical).unwrap();

        let grid = small_grid();
        let regions = find_open_regions(&grid);
        let estimates =
            analyze_routing_distance(&nets, &regions, &grid, &tech, None, &config);
        // One all-open region of 8 sites, two segments.
        assert_eq!(estimates.len(), 2);
        assert!(estimates.iter().all(|e| e.region_size == 8));
        // Distances are in microns (100 db units each).
        let seg1 = &estimates[0];
        // Segment 1 center (200, 0); closest site center (70, 100): 230 db.
        assert_eq!(seg1.distance_microns, 2.3);
        assert_eq!(seg1.site_centers, vec![Point::new(70, 100)]);
        assert_eq!(seg1.net_sigmas_from_mean, None);
    }

    #[test]
    fn undersized_regions_are_skipped() {
        let (lib, tech, config) = (test_library(), test_tech(), test_config());
        let critical: IndexSet<ArcStr> = [ArcStr::from("key_reg")].into_iter().collect();
        let nets = extract_critical_nets(&lib, &tech, &config, &critical).unwrap();

        let mut grid = small_grid();
        // Leave only a 2-site region open.
        for cell in [
            GridCell::new(0, 0),
            GridCell::new(0, 1),
            GridCell::new(0, 2),
            GridCell::new(0, 3),
            GridCell::new(1, 0),
            GridCell::new(1, 1),
        ] {
            grid.set_occupied(cell);
        }
        let regions = find_open_regions(&grid);
        let estimates =
            analyze_routing_distance(&nets, &regions, &grid, &tech, None, &config);
        assert!(estimates.is_empty());
    }
}

//! Critical nets and their segments.

use arcstr::ArcStr;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use geometry::dir::Dir;
use geometry::polygon::Polygon;
use geometry::rect::Rect;
use layout::{path_polygon, Element, Library};
use tech::Tech;

use crate::blockage::BlockageResult;
use crate::config::ScoreConfig;
use crate::error::{ScoreError, ScoreResult};

/// One wire segment of a critical net.
///
/// A segment wraps one flattened polygon plus its routing-layer identity,
/// the broad-phase search boxes derived from that layer's rules, the nearby
/// polygons gathered by the index, and (after scanning) the blockage
/// statistics.
#[derive(Debug, Clone)]
pub struct NetSegment {
    /// The full hierarchical net name.
    pub net_fullname: ArcStr,
    /// The net basename (last path component).
    pub net_basename: ArcStr,
    /// 1-based position of this segment within its net.
    pub ordinal: usize,
    /// The logical routing layer number.
    pub layer_num: usize,
    /// The routing layer name.
    pub layer_name: ArcStr,
    /// The wire direction.
    pub direction: Dir,
    /// The wire's footprint polygon.
    pub polygon: Polygon,
    /// Cached footprint bounding box.
    pub bbox: Rect,
    /// Same-layer broad-phase search box: the bbox expanded by the layer
    /// pitch.
    pub same_layer_search: Rect,
    /// Above-layer search box (bbox expanded by the above layer's minimum
    /// spacing minus one), when a routable layer exists above.
    pub above_search: Option<Rect>,
    /// Below-layer search box, when a routable layer exists below.
    pub below_search: Option<Rect>,
    /// Nearby same-layer polygons, filled by the index.
    pub nearby_same_layer: Vec<Polygon>,
    /// Nearby polygons one layer above, filled by the index.
    pub nearby_above: Vec<Polygon>,
    /// Nearby polygons one layer below, filled by the index.
    pub nearby_below: Vec<Polygon>,
    /// Scan statistics, filled by the blockage scanner.
    pub blockage: Option<BlockageResult>,
}

/// A security-critical net: a named signal and its wire segments.
#[derive(Debug, Clone)]
pub struct Net {
    /// The full hierarchical name, as annotated in the layout.
    pub fullname: ArcStr,
    /// The last path component of the name.
    pub basename: ArcStr,
    /// The net's wire segments, in layout order.
    pub segments: Vec<NetSegment>,
}

/// The basename a net annotation is matched by: the last `/`-separated
/// component with any bus suffix (`[3]`) stripped.
pub fn net_basename(fullname: &str) -> &str {
    let last = fullname.rsplit('/').next().unwrap_or(fullname);
    last.split('[').next().unwrap_or(last)
}

/// Extracts the critical nets from the top structure's annotated paths.
///
/// Only `Path` elements directly in the top structure are considered (vias
/// and lower-level geometry are boundaries, which carry no net annotation);
/// a path belongs to a critical net when its annotation's basename appears
/// in `critical`.
pub fn extract_critical_nets(
    library: &Library,
    tech: &Tech,
    config: &ScoreConfig,
    critical: &IndexSet<ArcStr>,
) -> ScoreResult<Vec<Net>> {
    let top = library
        .get(&config.top_cell)
        .ok_or_else(|| ScoreError::MissingTopStructure {
            name: config.top_cell.clone(),
        })?;

    let mut grouped: IndexMap<ArcStr, Vec<NetSegment>> = IndexMap::new();
    for elem in &top.elements {
        let Element::Path(path) = elem else {
            continue;
        };
        let Some(fullname) = &path.net else {
            continue;
        };
        let basename = net_basename(fullname);
        if !critical.contains(basename) {
            continue;
        }
        let Some(layer) = tech.routing_layer_for_gds(path.layer, path.datatype) else {
            return Err(ScoreError::UnroutedCriticalNet {
                net: fullname.clone(),
                gds_layer: path.layer,
                datatype: path.datatype,
            });
        };

        let polygon = path_polygon(path, &top.name)?;
        let bbox = polygon.bbox();
        let segments = grouped.entry(fullname.clone()).or_default();
        segments.push(NetSegment {
            net_fullname: fullname.clone(),
            net_basename: ArcStr::from(basename),
            ordinal: segments.len() + 1,
            layer_num: layer.number,
            layer_name: layer.name.clone(),
            direction: if path.endpoints[0].x == path.endpoints[1].x {
                Dir::Vert
            } else {
                Dir::Horiz
            },
            same_layer_search: bbox.expand_all(layer.pitch_db),
            above_search: tech
                .layer_above(layer.number)
                .map(|al| bbox.expand_all(al.min_spacing_db - 1)),
            below_search: tech
                .layer_below(layer.number)
                .map(|bl| bbox.expand_all(bl.min_spacing_db - 1)),
            polygon,
            bbox,
            nearby_same_layer: Vec::new(),
            nearby_above: Vec::new(),
            nearby_below: Vec::new(),
            blockage: None,
        });
    }

    if grouped.is_empty() {
        warn!("no critical nets located in the layout");
    }
    let nets: Vec<Net> = grouped
        .into_iter()
        .map(|(fullname, segments)| Net {
            basename: ArcStr::from(net_basename(&fullname)),
            fullname,
            segments,
        })
        .collect();
    for net in &nets {
        debug!(net = %net.fullname, segments = net.segments.len(), "critical net");
    }
    Ok(nets)
}

/// Summary statistics used by reports.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AttackSurface {
    /// Bounding-box perimeter, in database units.
    pub perimeter: i64,
    /// Twice the footprint area (top and bottom faces), in square database
    /// units.
    pub faces: f64,
}

impl NetSegment {
    /// The segment's exposed attack surface: its perimeter plus its top and
    /// bottom faces.
    pub fn attack_surface(&self) -> AttackSurface {
        AttackSurface {
            perimeter: self.bbox.perimeter(),
            faces: self.polygon.area() * 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_config, test_library, test_tech};

    #[test]
    fn basenames_strip_hierarchy_and_bus_bits() {
        assert_eq!(net_basename("core/alu/key_reg"), "key_reg");
        assert_eq!(net_basename("core/alu/key[3]"), "key");
        assert_eq!(net_basename("flat_net"), "flat_net");
    }

    #[test]
    fn critical_paths_become_segments() {
        let (lib, tech, config) = (test_library(), test_tech(), test_config());
        let critical: IndexSet<ArcStr> = [ArcStr::from("key_reg")].into_iter().collect();
        let nets = extract_critical_nets(&lib, &tech, &config, &critical).unwrap();
        assert_eq!(nets.len(), 1);
        let net = &nets[0];
        assert_eq!(net.basename, "key_reg");
        assert_eq!(net.segments.len(), 2);
        assert_eq!(net.segments[0].ordinal, 1);
        assert_eq!(net.segments[1].ordinal, 2);
        // metal1 wire: (0,-5)..(400,5) expanded by the 20-unit pitch.
        let seg = &net.segments[0];
        assert_eq!(seg.layer_name, "metal1");
        assert_eq!(seg.direction, Dir::Horiz);
        assert_eq!(seg.bbox, Rect::from_sides(0, -5, 400, 5));
        assert_eq!(seg.same_layer_search, Rect::from_sides(-20, -25, 420, 25));
        // metal2 exists above (spacing 10 db): expand by 9.
        assert_eq!(seg.above_search, Some(Rect::from_sides(-9, -14, 409, 14)));
        // Nothing below metal1.
        assert_eq!(seg.below_search, None);
        assert_eq!(net.segments[1].layer_name, "metal2");
        assert_eq!(net.segments[1].direction, Dir::Vert);
    }

    #[test]
    fn non_critical_and_unannotated_paths_are_skipped() {
        let (lib, tech, config) = (test_library(), test_tech(), test_config());
        let critical: IndexSet<ArcStr> = [ArcStr::from("unrelated")].into_iter().collect();
        let nets = extract_critical_nets(&lib, &tech, &config, &critical).unwrap();
        assert!(nets.is_empty());
    }
}

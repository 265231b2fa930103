//! Broad-phase layer/geometry index.
//!
//! One linear pass over the flattened top-level shapes classifies each
//! polygon into at most one of three candidate buckets per net segment:
//! same routing layer, one layer above, or one layer below, kept only when
//! its bounding box overlaps the segment's corresponding search box. The
//! narrow-phase (point and clip tests) happens later, in the blockage
//! scanner, over these much smaller sets.

use tracing::{debug, info};

use geometry::bbox::Bbox;
use layout::Library;
use tech::Tech;

use crate::config::ScoreConfig;
use crate::error::ScoreResult;
use crate::net::Net;

/// Gathers the nearby polygons of every critical net segment.
///
/// Flattens the top structure once; each shape on a routing layer is tested
/// against every segment's search boxes. Device and via geometry (no
/// routing layer) is skipped.
pub fn extract_nearby_polygons(
    library: &Library,
    tech: &Tech,
    config: &ScoreConfig,
    nets: &mut [Net],
) -> ScoreResult<()> {
    info!(top = %config.top_cell, "extracting polygons near critical nets");
    for shape in library.flatten(&config.top_cell)? {
        let shape = shape?;
        let Some(layer) = tech.routing_layer_for_gds(shape.layer, shape.datatype) else {
            continue;
        };
        let bbox = shape.polygon.bbox_rect();
        for net in nets.iter_mut() {
            for seg in net.segments.iter_mut() {
                if layer.number == seg.layer_num {
                    if bbox.overlaps(&seg.same_layer_search) {
                        seg.nearby_same_layer.push(shape.polygon.clone());
                    }
                } else if layer.number == seg.layer_num + 1 {
                    if let Some(search) = seg.above_search {
                        if bbox.overlaps(&search) {
                            seg.nearby_above.push(shape.polygon.clone());
                        }
                    }
                } else if layer.number + 1 == seg.layer_num {
                    if let Some(search) = seg.below_search {
                        if bbox.overlaps(&search) {
                            seg.nearby_below.push(shape.polygon.clone());
                        }
                    }
                }
            }
        }
    }
    for net in nets.iter() {
        for seg in &net.segments {
            debug!(
                net = %net.fullname,
                segment = seg.ordinal,
                same_layer = seg.nearby_same_layer.len(),
                above = seg.nearby_above.len(),
                below = seg.nearby_below.len(),
                "nearby polygons"
            );
        }
    }
    Ok(())
}

//! Windowed blockage scanning.
//!
//! For each critical net segment, the scanner measures how much of the
//! segment's attack surface an adjacent rogue wire could actually reach:
//! the four same-layer sides are probed along 1-D scan lines, the top and
//! bottom faces are rasterized into 2-D bitmaps, and in both cases a window
//! the size of the layer's rogue wire width slides across the occupancy
//! data. A window position counts as blocked when any probe inside it hit
//! neighboring metal, meaning an attacker cannot fit a spacing-compliant wire
//! through it.
//!
//! Sampling policy: probes sit on the pitch line (one routing track away
//! from the wire edge) and on the one-unit overlap line just outside the
//! edge, and polygon containment is boundary-inclusive, so geometry that
//! merely abuts a probe line still blocks it.

use std::fmt::Display;

use itertools::iproduct;
use serde::{Deserialize, Serialize};
use tracing::debug;

use geometry::contains::Contains;
use geometry::point::Point;
use geometry::polygon::Polygon;
use geometry::rect::Rect;
use tech::{RoutingLayer, Tech};

use crate::config::ScoreConfig;
use crate::error::{ScoreError, ScoreResult};
use crate::net::NetSegment;

/// A face of the scanned segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum ScanSide {
    /// The same-layer side toward positive y.
    North,
    /// The same-layer side toward positive x.
    East,
    /// The same-layer side toward negative y.
    South,
    /// The same-layer side toward negative x.
    West,
    /// The face toward the routing layer above.
    Top,
    /// The face toward the routing layer below.
    Bottom,
}

impl ScanSide {
    /// The four same-layer sides.
    pub const PERIMETER: [ScanSide; 4] =
        [ScanSide::North, ScanSide::East, ScanSide::South, ScanSide::West];
}

impl Display for ScanSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScanSide::North => "N",
            ScanSide::East => "E",
            ScanSide::South => "S",
            ScanSide::West => "W",
            ScanSide::Top => "T",
            ScanSide::Bottom => "B",
        };
        write!(f, "{s}")
    }
}

/// An open window found on an adjacent-layer face, in absolute chip
/// coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenWindow {
    /// The face the window was found on.
    pub side: ScanSide,
    /// The window's extent.
    pub rect: Rect,
}

/// Accumulated scan statistics for one net segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlockageResult {
    /// Same-layer window positions examined.
    pub same_layer_checked: u64,
    /// Same-layer window positions blocked.
    pub same_layer_blocked: u64,
    /// Adjacent-layer window positions examined.
    pub diff_layer_checked: u64,
    /// Adjacent-layer window positions blocked.
    pub diff_layer_blocked: u64,
    /// Faces with at least one fully open window.
    pub unblocked_sides: Vec<ScanSide>,
    /// Open adjacent-layer windows, for the routing-distance metric.
    pub open_windows: Vec<OpenWindow>,
}

impl BlockageResult {
    /// Blocked fraction of the same-layer perimeter, as a percentage.
    pub fn same_layer_percentage(&self) -> f64 {
        percentage(self.same_layer_blocked, self.same_layer_checked)
    }

    /// Blocked fraction of the adjacent-layer faces, as a percentage.
    pub fn diff_layer_percentage(&self) -> f64 {
        percentage(self.diff_layer_blocked, self.diff_layer_checked)
    }

    /// Blocked fraction across all scanned faces, as a percentage.
    pub fn weighted_percentage(&self) -> f64 {
        percentage(
            self.same_layer_blocked + self.diff_layer_blocked,
            self.same_layer_checked + self.diff_layer_checked,
        )
    }
}

fn percentage(blocked: u64, checked: u64) -> f64 {
    if checked == 0 {
        0.0
    } else {
        blocked as f64 / checked as f64 * 100.0
    }
}

/// Scans all reachable faces of one net segment.
///
/// Same-layer sides are always scanned; the top and bottom faces only when
/// a routable layer exists in that direction.
pub fn scan_blockage(
    segment: &NetSegment,
    tech: &Tech,
    config: &ScoreConfig,
) -> ScoreResult<BlockageResult> {
    let layer = tech
        .layer_by_number(segment.layer_num)
        .ok_or_else(|| ScoreError::Tech(tech::TechError::UnknownLayer {
            name: segment.layer_num.to_string(),
        }))?;

    let mut result = BlockageResult::default();
    for side in ScanSide::PERIMETER {
        let scan = scan_side(segment, layer, side, config.net_blockage_step);
        result.same_layer_checked += scan.checked;
        result.same_layer_blocked += scan.blocked;
        if scan.open {
            result.unblocked_sides.push(side);
        }
    }

    let faces = [
        (ScanSide::Top, tech.layer_above(segment.layer_num), &segment.nearby_above),
        (
            ScanSide::Bottom,
            tech.layer_below(segment.layer_num),
            &segment.nearby_below,
        ),
    ];
    for (side, adjacent, nearby) in faces {
        let Some(adjacent) = adjacent else {
            continue;
        };
        let scan = scan_face(segment, adjacent, nearby, config.net_blockage_step);
        result.diff_layer_checked += scan.checked;
        result.diff_layer_blocked += scan.blocked;
        if !scan.open_windows.is_empty() {
            result.unblocked_sides.push(side);
            result
                .open_windows
                .extend(scan.open_windows.into_iter().map(|rect| OpenWindow { side, rect }));
        }
    }

    debug!(
        net = %segment.net_fullname,
        segment = segment.ordinal,
        same_layer = %result.same_layer_percentage(),
        diff_layer = %result.diff_layer_percentage(),
        "blockage scanned"
    );
    Ok(result)
}

struct SideScan {
    checked: u64,
    blocked: u64,
    open: bool,
}

/// Scans one same-layer side.
///
/// Probe points step along the side at the configured increment, extended
/// past both corners by the rogue wire width so windows hanging off the
/// segment's ends are accounted for. Each step probes the pitch line and
/// the one-unit overlap line; a set bit means some nearby polygon covers
/// one of the probes.
fn scan_side(segment: &NetSegment, layer: &RoutingLayer, side: ScanSide, step: i64) -> SideScan {
    let step = step.max(1);
    let bbox = segment.bbox;
    let margin = layer.rogue_wire_width;
    // One routing track out from the wire edge.
    let pitch_offset = (layer.pitch_db - layer.min_width_db / 2).max(1);

    let (scan_from, scan_to) = match side {
        ScanSide::North | ScanSide::South => (bbox.left() - margin, bbox.right() + margin),
        _ => (bbox.bot() - margin, bbox.top() + margin),
    };
    let probe = |coord: i64, offset: i64| -> Point {
        match side {
            ScanSide::North => Point::new(coord, bbox.top() + offset),
            ScanSide::South => Point::new(coord, bbox.bot() - offset),
            ScanSide::East => Point::new(bbox.right() + offset, coord),
            ScanSide::West => Point::new(bbox.left() - offset, coord),
            _ => unreachable!("same-layer scan on adjacent-layer face"),
        }
    };

    let samples = ((scan_to - scan_from) / step + 1) as usize;
    let mut occupancy = vec![false; samples];
    for (i, slot) in occupancy.iter_mut().enumerate() {
        let coord = scan_from + i as i64 * step;
        let far = probe(coord, pitch_offset);
        let near = probe(coord, 1);
        *slot = segment
            .nearby_same_layer
            .iter()
            .any(|p| p.contains(&far).is_inside() || p.contains(&near).is_inside());
    }

    slide_window(&occupancy, window_samples(layer.rogue_wire_width, step))
}

/// Slides a window over a 1-D occupancy bitmap, counting blocked positions.
fn slide_window(occupancy: &[bool], window: usize) -> SideScan {
    if occupancy.len() < window {
        return SideScan {
            checked: 0,
            blocked: 0,
            open: false,
        };
    }
    let positions = occupancy.len() - window + 1;
    let mut set_bits = occupancy[..window].iter().filter(|b| **b).count();
    let mut blocked = 0u64;
    let mut open = false;
    for start in 0..positions {
        if start > 0 {
            set_bits -= occupancy[start - 1] as usize;
            set_bits += occupancy[start + window - 1] as usize;
        }
        if set_bits > 0 {
            blocked += 1;
        } else {
            open = true;
        }
    }
    SideScan {
        checked: positions as u64,
        blocked,
        open,
    }
}

/// The window width in samples: the rogue wire width divided by the step.
fn window_samples(rogue_wire_width: i64, step: i64) -> usize {
    ((rogue_wire_width / step).max(1)) as usize
}

struct FaceScan {
    checked: u64,
    blocked: u64,
    open_windows: Vec<Rect>,
}

/// Scans one adjacent-layer face.
///
/// The segment's footprint, extended by the adjacent layer's minimum
/// spacing, is rasterized into a 2-D bitmap; nearby adjacent-layer polygons
/// color it by point sampling. A square window with the adjacent layer's
/// rogue wire width on each edge (the minimum legal open extent in either
/// axis) then slides across the bitmap; open windows are translated back to
/// absolute chip coordinates.
fn scan_face(
    segment: &NetSegment,
    adjacent: &RoutingLayer,
    nearby: &[Polygon],
    step: i64,
) -> FaceScan {
    let step = step.max(1);
    let footprint = segment.bbox.expand_all(adjacent.min_spacing_db);
    let nx = (footprint.width() / step + 1) as usize;
    let ny = (footprint.height() / step + 1) as usize;

    // Scratch bitmap, dropped at the end of this segment's scan.
    let mut occupancy = vec![false; nx * ny];
    for (iy, ix) in iproduct!(0..ny, 0..nx) {
        let p = Point::new(
            footprint.left() + ix as i64 * step,
            footprint.bot() + iy as i64 * step,
        );
        if nearby.iter().any(|poly| poly.contains(&p).is_inside()) {
            occupancy[iy * nx + ix] = true;
        }
    }

    // Summed-area table so each window test is O(1).
    let mut sums = vec![0u32; (nx + 1) * (ny + 1)];
    for iy in 0..ny {
        for ix in 0..nx {
            sums[(iy + 1) * (nx + 1) + ix + 1] = occupancy[iy * nx + ix] as u32
                + sums[iy * (nx + 1) + ix + 1]
                + sums[(iy + 1) * (nx + 1) + ix]
                - sums[iy * (nx + 1) + ix];
        }
    }
    let window_sum = |x0: usize, y0: usize, w: usize| -> u32 {
        let (x1, y1) = (x0 + w, y0 + w);
        sums[y1 * (nx + 1) + x1] + sums[y0 * (nx + 1) + x0]
            - sums[y0 * (nx + 1) + x1]
            - sums[y1 * (nx + 1) + x0]
    };

    let w = window_samples(adjacent.rogue_wire_width, step);
    if nx < w || ny < w {
        return FaceScan {
            checked: 0,
            blocked: 0,
            open_windows: Vec::new(),
        };
    }
    let (px, py) = (nx - w + 1, ny - w + 1);
    let extent = (w as i64 - 1) * step;
    let mut blocked = 0u64;
    let mut open_windows = Vec::new();
    for (iy, ix) in iproduct!(0..py, 0..px) {
        if window_sum(ix, iy, w) > 0 {
            blocked += 1;
        } else {
            let x0 = footprint.left() + ix as i64 * step;
            let y0 = footprint.bot() + iy as i64 * step;
            open_windows.push(Rect::from_sides(x0, y0, x0 + extent, y0 + extent));
        }
    }

    FaceScan {
        checked: (px * py) as u64,
        blocked,
        open_windows,
    }
}

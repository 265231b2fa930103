//! Weiler–Atherton polygon clipping.
//!
//! Computes the intersection of two simple counter-clockwise polygons by
//! augmenting both vertex rings with their pairwise edge crossings, then
//! walking the subject ring and switching to the clip ring (and back) at
//! each crossing.

use std::collections::{HashMap, HashSet};

use crate::contains::Contains;
use crate::error::{GeometryError, GeometryResult};
use crate::point::Point;
use crate::polygon::Polygon;
use crate::segment::Segment;

/// A vertex of an augmented ring.
#[derive(Debug, Clone, Copy)]
struct Vert {
    point: Point,
    /// Index of the same point in the other ring, when this is a crossing.
    neighbor: Option<usize>,
    /// Subject ring only: the subject enters the clip region here.
    entering: bool,
}

/// Clips `subject` against `clip`, returning the polygon(s) covering
/// `subject ∩ clip`.
///
/// Both inputs must be simple, counter-clockwise rings; inputs are never
/// mutated and each result is a newly built polygon. Returns an empty vector
/// when the polygons do not overlap.
///
/// Touching-but-not-crossing contacts do not produce boundary transitions,
/// and colinear overlapping edges contribute no crossing vertices (their
/// lines are parallel, so Cramer's rule reports no intersection point).
///
/// # Example
///
/// ```
/// # use geometry::prelude::*;
/// let subject = Polygon::from_rect(Rect::from_sides(0, 0, 4, 4));
/// let clip = Polygon::from_rect(Rect::from_sides(1, -2, 5, 5));
/// let out = geometry::clip::clip(&subject, &clip).unwrap();
/// assert_eq!(out.len(), 1);
/// assert_eq!(out[0].area(), 12.0);
/// ```
///
/// # Errors
///
/// Fails with [`GeometryError::ClipDivergence`] if the ring walk does not
/// terminate within a bound proportional to the total vertex count, which
/// indicates a malformed or self-intersecting input.
pub fn clip(subject: &Polygon, clip: &Polygon) -> GeometryResult<Vec<Polygon>> {
    // Broad phase: disjoint bounding boxes cannot intersect.
    if !subject.bbox().overlaps(&clip.bbox()) {
        return Ok(Vec::new());
    }

    let (sring, cring) = augment_rings(subject, clip);

    // A crossing is usable only if it was matched in both rings.
    let has_entering = sring
        .iter()
        .any(|v| v.neighbor.is_some() && v.entering);

    if !has_entering {
        // No transitions into the clip region: either one polygon contains
        // the other, or they do not overlap at all.
        if subject
            .vertices()
            .iter()
            .all(|v| clip.contains(v).is_inside())
        {
            return Ok(vec![subject.clone()]);
        }
        if clip
            .vertices()
            .iter()
            .all(|v| subject.contains(v).is_inside())
        {
            return Ok(vec![clip.clone()]);
        }
        return Ok(Vec::new());
    }

    walk_rings(&sring, &cring)
}

/// Builds the augmented subject and clip rings: original vertices plus every
/// pairwise edge crossing, inserted in order of distance from each edge's
/// start. A crossing that coincides with an existing vertex is not
/// duplicated; the vertex itself is classified as the crossing.
fn augment_rings(subject: &Polygon, clip: &Polygon) -> (Vec<Vert>, Vec<Vert>) {
    let svs = subject.vertices();
    let cvs = clip.vertices();

    let mut sub_hits: Vec<Vec<Point>> = vec![Vec::new(); svs.len()];
    let mut clip_hits: Vec<Vec<Point>> = vec![Vec::new(); cvs.len()];
    let mut crossings: HashSet<Point> = HashSet::new();

    for (i, se) in ring_edges(svs).enumerate() {
        for (j, ce) in ring_edges(cvs).enumerate() {
            if let Some(p) = se.intersection(&ce) {
                if !sub_hits[i].contains(&p) {
                    sub_hits[i].push(p);
                }
                if !clip_hits[j].contains(&p) {
                    clip_hits[j].push(p);
                }
                crossings.insert(p);
            }
        }
    }

    let spoints = insert_hits(svs, &sub_hits);
    let cpoints = insert_hits(cvs, &clip_hits);

    // Pair crossings across the rings by coordinate.
    let cindex: HashMap<Point, usize> = cpoints
        .iter()
        .enumerate()
        .filter(|(_, p)| crossings.contains(*p))
        .map(|(i, p)| (*p, i))
        .collect();

    let mut sring: Vec<Vert> = spoints
        .iter()
        .map(|p| Vert {
            point: *p,
            neighbor: cindex.get(p).copied(),
            entering: false,
        })
        .collect();

    let sindex: HashMap<Point, usize> = sring
        .iter()
        .enumerate()
        .filter(|(_, v)| v.neighbor.is_some())
        .map(|(i, v)| (v.point, i))
        .collect();

    let cring: Vec<Vert> = cpoints
        .iter()
        .map(|p| Vert {
            point: *p,
            neighbor: sindex.get(p).copied(),
            entering: false,
        })
        .collect();

    classify_entering(&mut sring, clip);
    (sring, cring)
}

/// Iterates the edges of an open ring, closing it implicitly.
fn ring_edges(vertices: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| Segment::new(vertices[i], vertices[(i + 1) % n]))
}

/// Splices each edge's crossing points into the ring, ordered by distance
/// from the edge start. Points equal to either edge endpoint are skipped;
/// the endpoint itself stands in for the crossing.
fn insert_hits(vertices: &[Point], hits: &[Vec<Point>]) -> Vec<Point> {
    let n = vertices.len();
    let mut out = Vec::with_capacity(n + hits.iter().map(Vec::len).sum::<usize>());
    for i in 0..n {
        let start = vertices[i];
        let end = vertices[(i + 1) % n];
        out.push(start);
        let mut edge_hits: Vec<Point> = hits[i]
            .iter()
            .copied()
            .filter(|p| *p != start && *p != end)
            .collect();
        edge_hits.sort_by(|a, b| {
            start
                .distance(*a)
                .partial_cmp(&start.distance(*b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for p in edge_hits {
            if out.last() != Some(&p) {
                out.push(p);
            }
        }
    }
    out
}

/// Classifies every crossing on the subject ring as entering or leaving the
/// clip region.
///
/// Non-crossing vertices get an inside/outside status from a point test;
/// crossings look ahead to the next classified vertex instead of testing a
/// point that sits exactly on the clip boundary, toggling once per crossing
/// passed along the way.
fn classify_entering(sring: &mut [Vert], clip: &Polygon) {
    let n = sring.len();
    let status: Vec<Option<bool>> = sring
        .iter()
        .map(|v| {
            if v.neighbor.is_some() {
                None
            } else {
                Some(clip.contains(&v.point).is_inside())
            }
        })
        .collect();

    for k in 0..n {
        if sring[k].neighbor.is_none() {
            continue;
        }
        let mut toggles = 0usize;
        for step in 1..n {
            let j = (k + step) % n;
            match status[j] {
                Some(inside) => {
                    sring[k].entering = if toggles % 2 == 0 { inside } else { !inside };
                    break;
                }
                None => toggles += 1,
            }
        }
    }
}

/// Traces the output ring(s): start at an unconsumed entering crossing, walk
/// the subject ring forward, and jump to the clip ring (and back) at each
/// crossing until arriving back at the start.
fn walk_rings(sring: &[Vert], cring: &[Vert]) -> GeometryResult<Vec<Polygon>> {
    let bound = 4 * (sring.len() + cring.len()) + 8;
    let mut consumed: HashSet<Point> = HashSet::new();
    let mut results = Vec::new();

    for seed in 0..sring.len() {
        let start = sring[seed];
        if start.neighbor.is_none() || !start.entering || consumed.contains(&start.point) {
            continue;
        }

        let mut ring_pts: Vec<Point> = vec![start.point];
        consumed.insert(start.point);

        let mut on_subject = true;
        let mut idx = (seed + 1) % sring.len();
        let mut iterations = 0usize;
        loop {
            iterations += 1;
            if iterations > bound {
                return Err(GeometryError::ClipDivergence { bound });
            }
            let ring = if on_subject { sring } else { cring };
            let v = ring[idx];
            if v.point == start.point {
                break;
            }
            if ring_pts.last() != Some(&v.point) {
                ring_pts.push(v.point);
            }
            match v.neighbor {
                Some(n) => {
                    consumed.insert(v.point);
                    let other_len = if on_subject { cring.len() } else { sring.len() };
                    on_subject = !on_subject;
                    idx = (n + 1) % other_len;
                }
                None => idx = (idx + 1) % ring.len(),
            }
        }

        if let Some(poly) = close_ring(ring_pts) {
            results.push(poly);
        }
    }

    Ok(results)
}

/// Closes a traced ring into a [`Polygon`], discarding degenerate rings with
/// fewer than 3 distinct vertices.
fn close_ring(mut pts: Vec<Point>) -> Option<Polygon> {
    while pts.len() > 1 && pts.last() == pts.first() {
        pts.pop();
    }
    let mut distinct = pts.clone();
    distinct.sort();
    distinct.dedup();
    if distinct.len() < 3 {
        return None;
    }
    let first = pts[0];
    pts.push(first);
    Polygon::new(pts).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::is_ccw;
    use crate::rect::Rect;

    fn rect_poly(left: i64, bot: i64, right: i64, top: i64) -> Polygon {
        Polygon::from_rect(Rect::from_sides(left, bot, right, top))
    }

    fn vertex_set(poly: &Polygon) -> Vec<Point> {
        let mut v = poly.vertices().to_vec();
        v.sort();
        v
    }

    #[test]
    fn subject_inside_clip_returns_subject() {
        let subject = rect_poly(1, 1, 3, 3);
        let clip_poly = rect_poly(0, 0, 10, 10);
        let out = clip(&subject, &clip_poly).unwrap();
        assert_eq!(out, vec![subject]);
    }

    #[test]
    fn clip_inside_subject_returns_clip() {
        let subject = rect_poly(0, 0, 10, 10);
        let clip_poly = rect_poly(4, 4, 6, 6);
        let out = clip(&subject, &clip_poly).unwrap();
        assert_eq!(out, vec![clip_poly]);
    }

    #[test]
    fn disjoint_rectangles_return_empty() {
        let subject = rect_poly(0, 0, 4, 4);
        let clip_poly = rect_poly(10, 10, 14, 14);
        assert_eq!(clip(&subject, &clip_poly).unwrap(), Vec::new());
    }

    #[test]
    fn identical_rectangles_return_equal_area() {
        let subject = rect_poly(2, 2, 8, 8);
        let out = clip(&subject, &subject.clone()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].area(), subject.area());
    }

    #[test]
    fn partial_overlap_produces_the_shared_rectangle() {
        // Subject square [(0,0),(4,0),(4,4),(0,4)], clip [(1,-2),(5,-2),(5,5),(1,5)].
        let subject = rect_poly(0, 0, 4, 4);
        let clip_poly = rect_poly(1, -2, 5, 5);
        let out = clip(&subject, &clip_poly).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].area(), 12.0);
        assert_eq!(vertex_set(&out[0]), vertex_set(&rect_poly(1, 0, 4, 4)));
        assert!(is_ccw(out[0].points()));
    }

    #[test]
    fn corner_overlap_produces_the_corner() {
        let subject = rect_poly(0, 0, 4, 4);
        let clip_poly = rect_poly(2, 2, 6, 6);
        let out = clip(&subject, &clip_poly).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].area(), 4.0);
        assert_eq!(vertex_set(&out[0]), vertex_set(&rect_poly(2, 2, 4, 4)));
    }

    #[test]
    fn cross_bars_intersect_in_their_core() {
        let horiz = rect_poly(0, 4, 12, 8);
        let vert = rect_poly(4, 0, 8, 12);
        let out = clip(&horiz, &vert).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(vertex_set(&out[0]), vertex_set(&rect_poly(4, 4, 8, 8)));
    }

    #[test]
    fn u_shape_clips_into_two_pieces() {
        // A U: the 10x10 square with the slot x in [4,6], y in [2,10] removed.
        let subject = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(6, 10),
            Point::new(6, 2),
            Point::new(4, 2),
            Point::new(4, 10),
            Point::new(0, 10),
            Point::new(0, 0),
        ])
        .unwrap();
        let clip_poly = rect_poly(0, 6, 10, 12);
        let mut out = clip(&subject, &clip_poly).unwrap();
        assert_eq!(out.len(), 2);
        out.sort_by_key(|p| p.bbox().left());
        assert_eq!(vertex_set(&out[0]), vertex_set(&rect_poly(0, 6, 4, 10)));
        assert_eq!(vertex_set(&out[1]), vertex_set(&rect_poly(6, 6, 10, 10)));
    }

    #[test]
    fn touching_rectangles_share_no_area() {
        let subject = rect_poly(0, 0, 4, 4);
        let clip_poly = rect_poly(4, 0, 8, 4);
        let out = clip(&subject, &clip_poly).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let subject = rect_poly(0, 0, 4, 4);
        let clip_poly = rect_poly(1, -2, 5, 5);
        let (s0, c0) = (subject.clone(), clip_poly.clone());
        let _ = clip(&subject, &clip_poly).unwrap();
        assert_eq!(subject, s0);
        assert_eq!(clip_poly, c0);
    }
}

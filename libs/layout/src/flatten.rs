//! Depth-first hierarchy flattening.

use arcstr::ArcStr;
use tracing::trace;

use geometry::point::Point;
use geometry::polygon::Polygon;
use geometry::rect::Rect;
use geometry::transform::{Transform, Transformation};

use crate::element::{Element, Path};
use crate::error::{LayoutError, LayoutResult};
use crate::library::{Library, Structure};

/// The maximum supported reference nesting depth.
///
/// Real hierarchies are a handful of levels deep; hitting this bound means
/// the reference graph almost certainly contains a cycle.
pub const MAX_REF_DEPTH: usize = 64;

/// A flattened leaf shape: a polygon in top-level coordinates plus the layer
/// identity of the element it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    /// The GDSII layer number.
    pub layer: i16,
    /// The GDSII datatype.
    pub datatype: i16,
    /// The net annotation, if the source element carried one.
    pub net: Option<ArcStr>,
    /// The transform-applied polygon.
    pub polygon: Polygon,
}

/// One level of the depth-first walk.
enum Frame<'a> {
    /// Partway through a structure's element list.
    Structure {
        structure: &'a Structure,
        index: usize,
        trans: Transformation,
        depth: usize,
    },
    /// Partway through expanding an array reference.
    Array {
        target: &'a Structure,
        outer: Transformation,
        rows: i64,
        cols: i64,
        row_pitch: i64,
        col_pitch: i64,
        row: i64,
        col: i64,
        depth: usize,
    },
}

/// A pull-based iterator over the flattened shapes of one structure.
///
/// Consumption order is depth-first, pre-order over the reference graph;
/// array cells expand column-fastest. The iterator is finite and not
/// restartable; create a new one (via [`Library::flatten`]) to walk again.
/// The first error ends the iteration.
pub struct Flattener<'a> {
    library: &'a Library,
    stack: Vec<Frame<'a>>,
    ignored: Vec<ArcStr>,
    done: bool,
}

impl<'a> Flattener<'a> {
    /// Creates a flattener rooted at the structure named `top`.
    pub(crate) fn new(library: &'a Library, top: &str) -> LayoutResult<Self> {
        Self::with_ignored(library, top, Vec::new())
    }

    /// Creates a flattener that skips references to the named structures
    /// (used to leave fill cells out of device-layer walks).
    pub(crate) fn with_ignored(
        library: &'a Library,
        top: &str,
        ignored: Vec<ArcStr>,
    ) -> LayoutResult<Self> {
        let structure =
            library
                .get(top)
                .ok_or_else(|| LayoutError::UnknownStructureReference {
                    structure: library.name.clone(),
                    target: ArcStr::from(top),
                })?;
        trace!(top = %structure.name, "flattening structure");
        Ok(Self {
            library,
            stack: vec![Frame::Structure {
                structure,
                index: 0,
                trans: Transformation::identity(),
                depth: 0,
            }],
            ignored,
            done: false,
        })
    }

    fn is_ignored(&self, name: &ArcStr) -> bool {
        self.ignored.iter().any(|n| n == name)
    }

    fn resolve(&self, from: &Structure, target: &ArcStr) -> LayoutResult<&'a Structure> {
        self.library
            .get(target)
            .ok_or_else(|| LayoutError::UnknownStructureReference {
                structure: from.name.clone(),
                target: target.clone(),
            })
    }

    fn fail(&mut self, err: LayoutError) -> Option<LayoutResult<Shape>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for Flattener<'_> {
    type Item = LayoutResult<Shape>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let frame = self.stack.last_mut()?;
            match frame {
                Frame::Structure {
                    structure,
                    index,
                    trans,
                    depth,
                } => {
                    if *index >= structure.elements.len() {
                        self.stack.pop();
                        continue;
                    }
                    let structure = *structure;
                    let trans = *trans;
                    let depth = *depth;
                    let elem = &structure.elements[*index];
                    *index += 1;

                    match elem {
                        Element::Path(path) => {
                            let poly = match path_polygon(path, &structure.name) {
                                Ok(poly) => poly,
                                Err(e) => return self.fail(e),
                            };
                            return Some(Ok(Shape {
                                layer: path.layer,
                                datatype: path.datatype,
                                net: path.net.clone(),
                                polygon: poly.transform(trans),
                            }));
                        }
                        Element::Boundary(boundary) => {
                            let poly = match Polygon::new(boundary.points.clone()) {
                                Ok(poly) => poly.into_ccw(),
                                Err(source) => {
                                    return self.fail(LayoutError::InvalidBoundary {
                                        structure: structure.name.clone(),
                                        source,
                                    })
                                }
                            };
                            return Some(Ok(Shape {
                                layer: boundary.layer,
                                datatype: boundary.datatype,
                                net: None,
                                polygon: poly.transform(trans),
                            }));
                        }
                        Element::SRef(sref) => {
                            if self.is_ignored(&sref.target) {
                                continue;
                            }
                            if depth + 1 > MAX_REF_DEPTH {
                                return self.fail(LayoutError::CircularReference {
                                    structure: structure.name.clone(),
                                    depth: MAX_REF_DEPTH,
                                });
                            }
                            let target = match self.resolve(structure, &sref.target) {
                                Ok(t) => t,
                                Err(e) => return self.fail(e),
                            };
                            let child =
                                Transformation::from_opts(sref.origin, sref.reflect_x, sref.rotation);
                            self.stack.push(Frame::Structure {
                                structure: target,
                                index: 0,
                                trans: Transformation::cascade(trans, child),
                                depth: depth + 1,
                            });
                        }
                        Element::ARef(aref) => {
                            if self.is_ignored(&aref.target) {
                                continue;
                            }
                            if depth + 1 > MAX_REF_DEPTH {
                                return self.fail(LayoutError::CircularReference {
                                    structure: structure.name.clone(),
                                    depth: MAX_REF_DEPTH,
                                });
                            }
                            let target = match self.resolve(structure, &aref.target) {
                                Ok(t) => t,
                                Err(e) => return self.fail(e),
                            };
                            let outer = Transformation::cascade(
                                trans,
                                Transformation::from_opts(
                                    aref.origin,
                                    aref.reflect_x,
                                    aref.rotation,
                                ),
                            );
                            // Anchor displacements are measured from the
                            // array origin in the array's local frame.
                            let col_pitch = (aref.col_anchor.x - aref.origin.x) / aref.cols;
                            let row_pitch = (aref.row_anchor.y - aref.origin.y) / aref.rows;
                            self.stack.push(Frame::Array {
                                target,
                                outer,
                                rows: aref.rows,
                                cols: aref.cols,
                                row_pitch,
                                col_pitch,
                                row: 0,
                                col: 0,
                                depth: depth + 1,
                            });
                        }
                    }
                }
                Frame::Array {
                    target,
                    outer,
                    rows,
                    cols,
                    row_pitch,
                    col_pitch,
                    row,
                    col,
                    depth,
                } => {
                    if *row >= *rows {
                        self.stack.pop();
                        continue;
                    }
                    let cell = Transformation::translate(*col * *col_pitch, *row * *row_pitch);
                    let trans = Transformation::cascade(*outer, cell);
                    let target = *target;
                    let depth = *depth;
                    *col += 1;
                    if *col >= *cols {
                        *col = 0;
                        *row += 1;
                    }
                    self.stack.push(Frame::Structure {
                        structure: target,
                        index: 0,
                        trans,
                        depth,
                    });
                }
            }
        }
    }
}

/// Builds the rectangle polygon covering a Manhattan path.
///
/// The wire spans half the width on each side of its centerline; square and
/// custom end styles additionally extend half the width past each endpoint.
///
/// # Errors
///
/// Fails with [`LayoutError::NonManhattanPath`] when the centerline is
/// neither horizontal nor vertical.
pub fn path_polygon(path: &Path, structure: &ArcStr) -> LayoutResult<Polygon> {
    let [p1, p2] = path.endpoints;
    let half = path.width / 2;
    let rect = if p1.x == p2.x {
        let (mut lo, mut hi) = (p1.y.min(p2.y), p1.y.max(p2.y));
        if path.style.extends_ends() {
            lo -= half;
            hi += half;
        }
        Rect::from_sides(p1.x - half, lo, p1.x + half, hi)
    } else if p1.y == p2.y {
        let (mut lo, mut hi) = (p1.x.min(p2.x), p1.x.max(p2.x));
        if path.style.extends_ends() {
            lo -= half;
            hi += half;
        }
        Rect::from_sides(lo, p1.y - half, hi, p1.y + half)
    } else {
        return Err(LayoutError::NonManhattanPath {
            structure: structure.clone(),
            x1: p1.x,
            y1: p1.y,
            x2: p2.x,
            y2: p2.y,
        });
    };
    Ok(Polygon::from_rect(rect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ArrayRef, Boundary, PathStyle, StructRef};
    use geometry::bbox::Bbox;
    use geometry::polygon::is_ccw;
    use geometry::transform::Rotation;

    fn square_boundary(layer: i16, size: i64) -> Element {
        Element::Boundary(Boundary {
            layer,
            datatype: 0,
            points: vec![
                Point::new(0, 0),
                Point::new(size, 0),
                Point::new(size, size),
                Point::new(0, size),
                Point::new(0, 0),
            ],
        })
    }

    fn library_with_unit() -> Library {
        let mut lib = Library::new("test");
        let mut unit = Structure::new("unit");
        unit.elements.push(square_boundary(7, 2));
        lib.insert(unit).unwrap();
        lib
    }

    fn collect(lib: &Library, top: &str) -> Vec<Shape> {
        lib.flatten(top)
            .unwrap()
            .collect::<LayoutResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn leaf_boundary_flattens_in_place() {
        let lib = library_with_unit();
        let shapes = collect(&lib, "unit");
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].layer, 7);
        assert_eq!(shapes[0].polygon.bbox(), Rect::from_sides(0, 0, 2, 2));
    }

    #[test]
    fn sref_applies_reflect_rotate_translate() {
        let mut lib = library_with_unit();
        let mut top = Structure::new("top");
        top.elements.push(Element::SRef(StructRef {
            target: ArcStr::from("unit"),
            origin: Point::new(10, 0),
            reflect_x: false,
            rotation: Rotation::R90,
        }));
        top.elements.push(Element::SRef(StructRef {
            target: ArcStr::from("unit"),
            origin: Point::new(5, 5),
            reflect_x: true,
            rotation: Rotation::R0,
        }));
        lib.insert(top).unwrap();

        let shapes = collect(&lib, "top");
        assert_eq!(shapes.len(), 2);
        // (0..2, 0..2) rotated 90 CCW becomes (-2..0, 0..2), then shifts by (10, 0).
        assert_eq!(shapes[0].polygon.bbox(), Rect::from_sides(8, 0, 10, 2));
        // Reflection drops the square below the x-axis before the shift.
        assert_eq!(shapes[1].polygon.bbox(), Rect::from_sides(5, 3, 7, 5));
        assert!(shapes.iter().all(|s| is_ccw(s.polygon.points())));
    }

    #[test]
    fn aref_expands_rows_and_columns() {
        let mut lib = Library::new("test");
        let mut unit = Structure::new("unit");
        unit.elements.push(square_boundary(3, 1));
        lib.insert(unit).unwrap();
        let mut top = Structure::new("top");
        top.elements.push(Element::ARef(ArrayRef {
            target: ArcStr::from("unit"),
            rows: 2,
            cols: 3,
            origin: Point::new(0, 0),
            col_anchor: Point::new(6, 0),
            row_anchor: Point::new(0, 4),
            reflect_x: false,
            rotation: Rotation::R0,
        }));
        lib.insert(top).unwrap();

        let shapes = collect(&lib, "top");
        let bboxes: Vec<Rect> = shapes.iter().map(|s| s.polygon.bbox()).collect();
        assert_eq!(
            bboxes,
            vec![
                Rect::from_sides(0, 0, 1, 1),
                Rect::from_sides(2, 0, 3, 1),
                Rect::from_sides(4, 0, 5, 1),
                Rect::from_sides(0, 2, 1, 3),
                Rect::from_sides(2, 2, 3, 3),
                Rect::from_sides(4, 2, 5, 3),
            ]
        );
    }

    #[test]
    fn nested_references_compose_innermost_first() {
        let mut lib = library_with_unit();
        let mut mid = Structure::new("mid");
        mid.elements.push(Element::SRef(StructRef {
            target: ArcStr::from("unit"),
            origin: Point::new(1, 0),
            reflect_x: false,
            rotation: Rotation::R0,
        }));
        lib.insert(mid).unwrap();
        let mut top = Structure::new("top");
        top.elements.push(Element::SRef(StructRef {
            target: ArcStr::from("mid"),
            origin: Point::new(0, 10),
            reflect_x: false,
            rotation: Rotation::R90,
        }));
        lib.insert(top).unwrap();

        let shapes = collect(&lib, "top");
        // Inner shift lands the square at (1..3, 0..2); the outer R90 maps
        // that to (-2..0, 1..3), then shifts up by 10.
        assert_eq!(shapes[0].polygon.bbox(), Rect::from_sides(-2, 11, 0, 13));
    }

    #[test]
    fn path_styles_control_end_extension() {
        let mut lib = Library::new("test");
        let mut cell = Structure::new("wires");
        for (style, layer) in [(PathStyle::Flush, 1), (PathStyle::Square, 2)] {
            cell.elements.push(Element::Path(Path {
                layer,
                datatype: 0,
                width: 4,
                style,
                endpoints: [Point::new(0, 0), Point::new(10, 0)],
                net: None,
            }));
        }
        lib.insert(cell).unwrap();

        let shapes = collect(&lib, "wires");
        assert_eq!(shapes[0].polygon.bbox(), Rect::from_sides(0, -2, 10, 2));
        assert_eq!(shapes[1].polygon.bbox(), Rect::from_sides(-2, -2, 12, 2));
    }

    #[test]
    fn diagonal_paths_are_rejected() {
        let mut lib = Library::new("test");
        let mut cell = Structure::new("bad");
        cell.elements.push(Element::Path(Path {
            layer: 1,
            datatype: 0,
            width: 2,
            style: PathStyle::Flush,
            endpoints: [Point::new(0, 0), Point::new(5, 5)],
            net: None,
        }));
        lib.insert(cell).unwrap();

        let mut iter = lib.flatten("bad").unwrap();
        assert!(matches!(
            iter.next(),
            Some(Err(LayoutError::NonManhattanPath { .. }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn unknown_references_are_reported() {
        let mut lib = Library::new("test");
        let mut top = Structure::new("top");
        top.elements.push(Element::SRef(StructRef {
            target: ArcStr::from("ghost"),
            origin: Point::zero(),
            reflect_x: false,
            rotation: Rotation::R0,
        }));
        lib.insert(top).unwrap();

        assert!(matches!(
            lib.flatten("missing"),
            Err(LayoutError::UnknownStructureReference { .. })
        ));
        let mut iter = lib.flatten("top").unwrap();
        assert!(matches!(
            iter.next(),
            Some(Err(LayoutError::UnknownStructureReference { .. }))
        ));
    }

    #[test]
    fn self_reference_hits_the_depth_bound() {
        let mut lib = Library::new("test");
        let mut cell = Structure::new("ouroboros");
        cell.elements.push(Element::SRef(StructRef {
            target: ArcStr::from("ouroboros"),
            origin: Point::new(1, 1),
            reflect_x: false,
            rotation: Rotation::R0,
        }));
        lib.insert(cell).unwrap();

        let result: LayoutResult<Vec<_>> = lib.flatten("ouroboros").unwrap().collect();
        assert!(matches!(
            result,
            Err(LayoutError::CircularReference { .. })
        ));
    }
}

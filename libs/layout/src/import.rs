//! Conversion from [`gds21`] structures into the layout model.
//!
//! The conversion enforces this tool's support whitelist up front: only
//! reflection about the x-axis, rotations on the 90-degree grid, unit
//! magnification, Manhattan two-point paths with end styles 0/2/4, and
//! boundary/path/reference elements. Anything else is a typed error, so the
//! flattener never has to re-validate a transform.

use arcstr::ArcStr;
use tracing::{span, trace, Level};

use geometry::point::Point;
use geometry::polygon::Polygon;
use geometry::transform::Rotation;

use crate::element::{ArrayRef, Boundary, Element, Path, PathStyle, StructRef};
use crate::error::{LayoutError, LayoutResult};
use crate::library::{Library, Structure};

/// Reads a GDSII file and imports it into a [`Library`].
pub fn import_gds(path: impl AsRef<std::path::Path>) -> LayoutResult<Library> {
    let gdslib = gds21::GdsLibrary::load(path)?;
    import_library(&gdslib)
}

/// Imports an in-memory [`gds21::GdsLibrary`] into a [`Library`].
pub fn import_library(gdslib: &gds21::GdsLibrary) -> LayoutResult<Library> {
    let span = span!(Level::INFO, "gds_import", library = %gdslib.name);
    let _guard = span.enter();

    let mut lib = Library::new(ArcStr::from(gdslib.name.as_str()));
    for strukt in &gdslib.structs {
        lib.insert(import_struct(strukt)?)?;
    }
    trace!(structures = lib.len(), "import complete");
    Ok(lib)
}

fn import_struct(strukt: &gds21::GdsStruct) -> LayoutResult<Structure> {
    let span = span!(Level::DEBUG, "structure", name = %strukt.name);
    let _guard = span.enter();

    let name = ArcStr::from(strukt.name.as_str());
    let mut structure = Structure::new(name.clone());
    for elem in &strukt.elems {
        use gds21::GdsElement::*;
        match elem {
            GdsBoundary(x) => structure.elements.push(import_boundary(&name, x)?),
            GdsPath(x) => structure.elements.push(import_path(&name, x)?),
            GdsStructRef(x) => structure.elements.push(import_sref(&name, x)?),
            GdsArrayRef(x) => structure.elements.push(import_aref(&name, x)?),
            // Text annotations carry no geometry.
            GdsTextElem(_) => trace!("ignoring text element"),
            GdsNode(_) => {
                return Err(LayoutError::UnsupportedElementKind {
                    structure: name,
                    kind: "node",
                })
            }
            GdsBox(_) => {
                return Err(LayoutError::UnsupportedElementKind {
                    structure: name,
                    kind: "box",
                })
            }
        }
    }
    Ok(structure)
}

fn import_boundary(structure: &ArcStr, x: &gds21::GdsBoundary) -> LayoutResult<Element> {
    let points = import_points(&x.xy);
    // Validate and normalize winding once, at import; the flattener then
    // only clones the ring.
    let poly = Polygon::new(points)
        .map_err(|source| LayoutError::InvalidBoundary {
            structure: structure.clone(),
            source,
        })?
        .into_ccw();
    Ok(Element::Boundary(Boundary {
        layer: x.layer,
        datatype: x.datatype,
        points: poly.points().to_vec(),
    }))
}

fn import_path(structure: &ArcStr, x: &gds21::GdsPath) -> LayoutResult<Element> {
    let width = x.width.ok_or_else(|| LayoutError::UnsupportedPath {
        structure: structure.clone(),
        detail: "path width must be specified".to_string(),
    })?;
    let style = PathStyle::from_gds(x.path_type).ok_or_else(|| LayoutError::UnsupportedPath {
        structure: structure.clone(),
        detail: format!("path type {:?} not supported", x.path_type),
    })?;
    let points = import_points(&x.xy);
    let endpoints: [Point; 2] = match points.as_slice() {
        [a, b] => [*a, *b],
        other => {
            return Err(LayoutError::UnsupportedPath {
                structure: structure.clone(),
                detail: format!("centerline has {} points; only 2 supported", other.len()),
            })
        }
    };
    // The first element property carries the net name in annotated layouts.
    let net = x
        .properties
        .first()
        .map(|p| ArcStr::from(p.value.as_str()));
    Ok(Element::Path(Path {
        layer: x.layer,
        datatype: x.datatype,
        width: width as i64,
        style,
        endpoints,
        net,
    }))
}

fn import_sref(structure: &ArcStr, x: &gds21::GdsStructRef) -> LayoutResult<Element> {
    let target = ArcStr::from(x.name.as_str());
    let (reflect_x, rotation) = import_strans(structure, &target, x.strans.as_ref())?;
    Ok(Element::SRef(StructRef {
        target,
        origin: import_point(&x.xy),
        reflect_x,
        rotation,
    }))
}

fn import_aref(structure: &ArcStr, x: &gds21::GdsArrayRef) -> LayoutResult<Element> {
    let target = ArcStr::from(x.name.as_str());
    let (reflect_x, rotation) = import_strans(structure, &target, x.strans.as_ref())?;
    let p0 = import_point(&x.xy[0]);
    let p1 = import_point(&x.xy[1]);
    let p2 = import_point(&x.xy[2]);
    // Only "specified-rectangular" arrays are supported: the column anchor
    // shares the origin's y, the row anchor its x.
    if p0.y != p1.y || p0.x != p2.x {
        return Err(LayoutError::UnsupportedTransform {
            structure: structure.clone(),
            target,
            detail: "non-rectangular array specification".to_string(),
        });
    }
    if x.cols <= 0 || x.rows <= 0 {
        return Err(LayoutError::UnsupportedTransform {
            structure: structure.clone(),
            target,
            detail: format!("array of {} cols x {} rows", x.cols, x.rows),
        });
    }
    Ok(Element::ARef(ArrayRef {
        target,
        rows: x.rows as i64,
        cols: x.cols as i64,
        origin: p0,
        col_anchor: p1,
        row_anchor: p2,
        reflect_x,
        rotation,
    }))
}

/// Converts a GDSII strans record into the supported (reflect, rotation)
/// pair, rejecting everything outside the whitelist.
fn import_strans(
    structure: &ArcStr,
    target: &ArcStr,
    strans: Option<&gds21::GdsStrans>,
) -> LayoutResult<(bool, Rotation)> {
    let Some(strans) = strans else {
        return Ok((false, Rotation::R0));
    };
    let unsupported = |detail: String| LayoutError::UnsupportedTransform {
        structure: structure.clone(),
        target: target.clone(),
        detail,
    };
    if strans.abs_mag || strans.abs_angle {
        return Err(unsupported(
            "absolute magnification/angle flags".to_string(),
        ));
    }
    if let Some(mag) = strans.mag {
        return Err(unsupported(format!("magnification {mag}")));
    }
    let angle = strans.angle.unwrap_or(0.0);
    let rotation = Rotation::try_from_degrees(angle)
        .ok_or_else(|| unsupported(format!("rotation by {angle} degrees")))?;
    Ok((strans.reflected, rotation))
}

fn import_point(p: &gds21::GdsPoint) -> Point {
    Point::new(p.x as i64, p.y as i64)
}

fn import_points(pts: &[gds21::GdsPoint]) -> Vec<Point> {
    pts.iter().map(import_point).collect()
}

//! Shared test fixtures: a two-metal tech at 100 database units per micron
//! and a small annotated layout.

use arcstr::ArcStr;

use geometry::point::Point;
use layout::{Boundary, Element, Library, Path, PathStyle, Structure};
use tech::layermap::LayerMap;
use tech::lef::parse_lef;
use tech::Tech;

use crate::config::ScoreConfig;

pub(crate) const STACK_LEF: &str = "\
UNITS
  DATABASE MICRONS 100 ;
END UNITS
MANUFACTURINGGRID 0.01 ;
LAYER metal1
  TYPE ROUTING ;
  DIRECTION HORIZONTAL ;
  PITCH 0.2 ;
  WIDTH 0.1 ;
  SPACING 0.1 ;
END metal1
LAYER metal2
  TYPE ROUTING ;
  DIRECTION VERTICAL ;
  PITCH 0.2 ;
  WIDTH 0.1 ;
  SPACING 0.1 ;
END metal2
SITE unit
  CLASS CORE ;
  SIZE 0.2 BY 2.0 ;
END unit
";

pub(crate) const CELL_LEF: &str = "\
MACRO INVX1
  CLASS CORE ;
  SIZE 0.6 BY 2.0 ;
END INVX1
MACRO FILL2
  CLASS CORE SPACER ;
  SIZE 0.4 BY 2.0 ;
END FILL2
";

pub(crate) const LAYER_MAP: &str = "\
metal1 drawing 19 0
metal2 drawing 21 0
";

/// metal1: pitch 20, width 10, spacing 10, rogue 28. metal2 identical.
pub(crate) fn test_tech() -> Tech {
    Tech::new(
        parse_lef(STACK_LEF).unwrap(),
        parse_lef(CELL_LEF).unwrap(),
        LayerMap::parse(LAYER_MAP).unwrap(),
    )
    .unwrap()
}

fn boundary(layer: i16, left: i64, bot: i64, right: i64, top: i64) -> Element {
    Element::Boundary(Boundary {
        layer,
        datatype: 0,
        points: vec![
            Point::new(left, bot),
            Point::new(right, bot),
            Point::new(right, top),
            Point::new(left, top),
            Point::new(left, bot),
        ],
    })
}

fn wire(layer: i16, from: (i64, i64), to: (i64, i64), net: Option<&str>) -> Element {
    Element::Path(Path {
        layer,
        datatype: 0,
        width: 10,
        style: PathStyle::Flush,
        endpoints: [Point::new(from.0, from.1), Point::new(to.0, to.1)],
        net: net.map(ArcStr::from),
    })
}

/// A `top` structure with:
///   - two `core/key_reg` segments: a metal1 wire (0,0)-(400,0) and a
///     metal2 wire (400,0)-(400,300), both width 10;
///   - an unrelated annotated metal1 wire well away from them;
///   - an unannotated metal1 blocker wall at y 15..25 along the first
///     segment's north side;
///   - a device-layer boundary (GDS layer 5).
pub(crate) fn test_library() -> Library {
    let mut lib = Library::new("fixture");
    let mut top = Structure::new("top");
    top.elements
        .push(wire(19, (0, 0), (400, 0), Some("core/key_reg")));
    top.elements
        .push(wire(21, (400, 0), (400, 300), Some("core/key_reg")));
    top.elements
        .push(wire(19, (0, 2000), (400, 2000), Some("core/other")));
    top.elements.push(boundary(19, -100, 15, 500, 25));
    top.elements.push(boundary(5, 0, 0, 40, 40));
    lib.insert(top).unwrap();
    lib
}

pub(crate) fn test_config() -> ScoreConfig {
    let mut config = ScoreConfig::new("top");
    config.first_routing_gds_layer = 19;
    config
}

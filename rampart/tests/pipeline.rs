//! End-to-end pipeline: LEF/DEF text and a hand-built layout in, reports
//! out.

use arcstr::ArcStr;
use indexmap::IndexSet;

use geometry::point::Point;
use layout::{Boundary, Element, Library, Path, PathStyle, Structure};
use rampart::{
    analyze_routing_distance, color_placement_grid, extract_critical_nets,
    extract_nearby_polygons, find_open_regions, scan_blockage, BlockageReport, ScanSide,
    ScoreConfig, TriggerSpaceReport,
};
use tech::def::parse_def;
use tech::lef::parse_lef;
use tech::netlist::parse_dot;
use tech::{LayerMap, PlacementGrid, Tech};

const STACK_LEF: &str = "\
UNITS
  DATABASE MICRONS 100 ;
END UNITS
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

const CELL_LEF: &str = "\
MACRO NAND2X1
  CLASS CORE ;
  SIZE 0.8 BY 2.0 ;
END NAND2X1
";

const DEF: &str = "\
UNITS DISTANCE MICRONS 100 ;
DIEAREA ( 0 0 ) ( 1000 600 ) ;
ROW ROW_0 unit 0 0 N DO 50 BY 1 STEP 20 0 ;
ROW ROW_1 unit 0 200 FS DO 50 BY 1 STEP 20 0 ;
ROW ROW_2 unit 0 400 N DO 50 BY 1 STEP 20 0 ;
";

const DOT: &str = "\
digraph G {
\"soc.aes.key_bit\";
}
";

fn build_tech() -> Tech {
    Tech::new(
        parse_lef(STACK_LEF).unwrap(),
        parse_lef(CELL_LEF).unwrap(),
        LayerMap::parse("metal1 drawing 19 0\nmetal2 drawing 21 0\n").unwrap(),
    )
    .unwrap()
}

fn build_library() -> Library {
    let mut lib = Library::new("chip");
    let mut top = Structure::new("top");
    // The critical wire, with a parallel neighbor two tracks away and a
    // crossing wire above.
    top.elements.push(Element::Path(Path {
        layer: 19,
        datatype: 0,
        width: 10,
        style: PathStyle::Flush,
        endpoints: [Point::new(100, 100), Point::new(700, 100)],
        net: Some(ArcStr::from("soc/aes/key_bit")),
    }));
    top.elements.push(Element::Path(Path {
        layer: 19,
        datatype: 0,
        width: 10,
        style: PathStyle::Flush,
        endpoints: [Point::new(100, 120), Point::new(700, 120)],
        net: Some(ArcStr::from("soc/aes/benign")),
    }));
    top.elements.push(Element::Path(Path {
        layer: 21,
        datatype: 0,
        width: 10,
        style: PathStyle::Square,
        endpoints: [Point::new(400, 0), Point::new(400, 500)],
        net: None,
    }));
    // Placed logic on the device layers.
    top.elements.push(Element::Boundary(Boundary {
        layer: 5,
        datatype: 0,
        points: vec![
            Point::new(0, 0),
            Point::new(200, 0),
            Point::new(200, 200),
            Point::new(0, 200),
            Point::new(0, 0),
        ],
    }));
    lib.insert(top).unwrap();
    lib
}

fn build_config() -> ScoreConfig {
    let mut config = ScoreConfig::new("top");
    config.first_routing_gds_layer = 19;
    config
}

#[test]
fn full_pipeline_produces_consistent_reports() {
    let tech = build_tech();
    let library = build_library();
    let config = build_config();
    let critical: IndexSet<ArcStr> = parse_dot(DOT);
    assert!(critical.contains("key_bit"));

    // Blockage.
    let mut nets = extract_critical_nets(&library, &tech, &config, &critical).unwrap();
    assert_eq!(nets.len(), 1);
    assert_eq!(nets[0].segments.len(), 1);
    extract_nearby_polygons(&library, &tech, &config, &mut nets).unwrap();
    let seg = &mut nets[0].segments[0];
    // The benign wire is a same-layer neighbor; the metal2 crossing sits
    // above.
    assert_eq!(seg.nearby_same_layer.len(), 2);
    assert_eq!(seg.nearby_above.len(), 1);
    let result = scan_blockage(seg, &tech, &config).unwrap();
    assert!(result.same_layer_blocked > 0);
    assert!(result.same_layer_blocked <= result.same_layer_checked);
    assert!(result.diff_layer_blocked > 0);
    // The south side has nothing near it.
    assert!(result.unblocked_sides.contains(&ScanSide::South));
    seg.blockage = Some(result);

    let report = BlockageReport::from_nets(&nets);
    assert_eq!(report.segments.len(), 1);
    assert!(report.overall_percentage > 0.0);
    assert!(report.overall_percentage < 100.0);

    // Trigger space.
    let def = parse_def(DEF).unwrap();
    let site = &tech.placement_sites["unit"];
    let mut grid = PlacementGrid::new(&def.rows, site).unwrap();
    assert_eq!((grid.rows(), grid.cols()), (3, 50));
    color_placement_grid(&library, &tech, &config, &mut grid).unwrap();
    // The 200x200 block covers 10 columns of rows 0 and 1 (plus the
    // touched neighbors).
    assert!(grid.open_site_count() < 150);
    let regions = find_open_regions(&grid);
    let trigger_report = TriggerSpaceReport::from_regions(&regions);
    assert_eq!(trigger_report.open_sites, grid.open_site_count());

    // Routing distance.
    let estimates = analyze_routing_distance(&nets, &regions, &grid, &tech, None, &config);
    assert!(!estimates.is_empty());
    for estimate in &estimates {
        assert!(estimate.distance_microns >= 0.0);
        assert!(estimate.region_size >= config.target_trigger_size);
        assert_eq!(estimate.net_basename, "key_bit");
    }
}

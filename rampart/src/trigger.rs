//! Open trigger-space analysis.
//!
//! Colors the placement grid with the device-layer footprints of placed
//! logic (fill cells excluded: the space under them is free for the
//! taking), then finds every maximal 4-connected open region. The region
//! map is what the routing-distance metric searches for attacker-usable
//! space near a critical net.

use std::collections::BTreeMap;

use arcstr::ArcStr;
use tracing::{debug, info};

use layout::Library;
use tech::{GridCell, PlacementGrid, Tech};

use crate::config::ScoreConfig;
use crate::error::ScoreResult;

/// Colors `grid` with every device-layer shape under the top structure.
///
/// A site is occupied when any device-layer polygon's bounding box overlaps
/// the site's box. Fill cells (LEF `SPACER` macros) and any additionally
/// configured structures are skipped entirely.
pub fn color_placement_grid(
    library: &Library,
    tech: &Tech,
    config: &ScoreConfig,
    grid: &mut PlacementGrid,
) -> ScoreResult<()> {
    let ignored: Vec<ArcStr> = tech
        .fill_cells
        .keys()
        .cloned()
        .chain(config.ignored_cells.iter().cloned())
        .collect();
    info!(top = %config.top_cell, ignored = ignored.len(), "coloring placement grid");

    let grid_bbox = grid.bbox();
    for shape in library.flatten_ignoring(&config.top_cell, ignored)? {
        let shape = shape?;
        if shape.layer >= config.first_routing_gds_layer {
            continue;
        }
        let bbox = shape.polygon.bbox();
        if !grid_bbox.overlaps(&bbox) {
            continue;
        }
        for cell in grid.cells_overlapping(bbox) {
            grid.set_occupied(cell);
        }
    }
    debug!(open = grid.open_site_count(), "grid colored");
    Ok(())
}

/// Finds every maximal 4-connected open region of the grid.
///
/// Returns regions grouped by size; each region's cells are sorted. Seeds
/// are taken in column-major order (lowest column first, then lowest row)
/// and the fill itself runs on a working copy with an explicit stack, so
/// results are deterministic and the recursion depth bounded regardless of
/// region shape.
pub fn find_open_regions(grid: &PlacementGrid) -> BTreeMap<usize, Vec<Vec<GridCell>>> {
    let mut work = grid.clone();
    let mut regions: BTreeMap<usize, Vec<Vec<GridCell>>> = BTreeMap::new();

    while let Some(seed) = first_open_cell(&work) {
        let mut cells = Vec::new();
        let mut stack = vec![seed];
        work.set_occupied(seed);
        while let Some(cell) = stack.pop() {
            cells.push(cell);
            for neighbor in neighbors4(cell, work.rows(), work.cols()) {
                if !work.is_occupied(neighbor) {
                    work.set_occupied(neighbor);
                    stack.push(neighbor);
                }
            }
        }
        cells.sort();
        regions.entry(cells.len()).or_default().push(cells);
    }
    regions
}

/// The first open cell in column-major order.
fn first_open_cell(grid: &PlacementGrid) -> Option<GridCell> {
    for col in 0..grid.cols() {
        for row in 0..grid.rows() {
            let cell = GridCell::new(row, col);
            if !grid.is_occupied(cell) {
                return Some(cell);
            }
        }
    }
    None
}

/// The 4-connected neighbors of a cell, clipped to the grid.
fn neighbors4(cell: GridCell, rows: usize, cols: usize) -> impl Iterator<Item = GridCell> {
    let GridCell { row, col } = cell;
    [
        (row + 1 < rows).then(|| GridCell::new(row + 1, col)),
        (col + 1 < cols).then(|| GridCell::new(row, col + 1)),
        (row > 0).then(|| GridCell::new(row - 1, col)),
        (col > 0).then(|| GridCell::new(row, col - 1)),
    ]
    .into_iter()
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_config, test_library, test_tech};
    use arcstr::ArcStr;
    use geometry::point::Point;
    use layout::{Boundary, Element, Structure, StructRef};
    use tech::grid::PlacementRow;

    fn empty_grid(rows: i64, cols: i64) -> PlacementGrid {
        let site = tech::PlacementSite {
            name: ArcStr::from("unit"),
            class: None,
            width: 20,
            height: 200,
        };
        let def_rows: Vec<PlacementRow> = (0..rows)
            .map(|i| PlacementRow {
                id: ArcStr::from(format!("ROW_{i}")),
                site: ArcStr::from("unit"),
                origin: Point::new(0, i * 200),
                orient: ArcStr::from("N"),
                count_x: cols,
                count_y: 1,
                step: Point::new(20, 0),
            })
            .collect();
        PlacementGrid::new(&def_rows, &site).unwrap()
    }

    #[test]
    fn all_open_grid_is_one_region() {
        let grid = empty_grid(3, 3);
        let regions = find_open_regions(&grid);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[&9].len(), 1);
        assert_eq!(regions[&9][0].len(), 9);
    }

    #[test]
    fn occupied_column_splits_the_grid() {
        let mut grid = empty_grid(3, 5);
        for row in 0..3 {
            grid.set_occupied(GridCell::new(row, 2));
        }
        let regions = find_open_regions(&grid);
        // Two 3x2 regions.
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[&6].len(), 2);
    }

    #[test]
    fn regions_partition_the_open_cells() {
        let mut grid = empty_grid(4, 6);
        // A scattering of occupied sites.
        for cell in [
            GridCell::new(0, 1),
            GridCell::new(1, 1),
            GridCell::new(2, 1),
            GridCell::new(3, 4),
            GridCell::new(2, 4),
            GridCell::new(1, 3),
        ] {
            grid.set_occupied(cell);
        }
        let regions = find_open_regions(&grid);
        let mut seen = std::collections::HashSet::new();
        let mut total = 0usize;
        for (size, spaces) in &regions {
            for space in spaces {
                assert_eq!(space.len(), *size);
                for cell in space {
                    assert!(!grid.is_occupied(*cell), "occupied cell in a region");
                    assert!(seen.insert(*cell), "cell appears in two regions");
                    total += 1;
                }
            }
        }
        assert_eq!(total, grid.open_site_count());
    }

    #[test]
    fn flood_fill_is_deterministic() {
        let mut grid = empty_grid(5, 5);
        grid.set_occupied(GridCell::new(2, 2));
        assert_eq!(find_open_regions(&grid), find_open_regions(&grid));
    }

    #[test]
    fn device_shapes_color_overlapping_sites() {
        let (lib, tech, config) = (test_library(), test_tech(), test_config());
        let mut grid = empty_grid(2, 20);
        color_placement_grid(&lib, &tech, &config, &mut grid).unwrap();
        // The device boundary (0,0)-(40,40) covers columns 0..=1 of row 0
        // and touches column 2's left edge.
        assert!(grid.is_occupied(GridCell::new(0, 0)));
        assert!(grid.is_occupied(GridCell::new(0, 1)));
        assert!(grid.is_occupied(GridCell::new(0, 2)));
        assert!(!grid.is_occupied(GridCell::new(0, 3)));
        assert!(!grid.is_occupied(GridCell::new(1, 0)));
        assert_eq!(grid.open_site_count(), 37);
    }

    #[test]
    fn fill_cells_do_not_color_the_grid() {
        let (tech, config) = (test_tech(), test_config());
        let mut lib = layout::Library::new("fixture");
        let mut fill = Structure::new("FILL2");
        fill.elements.push(Element::Boundary(Boundary {
            layer: 5,
            datatype: 0,
            points: vec![
                Point::new(0, 0),
                Point::new(40, 0),
                Point::new(40, 200),
                Point::new(0, 200),
                Point::new(0, 0),
            ],
        }));
        lib.insert(fill).unwrap();
        let mut top = Structure::new("top");
        top.elements.push(Element::SRef(StructRef {
            target: ArcStr::from("FILL2"),
            origin: Point::new(100, 0),
            reflect_x: false,
            rotation: geometry::transform::Rotation::R0,
        }));
        lib.insert(top).unwrap();

        let mut grid = empty_grid(1, 20);
        color_placement_grid(&lib, &tech, &config, &mut grid).unwrap();
        assert_eq!(grid.open_site_count(), 20);
    }
}

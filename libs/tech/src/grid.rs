//! The placement-site occupancy grid.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use geometry::point::Point;
use geometry::rect::Rect;

use crate::error::{TechError, TechResult};
use crate::site::PlacementSite;

/// A placement row, as defined by a DEF `ROW` record.
///
/// Row dimensions are in numbers of sites, origins in database units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacementRow {
    /// The row identifier.
    pub id: ArcStr,
    /// The placement site the row is built from.
    pub site: ArcStr,
    /// The origin of the row's first site.
    pub origin: Point,
    /// The row orientation (`N`, `FS`, ...).
    pub orient: ArcStr,
    /// Number of sites along x.
    pub count_x: i64,
    /// Number of sites along y (1 for horizontal rows).
    pub count_y: i64,
    /// Step between sites.
    pub step: Point,
}

/// A cell of the placement grid, addressed by row and column.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct GridCell {
    /// The placement row index, 0 at the bottom row.
    pub row: usize,
    /// The site column index within the row.
    pub col: usize,
}

impl GridCell {
    /// Creates a new [`GridCell`].
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rows-by-columns bitmap of placement sites.
///
/// `true` means the site is covered by standard-cell geometry; `false`
/// means it is open. The grid also remembers enough row geometry to convert
/// between cells and absolute chip coordinates in both directions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacementGrid {
    rows: usize,
    cols: usize,
    site_width: i64,
    site_height: i64,
    row_origins: Vec<Point>,
    occupied: Vec<bool>,
    bbox: Rect,
}

impl PlacementGrid {
    /// Builds an all-open grid from DEF placement rows.
    ///
    /// Only horizontal rows of a single site type are supported; the column
    /// count comes from the first row.
    pub fn new(rows: &[PlacementRow], site: &PlacementSite) -> TechResult<Self> {
        let first = rows.first().ok_or(TechError::MissingRecord {
            what: "ROW records in DEF",
        })?;
        let cols = first.count_x as usize;
        let row_origins: Vec<Point> = rows.iter().map(|r| r.origin).collect();

        let mut bbox = Rect::from_point(first.origin);
        for row in rows {
            let row_rect = Rect::new(
                row.origin,
                Point::new(
                    row.origin.x + row.count_x * site.width,
                    row.origin.y + site.height,
                ),
            );
            bbox = bbox.union(&row_rect);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            site_width: site.width,
            site_height: site.height,
            row_origins,
            occupied: vec![false; rows.len() * cols],
            bbox,
        })
    }

    /// The number of placement rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The number of site columns per row.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The bounding box of the whole grid, in database units.
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Whether the given site is covered.
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.occupied[cell.row * self.cols + cell.col]
    }

    /// Marks the given site as covered.
    pub fn set_occupied(&mut self, cell: GridCell) {
        self.occupied[cell.row * self.cols + cell.col] = true;
    }

    /// The number of open sites.
    pub fn open_site_count(&self) -> usize {
        self.occupied.iter().filter(|o| !**o).count()
    }

    /// The absolute bounding box of one site.
    pub fn site_bbox(&self, cell: GridCell) -> Rect {
        let origin = self.row_origins[cell.row];
        let ll = Point::new(origin.x + cell.col as i64 * self.site_width, origin.y);
        Rect::new(
            ll,
            Point::new(ll.x + self.site_width, ll.y + self.site_height),
        )
    }

    /// The absolute center of one site.
    pub fn site_center(&self, cell: GridCell) -> Point {
        self.site_bbox(cell).center()
    }

    /// The cells whose site boxes overlap `rect` (shared edges count).
    pub fn cells_overlapping(&self, rect: Rect) -> Vec<GridCell> {
        let mut cells = Vec::new();
        for row in 0..self.rows {
            let origin = self.row_origins[row];
            if rect.bot() > origin.y + self.site_height || rect.top() < origin.y {
                continue;
            }
            // Candidate column span, widened a site each way, then filtered
            // against the exact site box so touching edges behave like
            // `Rect::overlaps`.
            let lo = (rect.left() - origin.x).div_euclid(self.site_width) - 1;
            let hi = (rect.right() - origin.x).div_euclid(self.site_width) + 1;
            for col in lo.max(0)..=hi.min(self.cols as i64 - 1) {
                let cell = GridCell::new(row, col as usize);
                if self.site_bbox(cell).overlaps(&rect) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_site() -> PlacementSite {
        PlacementSite {
            name: ArcStr::from("unit"),
            class: None,
            width: 10,
            height: 20,
        }
    }

    fn test_rows() -> Vec<PlacementRow> {
        (0..3)
            .map(|i| PlacementRow {
                id: ArcStr::from(format!("ROW_{i}")),
                site: ArcStr::from("unit"),
                origin: Point::new(100, 200 + i * 20),
                orient: ArcStr::from("N"),
                count_x: 8,
                count_y: 1,
                step: Point::new(10, 0),
            })
            .collect()
    }

    #[test]
    fn grid_dimensions_come_from_rows() {
        let grid = PlacementGrid::new(&test_rows(), &test_site()).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 8);
        assert_eq!(grid.bbox(), Rect::from_sides(100, 200, 180, 260));
        assert_eq!(grid.open_site_count(), 24);
    }

    #[test]
    fn site_coordinates_round_trip() {
        let grid = PlacementGrid::new(&test_rows(), &test_site()).unwrap();
        let cell = GridCell::new(1, 3);
        assert_eq!(grid.site_bbox(cell), Rect::from_sides(130, 220, 140, 240));
        assert_eq!(grid.site_center(cell), Point::new(135, 230));
        assert!(grid.cells_overlapping(grid.site_bbox(cell)).contains(&cell));
    }

    #[test]
    fn overlap_query_matches_rect_semantics() {
        let grid = PlacementGrid::new(&test_rows(), &test_site()).unwrap();
        // A rect covering the interior of exactly one site.
        let hits = grid.cells_overlapping(Rect::from_sides(131, 221, 139, 239));
        assert_eq!(hits, vec![GridCell::new(1, 3)]);
        // A rect touching the shared edge between columns 2 and 3.
        let hits = grid.cells_overlapping(Rect::from_sides(130, 221, 130, 239));
        assert_eq!(hits, vec![GridCell::new(1, 2), GridCell::new(1, 3)]);
    }

    #[test]
    fn occupancy_is_per_site() {
        let mut grid = PlacementGrid::new(&test_rows(), &test_site()).unwrap();
        let cell = GridCell::new(2, 7);
        assert!(!grid.is_occupied(cell));
        grid.set_occupied(cell);
        assert!(grid.is_occupied(cell));
        assert_eq!(grid.open_site_count(), 23);
    }
}

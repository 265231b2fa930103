//! DEF file reading.
//!
//! Covers the placement records the analysis needs: `UNITS`, `DIEAREA`,
//! and `ROW`.

use arcstr::ArcStr;
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{multispace0, space1},
    number::complete::double,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use geometry::point::Point;
use geometry::rect::Rect;

use crate::error::{TechError, TechResult};
use crate::grid::PlacementRow;

/// Everything read from one DEF file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DefData {
    /// Database units per micron.
    pub database_units: Option<i64>,
    /// The die area, in database units.
    pub die_area: Option<Rect>,
    /// Placement rows, in file order (bottom row first).
    pub rows: Vec<PlacementRow>,
}

/// Parses DEF text.
pub fn parse_def(text: &str) -> TechResult<DefData> {
    let mut data = DefData::default();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim().trim_end_matches(';').trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with("ROW") {
            let (_, row) = parse_row(line).map_err(|_| TechError::Parse {
                context: "DEF",
                line: lineno + 1,
                message: format!("malformed ROW record `{line}`"),
            })?;
            data.rows.push(row);
        } else if line.starts_with("DIEAREA") {
            let (_, rect) = parse_die_area(line).map_err(|_| TechError::Parse {
                context: "DEF",
                line: lineno + 1,
                message: format!("malformed DIEAREA record `{line}`"),
            })?;
            data.die_area = Some(rect);
        } else if line.starts_with("UNITS") {
            if let Ok((_, units)) = parse_units(line) {
                data.database_units = Some(units as i64);
            }
        }
    }
    Ok(data)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || "._/[]-".contains(c)).parse(input)
}

fn number(input: &str) -> IResult<&str, i64> {
    let (rest, value) = double(input)?;
    Ok((rest, value as i64))
}

/// `ROW <id> <site> <x> <y> <orient> DO <nx> BY <ny> STEP <sx> <sy>`.
fn parse_row(input: &str) -> IResult<&str, PlacementRow> {
    let (rest, _) = tag("ROW").parse(input)?;
    let (rest, _) = space1(rest)?;
    let (rest, id) = identifier(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, site) = identifier(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, x) = number(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, y) = number(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, orient) = identifier(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, _) = tag("DO").parse(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, count_x) = number(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, _) = tag("BY").parse(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, count_y) = number(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, _) = tag("STEP").parse(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, step_x) = number(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, step_y) = number(rest)?;
    Ok((
        rest,
        PlacementRow {
            id: ArcStr::from(id),
            site: ArcStr::from(site),
            origin: Point::new(x, y),
            orient: ArcStr::from(orient),
            count_x,
            count_y,
            step: Point::new(step_x, step_y),
        },
    ))
}

/// `( <x> <y> )`.
fn parse_paren_point(input: &str) -> IResult<&str, Point> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = tag("(").parse(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, x) = number(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, y) = number(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = tag(")").parse(rest)?;
    Ok((rest, Point::new(x, y)))
}

/// `DIEAREA ( <x> <y> ) ( <x> <y> )`.
fn parse_die_area(input: &str) -> IResult<&str, Rect> {
    let (rest, _) = tag("DIEAREA").parse(input)?;
    let (rest, ll) = parse_paren_point(rest)?;
    let (rest, ur) = parse_paren_point(rest)?;
    Ok((rest, Rect::new(ll, ur)))
}

/// `UNITS DISTANCE MICRONS <n>`.
fn parse_units(input: &str) -> IResult<&str, f64> {
    let (rest, _) = tag("UNITS").parse(input)?;
    let (rest, _) = space1(rest)?;
    let (rest, _) = tag("DISTANCE").parse(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, _) = tag("MICRONS").parse(rest)?;
    let (rest, _) = space1(rest)?;
    double(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEF: &str = "\
VERSION 5.8 ;
DESIGN top ;
UNITS DISTANCE MICRONS 2000 ;
DIEAREA ( 0 0 ) ( 400000 400000 ) ;
ROW ROW_0 unit 20000 20000 N DO 880 BY 1 STEP 400 0 ;
ROW ROW_1 unit 20000 24000 FS DO 880 BY 1 STEP 400 0 ;
END DESIGN
";

    #[test]
    fn units_diearea_and_rows_parse() {
        let data = parse_def(DEF).unwrap();
        assert_eq!(data.database_units, Some(2000));
        assert_eq!(data.die_area, Some(Rect::from_sides(0, 0, 400000, 400000)));
        assert_eq!(data.rows.len(), 2);
        let row = &data.rows[1];
        assert_eq!(row.id, "ROW_1");
        assert_eq!(row.site, "unit");
        assert_eq!(row.origin, Point::new(20000, 24000));
        assert_eq!(row.orient, "FS");
        assert_eq!(row.count_x, 880);
        assert_eq!(row.count_y, 1);
        assert_eq!(row.step, Point::new(400, 0));
    }

    #[test]
    fn malformed_rows_are_reported() {
        let err = parse_def("ROW bad unit 0 0 N DO\n").unwrap_err();
        assert!(matches!(err, TechError::Parse { line: 1, .. }));
    }
}

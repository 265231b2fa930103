//! LEF file reading.
//!
//! Covers exactly the records the analysis consumes: `UNITS DATABASE
//! MICRONS`, `MANUFACTURINGGRID`, routing `LAYER` blocks, `SITE` blocks,
//! and `MACRO` class/size records. Everything else is skipped.

use arcstr::ArcStr;
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::space1,
    combinator::opt,
    number::complete::double,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use geometry::dir::Dir;

use crate::error::{TechError, TechResult};
use crate::layer::SpacingRule;

/// A routing layer record, in microns, as read from the LEF.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LefLayer {
    /// The layer name.
    pub name: ArcStr,
    /// The preferred routing direction.
    pub direction: Dir,
    /// Track pitch.
    pub pitch: Option<f64>,
    /// Track offset.
    pub offset: Option<f64>,
    /// Default wire width.
    pub width: Option<f64>,
    /// Minimum wire width.
    pub min_width: Option<f64>,
    /// Maximum wire width.
    pub max_width: Option<f64>,
    /// Minimum metal area.
    pub area: Option<f64>,
    /// Spacing rules, in file order.
    pub spacing: Vec<SpacingRule>,
}

/// A `SITE` record, in microns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LefSite {
    /// The site name.
    pub name: ArcStr,
    /// The site class.
    pub class: Option<ArcStr>,
    /// Site width.
    pub width: f64,
    /// Site height.
    pub height: f64,
}

/// A `MACRO` record, in microns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LefMacro {
    /// The macro name.
    pub name: ArcStr,
    /// Whether the macro class marks it as a fill cell (`SPACER`).
    pub is_filler: bool,
    /// Cell width.
    pub width: f64,
    /// Cell height.
    pub height: f64,
}

/// Everything read from one LEF file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LefData {
    /// Database units per micron.
    pub database_units: Option<i64>,
    /// Manufacturing grid resolution, in microns.
    pub manufacturing_grid: Option<f64>,
    /// Routing layers, in file order (bottom-up).
    pub layers: Vec<LefLayer>,
    /// Placement sites.
    pub sites: Vec<LefSite>,
    /// Macros (standard cells and fill cells).
    pub macros: Vec<LefMacro>,
}

/// Parses LEF text.
pub fn parse_lef(text: &str) -> TechResult<LefData> {
    let lines: Vec<&str> = text.lines().collect();
    let mut data = LefData::default();
    let mut i = 0;

    while i < lines.len() {
        let lineno = i + 1;
        let line = clean(lines[i]);
        i += 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match first_token(line) {
            "UNITS" => {
                while i < lines.len() {
                    let l = clean(lines[i]);
                    i += 1;
                    if l.starts_with("END") {
                        break;
                    }
                    if let Ok((_, units)) = parse_database_microns(l) {
                        data.database_units = Some(units as i64);
                    }
                }
            }
            "MANUFACTURINGGRID" => {
                data.manufacturing_grid = Some(second_number(line, lineno)?);
            }
            "PROPERTYDEFINITIONS" => {
                while i < lines.len() {
                    let l = clean(lines[i]);
                    i += 1;
                    if l.starts_with("END") {
                        break;
                    }
                }
            }
            "LAYER" => {
                let name = second_token(line, lineno)?;
                i = parse_layer_block(&lines, i, name, &mut data)?;
            }
            "SITE" => {
                let name = second_token(line, lineno)?;
                i = parse_site_block(&lines, i, name, &mut data)?;
            }
            "MACRO" => {
                let name = second_token(line, lineno)?;
                i = parse_macro_block(&lines, i, name, &mut data)?;
            }
            _ => {}
        }
    }
    Ok(data)
}

/// Parses one `LAYER ... END` block; only `TYPE ROUTING` layers are kept.
fn parse_layer_block(
    lines: &[&str],
    mut i: usize,
    name: ArcStr,
    data: &mut LefData,
) -> TechResult<usize> {
    let mut is_routing = false;
    let mut layer = LefLayer {
        name,
        direction: Dir::Horiz,
        pitch: None,
        offset: None,
        width: None,
        min_width: None,
        max_width: None,
        area: None,
        spacing: Vec::new(),
    };

    while i < lines.len() {
        let lineno = i + 1;
        let line = clean(lines[i]);
        i += 1;
        if line.starts_with("END") {
            break;
        }
        match first_token(line) {
            "TYPE" => is_routing = line.contains("ROUTING"),
            "DIRECTION" => {
                layer.direction = if line.contains("VERTICAL") {
                    Dir::Vert
                } else if line.contains("HORIZONTAL") {
                    Dir::Horiz
                } else {
                    return Err(TechError::Parse {
                        context: "LEF",
                        line: lineno,
                        message: format!("routing direction not recognized in `{line}`"),
                    });
                };
            }
            "PITCH" => layer.pitch = Some(second_number(line, lineno)?),
            "OFFSET" => layer.offset = Some(second_number(line, lineno)?),
            "MINWIDTH" => layer.min_width = Some(second_number(line, lineno)?),
            "MAXWIDTH" => layer.max_width = Some(second_number(line, lineno)?),
            "WIDTH" => layer.width = Some(second_number(line, lineno)?),
            "AREA" => layer.area = Some(second_number(line, lineno)?),
            "SPACING" => {
                let (rest, rule) = parse_spacing(line).map_err(|_| TechError::Parse {
                    context: "LEF",
                    line: lineno,
                    message: format!("malformed spacing rule `{line}`"),
                })?;
                if !rest.trim().is_empty() {
                    return Err(TechError::Parse {
                        context: "LEF",
                        line: lineno,
                        message: format!("unsupported spacing rule `{}`", rest.trim()),
                    });
                }
                layer.spacing.push(rule);
            }
            _ => {}
        }
    }

    if is_routing {
        data.layers.push(layer);
    }
    Ok(i)
}

/// Parses one `SITE ... END` block.
fn parse_site_block(
    lines: &[&str],
    mut i: usize,
    name: ArcStr,
    data: &mut LefData,
) -> TechResult<usize> {
    let mut class = None;
    let mut size = None;
    while i < lines.len() {
        let lineno = i + 1;
        let line = clean(lines[i]);
        i += 1;
        if line.starts_with("END") {
            break;
        }
        match first_token(line) {
            "CLASS" => class = Some(second_token(line, lineno)?),
            "SIZE" => size = Some(parse_size_line(line, lineno)?),
            _ => {}
        }
    }
    let (width, height) = size.ok_or(TechError::MissingRecord {
        what: "SIZE on SITE",
    })?;
    data.sites.push(LefSite {
        name,
        class,
        width,
        height,
    });
    Ok(i)
}

/// Parses one `MACRO ... END <name>` block.
///
/// Macro bodies nest `PIN`/`PORT` blocks with their own `END`s, so this
/// block only closes on the `END` carrying the macro's own name.
fn parse_macro_block(
    lines: &[&str],
    mut i: usize,
    name: ArcStr,
    data: &mut LefData,
) -> TechResult<usize> {
    let mut is_filler = false;
    let mut size = None;
    while i < lines.len() {
        let lineno = i + 1;
        let line = clean(lines[i]);
        i += 1;
        if line.starts_with("END") && line.contains(name.as_str()) {
            break;
        }
        match first_token(line) {
            "CLASS" => is_filler = line.contains("SPACER"),
            "SIZE" if size.is_none() => size = Some(parse_size_line(line, lineno)?),
            _ => {}
        }
    }
    let (width, height) = size.ok_or(TechError::MissingRecord {
        what: "SIZE on MACRO",
    })?;
    data.macros.push(LefMacro {
        name,
        is_filler,
        width,
        height,
    });
    Ok(i)
}

fn clean(line: &str) -> &str {
    line.trim().trim_end_matches(';').trim_end()
}

fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

fn second_token(line: &str, lineno: usize) -> TechResult<ArcStr> {
    line.split_whitespace()
        .nth(1)
        .map(ArcStr::from)
        .ok_or_else(|| TechError::Parse {
            context: "LEF",
            line: lineno,
            message: format!("expected a name in `{line}`"),
        })
}

fn second_number(line: &str, lineno: usize) -> TechResult<f64> {
    let (_, value) = parse_keyword_number(line).map_err(|_| TechError::Parse {
        context: "LEF",
        line: lineno,
        message: format!("expected a number in `{line}`"),
    })?;
    Ok(value)
}

/// `<keyword> <number>`.
fn parse_keyword_number(input: &str) -> IResult<&str, f64> {
    let (rest, _) = take_while1(|c: char| !c.is_whitespace()).parse(input)?;
    let (rest, _) = space1(rest)?;
    double(rest)
}

/// `DATABASE MICRONS <n>`.
fn parse_database_microns(input: &str) -> IResult<&str, f64> {
    let (rest, _) = tag("DATABASE").parse(input)?;
    let (rest, _) = space1(rest)?;
    let (rest, _) = tag("MICRONS").parse(rest)?;
    let (rest, _) = space1(rest)?;
    double(rest)
}

/// `SPACING <value> [RANGE <min> <max>]`.
fn parse_spacing(input: &str) -> IResult<&str, SpacingRule> {
    let (rest, _) = tag("SPACING").parse(input)?;
    let (rest, _) = space1(rest)?;
    let (rest, value) = double(rest)?;
    let (rest, range) = opt(parse_range).parse(rest)?;
    Ok((rest, SpacingRule { value, range }))
}

/// ` RANGE <min> <max>`.
fn parse_range(input: &str) -> IResult<&str, (f64, f64)> {
    let (rest, _) = space1(input)?;
    let (rest, _) = tag("RANGE").parse(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, min) = double(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, max) = double(rest)?;
    Ok((rest, (min, max)))
}

/// `SIZE <x> BY <y>`.
fn parse_size(input: &str) -> IResult<&str, (f64, f64)> {
    let (rest, _) = tag("SIZE").parse(input)?;
    let (rest, _) = space1(rest)?;
    let (rest, x) = double(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, _) = tag("BY").parse(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, y) = double(rest)?;
    Ok((rest, (x, y)))
}

fn parse_size_line(line: &str, lineno: usize) -> TechResult<(f64, f64)> {
    let (_, size) = parse_size(line).map_err(|_| TechError::Parse {
        context: "LEF",
        line: lineno,
        message: format!("malformed SIZE in `{line}`"),
    })?;
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STACK_LEF: &str = "\
# metal stack
UNITS
  DATABASE MICRONS 2000 ;
END UNITS
MANUFACTURINGGRID 0.005 ;
LAYER metal1
  TYPE ROUTING ;
  DIRECTION HORIZONTAL ;
  PITCH 0.2 ;
  WIDTH 0.1 ;
  SPACING 0.1 ;
  SPACING 0.25 RANGE 1.0 10.0 ;
END metal1
LAYER via1
  TYPE CUT ;
  SPACING 0.1 ;
END via1
LAYER metal2
  TYPE ROUTING ;
  DIRECTION VERTICAL ;
  PITCH 0.2 ;
  OFFSET 0.1 ;
  MINWIDTH 0.1 ;
  MAXWIDTH 12.0 ;
  WIDTH 0.14 ;
  SPACING 0.14 ;
  AREA 0.04 ;
END metal2
SITE unit
  CLASS CORE ;
  SYMMETRY Y ;
  SIZE 0.2 BY 2.0 ;
END unit
";

    const CELL_LEF: &str = "\
MACRO INVX1
  CLASS CORE ;
  SIZE 0.6 BY 2.0 ;
  PIN A
    DIRECTION INPUT ;
    PORT
      LAYER metal1 ;
        RECT 0.1 0.2 0.2 0.4 ;
    END
  END A
END INVX1
MACRO FILL8
  CLASS CORE SPACER ;
  SIZE 1.6 BY 2.0 ;
END FILL8
";

    #[test]
    fn stack_lef_parses_units_layers_and_sites() {
        let data = parse_lef(STACK_LEF).unwrap();
        assert_eq!(data.database_units, Some(2000));
        assert_eq!(data.manufacturing_grid, Some(0.005));
        // The cut layer is skipped; the two routing layers survive in order.
        assert_eq!(data.layers.len(), 2);
        assert_eq!(data.layers[0].name, "metal1");
        assert_eq!(data.layers[0].direction, Dir::Horiz);
        assert_eq!(data.layers[0].spacing.len(), 2);
        assert_eq!(data.layers[0].spacing[1].range, Some((1.0, 10.0)));
        assert_eq!(data.layers[1].name, "metal2");
        assert_eq!(data.layers[1].direction, Dir::Vert);
        assert_eq!(data.layers[1].min_width, Some(0.1));
        assert_eq!(data.layers[1].width, Some(0.14));
        assert_eq!(data.sites.len(), 1);
        assert_eq!(data.sites[0].width, 0.2);
        assert_eq!(data.sites[0].height, 2.0);
    }

    #[test]
    fn macro_blocks_skip_nested_pin_ends() {
        let data = parse_lef(CELL_LEF).unwrap();
        assert_eq!(data.macros.len(), 2);
        assert_eq!(data.macros[0].name, "INVX1");
        assert!(!data.macros[0].is_filler);
        assert_eq!(data.macros[0].width, 0.6);
        assert!(data.macros[1].is_filler);
    }

    #[test]
    fn unsupported_spacing_rules_are_fatal() {
        let lef = "\
LAYER metal1
  TYPE ROUTING ;
  DIRECTION HORIZONTAL ;
  PITCH 0.2 ;
  WIDTH 0.1 ;
  SPACING 0.1 LENGTHTHRESHOLD 1.0 ;
END metal1
";
        assert!(matches!(
            parse_lef(lef),
            Err(TechError::Parse { line: 6, .. })
        ));
    }
}

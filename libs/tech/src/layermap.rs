//! GDS layer-map files.
//!
//! The layer map is the 4-column format linking GDS `(layer, datatype)`
//! pairs to named LEF layers:
//!
//! ```text
//! # <layer name> <purpose> <gds layer> <gds datatype>
//! metal1 drawing 19 0
//! ```

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{TechError, TechResult};

/// A mapping from GDS `(layer, datatype)` pairs to layer names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerMap {
    entries: IndexMap<(i16, i16), ArcStr>,
}

impl LayerMap {
    /// Parses a 4-column layer-map file.
    ///
    /// Lines starting with `#` and blank lines are skipped. The first
    /// mapping seen for a `(layer, datatype)` pair wins.
    pub fn parse(text: &str) -> TechResult<Self> {
        let mut entries = IndexMap::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [name, _purpose, layer, datatype] = fields.as_slice() else {
                return Err(TechError::Parse {
                    context: "layer map",
                    line: lineno + 1,
                    message: format!("expected 4 columns, found {}", fields.len()),
                });
            };
            let parse_num = |s: &str| {
                s.parse::<i16>().map_err(|_| TechError::Parse {
                    context: "layer map",
                    line: lineno + 1,
                    message: format!("invalid layer number `{s}`"),
                })
            };
            let key = (parse_num(layer)?, parse_num(datatype)?);
            entries.entry(key).or_insert_with(|| ArcStr::from(*name));
        }
        Ok(Self { entries })
    }

    /// The layer name mapped to the given GDS layer and datatype.
    ///
    /// When the exact datatype is not mapped but the layer number is, the
    /// first entry for that layer number is used, matching how layouts
    /// frequently annotate geometry with nonstandard datatypes.
    pub fn name_for(&self, layer: i16, datatype: i16) -> Option<&ArcStr> {
        self.entries.get(&(layer, datatype)).or_else(|| {
            self.entries
                .iter()
                .find(|((l, _), _)| *l == layer)
                .map(|(_, name)| name)
        })
    }

    /// The number of mapped pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "\
# layer purpose gds datatype
metal1 drawing 19 0
metal1 pin     19 1
metal2 drawing 21 0
";

    #[test]
    fn exact_pairs_resolve() {
        let map = LayerMap::parse(MAP).unwrap();
        assert_eq!(map.name_for(19, 0).unwrap(), "metal1");
        assert_eq!(map.name_for(21, 0).unwrap(), "metal2");
        assert_eq!(map.name_for(42, 0), None);
    }

    #[test]
    fn unknown_datatypes_fall_back_to_the_layer() {
        let map = LayerMap::parse(MAP).unwrap();
        assert_eq!(map.name_for(21, 5).unwrap(), "metal2");
    }

    #[test]
    fn malformed_lines_are_reported_with_position() {
        let err = LayerMap::parse("metal1 drawing 19\n").unwrap_err();
        assert!(matches!(err, TechError::Parse { line: 1, .. }));
    }
}

//! Routing layer records and their database-unit derived values.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use geometry::dir::Dir;

use crate::error::{TechError, TechResult};
use crate::lef::LefLayer;

/// A LEF spacing rule: a minimum spacing, optionally restricted to a width
/// range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpacingRule {
    /// The minimum spacing, in microns.
    pub value: f64,
    /// The wire-width range `(min, max)` the rule applies to, if restricted.
    pub range: Option<(f64, f64)>,
}

/// A routing layer with the derived database-unit values the blockage
/// scanner consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingLayer {
    /// The LEF layer name.
    pub name: ArcStr,
    /// The logical routing layer number, 1-indexed from the bottom.
    pub number: usize,
    /// The preferred routing direction.
    pub direction: Dir,
    /// Track pitch, in microns.
    pub pitch: f64,
    /// Track offset, in microns.
    pub offset: Option<f64>,
    /// Default wire width, in microns.
    pub width: Option<f64>,
    /// Minimum wire width, in microns.
    pub min_width: Option<f64>,
    /// Maximum wire width, in microns.
    pub max_width: Option<f64>,
    /// Minimum metal area, in square microns.
    pub area: Option<f64>,
    /// Spacing rules, in file order; the first is the unconditional minimum.
    pub spacing: Vec<SpacingRule>,
    /// Track pitch, in database units.
    pub pitch_db: i64,
    /// Minimum spacing, in database units.
    pub min_spacing_db: i64,
    /// Minimum (or default) wire width, in database units.
    pub min_width_db: i64,
    /// The smallest open window, in database units, through which an
    /// attacker can legally route a wire of minimum width while keeping
    /// minimum spacing to the shapes on both sides:
    /// `min_width + 2 * min_spacing - 2`.
    pub rogue_wire_width: i64,
}

impl RoutingLayer {
    /// Builds a [`RoutingLayer`] from a parsed LEF layer record.
    ///
    /// # Errors
    ///
    /// Fails with [`TechError::NonIntegerDatabaseUnit`] if the pitch,
    /// minimum spacing, or minimum width does not convert exactly to
    /// database units, and with [`TechError::MissingRecord`] if the LEF
    /// record lacks a pitch, a width, or a spacing rule.
    pub fn from_lef(lef: LefLayer, number: usize, database_units: i64) -> TechResult<Self> {
        let pitch = lef.pitch.ok_or(TechError::MissingRecord {
            what: "PITCH on routing layer",
        })?;
        let min_spacing = lef
            .spacing
            .first()
            .ok_or(TechError::MissingRecord {
                what: "SPACING on routing layer",
            })?
            .value;
        let base_width = lef.min_width.or(lef.width).ok_or(TechError::MissingRecord {
            what: "WIDTH or MINWIDTH on routing layer",
        })?;

        let pitch_db = to_db(&lef.name, "pitch", pitch, database_units)?;
        let min_spacing_db = to_db(&lef.name, "minimum spacing", min_spacing, database_units)?;
        let min_width_db = to_db(&lef.name, "minimum width", base_width, database_units)?;
        let rogue_wire_width = min_width_db + 2 * min_spacing_db - 2;

        Ok(Self {
            name: lef.name,
            number,
            direction: lef.direction,
            pitch,
            offset: lef.offset,
            width: lef.width,
            min_width: lef.min_width,
            max_width: lef.max_width,
            area: lef.area,
            spacing: lef.spacing,
            pitch_db,
            min_spacing_db,
            min_width_db,
            rogue_wire_width,
        })
    }
}

/// Converts a micron quantity to database units, requiring exactness.
pub(crate) fn to_db(
    name: &ArcStr,
    quantity: &'static str,
    microns: f64,
    database_units: i64,
) -> TechResult<i64> {
    let value = microns * database_units as f64;
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 {
        return Err(TechError::NonIntegerDatabaseUnit {
            name: name.clone(),
            quantity,
            microns,
            database_units,
        });
    }
    Ok(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lef_layer(pitch: f64, width: f64, spacing: f64) -> LefLayer {
        LefLayer {
            name: ArcStr::from("metal2"),
            direction: Dir::Vert,
            pitch: Some(pitch),
            offset: None,
            width: Some(width),
            min_width: None,
            max_width: None,
            area: None,
            spacing: vec![SpacingRule {
                value: spacing,
                range: None,
            }],
        }
    }

    #[test]
    fn derived_values_use_database_units() {
        let layer = RoutingLayer::from_lef(lef_layer(0.2, 0.1, 0.1), 2, 2000).unwrap();
        assert_eq!(layer.pitch_db, 400);
        assert_eq!(layer.min_width_db, 200);
        assert_eq!(layer.min_spacing_db, 200);
        // 200 + 2 * 200 - 2
        assert_eq!(layer.rogue_wire_width, 598);
    }

    #[test]
    fn min_width_takes_precedence_over_width() {
        let mut lef = lef_layer(0.2, 0.14, 0.1);
        lef.min_width = Some(0.07);
        let layer = RoutingLayer::from_lef(lef, 1, 1000).unwrap();
        assert_eq!(layer.min_width_db, 70);
    }

    #[test]
    fn inexact_conversions_are_fatal() {
        let err = RoutingLayer::from_lef(lef_layer(0.2, 0.015, 0.1), 1, 100).unwrap_err();
        assert!(matches!(
            err,
            TechError::NonIntegerDatabaseUnit {
                quantity: "minimum width",
                ..
            }
        ));
    }
}

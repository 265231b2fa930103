//! The assembled technology stack.

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TechError, TechResult};
use crate::layer::{to_db, RoutingLayer};
use crate::layermap::LayerMap;
use crate::lef::LefData;
use crate::site::{PlacementSite, StandardCell};

/// The combined process model: routing layers (with database-unit derived
/// values), placement sites, standard cells, and the GDS layer map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tech {
    /// Database units per micron.
    pub database_units: i64,
    /// Manufacturing grid resolution, in microns.
    pub manufacturing_grid: Option<f64>,
    layers: Vec<RoutingLayer>,
    layers_by_name: IndexMap<ArcStr, usize>,
    /// Placement sites by name.
    pub placement_sites: IndexMap<ArcStr, PlacementSite>,
    /// Logic standard cells by name.
    pub standard_cells: IndexMap<ArcStr, StandardCell>,
    /// Fill (spacer) cells by name.
    pub fill_cells: IndexMap<ArcStr, StandardCell>,
    layer_map: LayerMap,
}

impl Tech {
    /// Assembles a [`Tech`] from a parsed metal-stack LEF, a parsed
    /// standard-cell LEF, and a layer map.
    ///
    /// Routing layers are numbered bottom-up in metal-stack file order,
    /// starting at 1. All micron dimensions are converted to database units
    /// here, so every later computation is pure integer arithmetic.
    pub fn new(stack: LefData, cells: LefData, layer_map: LayerMap) -> TechResult<Self> {
        let database_units = stack.database_units.ok_or(TechError::MissingRecord {
            what: "UNITS DATABASE MICRONS in metal-stack LEF",
        })?;

        let mut layers = Vec::with_capacity(stack.layers.len());
        let mut layers_by_name = IndexMap::new();
        for (index, lef_layer) in stack.layers.into_iter().enumerate() {
            let number = index + 1;
            let layer = RoutingLayer::from_lef(lef_layer, number, database_units)?;
            debug!(
                layer = %layer.name,
                number,
                rogue_wire_width = layer.rogue_wire_width,
                "routing layer"
            );
            layers_by_name.insert(layer.name.clone(), index);
            layers.push(layer);
        }

        let mut placement_sites = IndexMap::new();
        for site in stack.sites {
            placement_sites.insert(
                site.name.clone(),
                PlacementSite {
                    width: to_db(&site.name, "site width", site.width, database_units)?,
                    height: to_db(&site.name, "site height", site.height, database_units)?,
                    name: site.name,
                    class: site.class,
                },
            );
        }

        let mut standard_cells = IndexMap::new();
        let mut fill_cells = IndexMap::new();
        for m in cells.macros {
            let cell = StandardCell {
                width: to_db(&m.name, "cell width", m.width, database_units)?,
                height: to_db(&m.name, "cell height", m.height, database_units)?,
                name: m.name.clone(),
                is_filler: m.is_filler,
            };
            if m.is_filler {
                fill_cells.insert(m.name, cell);
            } else {
                standard_cells.insert(m.name, cell);
            }
        }

        Ok(Self {
            database_units,
            manufacturing_grid: stack.manufacturing_grid,
            layers,
            layers_by_name,
            placement_sites,
            standard_cells,
            fill_cells,
            layer_map,
        })
    }

    /// The number of routing layers.
    pub fn routing_layer_count(&self) -> usize {
        self.layers.len()
    }

    /// All routing layers, bottom-up.
    pub fn layers(&self) -> &[RoutingLayer] {
        &self.layers
    }

    /// Looks up a routing layer by its 1-indexed number.
    pub fn layer_by_number(&self, number: usize) -> Option<&RoutingLayer> {
        if number == 0 {
            return None;
        }
        self.layers.get(number - 1)
    }

    /// Looks up a routing layer by name.
    pub fn layer_by_name(&self, name: &str) -> Option<&RoutingLayer> {
        self.layers_by_name.get(name).map(|i| &self.layers[*i])
    }

    /// The routing layer directly above `number`, if any.
    pub fn layer_above(&self, number: usize) -> Option<&RoutingLayer> {
        self.layer_by_number(number + 1)
    }

    /// The routing layer directly below `number`, if any.
    pub fn layer_below(&self, number: usize) -> Option<&RoutingLayer> {
        if number <= 1 {
            return None;
        }
        self.layer_by_number(number - 1)
    }

    /// Resolves a GDS `(layer, datatype)` pair to a routing layer.
    ///
    /// Returns [`None`] for device and via geometry: GDS layers that either
    /// have no layer-map entry or map to a non-routing layer.
    pub fn routing_layer_for_gds(&self, layer: i16, datatype: i16) -> Option<&RoutingLayer> {
        self.layer_map
            .name_for(layer, datatype)
            .and_then(|name| self.layer_by_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lef::parse_lef;

    fn test_tech() -> Tech {
        let stack = parse_lef(
            "\
UNITS
  DATABASE MICRONS 2000 ;
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
",
        )
        .unwrap();
        let cells = parse_lef(
            "\
MACRO INVX1
  CLASS CORE ;
  SIZE 0.6 BY 2.0 ;
END INVX1
MACRO FILL8
  CLASS CORE SPACER ;
  SIZE 1.6 BY 2.0 ;
END FILL8
",
        )
        .unwrap();
        let map = LayerMap::parse("metal1 drawing 19 0\nmetal2 drawing 21 0\n").unwrap();
        Tech::new(stack, cells, map).unwrap()
    }

    #[test]
    fn layers_are_numbered_bottom_up() {
        let tech = test_tech();
        assert_eq!(tech.routing_layer_count(), 2);
        assert_eq!(tech.layer_by_number(1).unwrap().name, "metal1");
        assert_eq!(tech.layer_by_number(2).unwrap().name, "metal2");
        assert!(tech.layer_by_number(3).is_none());
        assert_eq!(tech.layer_above(1).unwrap().number, 2);
        assert!(tech.layer_above(2).is_none());
        assert!(tech.layer_below(1).is_none());
        assert_eq!(tech.layer_below(2).unwrap().number, 1);
    }

    #[test]
    fn gds_pairs_resolve_through_the_layer_map() {
        let tech = test_tech();
        assert_eq!(tech.routing_layer_for_gds(19, 0).unwrap().number, 1);
        assert_eq!(tech.routing_layer_for_gds(21, 0).unwrap().number, 2);
        // Device geometry has no routing layer.
        assert!(tech.routing_layer_for_gds(5, 0).is_none());
    }

    #[test]
    fn sites_and_cells_convert_to_database_units() {
        let tech = test_tech();
        let site = &tech.placement_sites["unit"];
        assert_eq!((site.width, site.height), (400, 4000));
        assert!(tech.standard_cells.contains_key("INVX1"));
        assert!(tech.fill_cells.contains_key("FILL8"));
        assert_eq!(tech.fill_cells["FILL8"].width, 3200);
    }
}

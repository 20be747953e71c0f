//! JSON dump of a computed layout, for inspection and golden-file diffing.

use crate::layout::{ComboLayout, ComboPlacement, Route};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub placements: Vec<PlacementDump>,
    pub routes: Vec<RouteDump>,
}

#[derive(Debug, Serialize)]
pub struct PlacementDump {
    pub combo_index: usize,
    pub label_rect: [f64; 4],
    pub slot_position: [f64; 2],
    pub region: String,
    pub clearance: f64,
}

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub combo_index: usize,
    pub trigger_key_index: usize,
    pub points: Vec<[f64; 2]>,
    /// `None` for the straight-line fallback of an unroutable connector.
    pub cost: Option<f64>,
}

impl LayoutDump {
    pub fn from_layout(layout: &ComboLayout) -> Self {
        let placements = layout.placements.iter().map(dump_placement).collect();
        let routes = layout.routes.iter().map(dump_route).collect();
        LayoutDump { placements, routes }
    }
}

fn dump_placement(placement: &ComboPlacement) -> PlacementDump {
    let rect = placement.label_rect;
    PlacementDump {
        combo_index: placement.combo_index,
        label_rect: [rect.left, rect.top, rect.width, rect.height],
        slot_position: [placement.slot.position.x, placement.slot.position.y],
        region: format!("{:?}", placement.slot.region),
        clearance: placement.slot.clearance,
    }
}

fn dump_route(route: &Route) -> RouteDump {
    RouteDump {
        combo_index: route.combo_index,
        trigger_key_index: route.trigger_key_index,
        points: route
            .simplified_path
            .iter()
            .map(|p| [p.x, p.y])
            .collect(),
        cost: route.cost.is_finite().then_some(route.cost),
    }
}

pub fn write_layout_dump(path: &Path, layout: &ComboLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

pub fn layout_dump_string(layout: &ComboLayout) -> anyhow::Result<String> {
    let dump = LayoutDump::from_layout(layout);
    Ok(serde_json::to_string_pretty(&dump)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::layout::slots::{RegionType, Slot};

    #[test]
    fn infinite_route_cost_serializes_as_null() {
        let layout = ComboLayout {
            placements: vec![ComboPlacement {
                combo_index: 0,
                label_rect: Rect::new(10.0, 10.0, 25.0, 20.0),
                slot: Slot::new(Point::new(22.5, 20.0), RegionType::Exterior, 3.0),
            }],
            routes: vec![Route {
                combo_index: 0,
                trigger_key_index: 2,
                raster_path: vec![(0, 0), (5, 5)],
                simplified_path: vec![Point::new(22.5, 20.0), Point::new(80.0, 80.0)],
                cost: f64::INFINITY,
            }],
        };
        let json = layout_dump_string(&layout).unwrap();
        assert!(json.contains("\"cost\": null"));
        assert!(json.contains("\"region\": \"Exterior\""));
    }
}

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizing of the combo label box relative to the combo's average key size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    pub width_ratio: f64,
    pub min_width_ratio: f64,
    pub height_ratio: f64,
    pub min_height_ratio: f64,
    /// Gap between the name line and the output text block.
    pub text_gap_ratio: f64,
    pub min_text_gap: f64,
    /// Vertical padding inside the label box.
    pub pad_ratio: f64,
    pub min_pad: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            width_ratio: 0.5,
            min_width_ratio: 0.45,
            height_ratio: 0.4,
            min_height_ratio: 0.35,
            text_gap_ratio: 0.15,
            min_text_gap: 1.0,
            pad_ratio: 0.05,
            min_pad: 1.5,
        }
    }
}

/// Candidate slot generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Key pairs closer than this (× avg key size) get an inter-key slot.
    pub inter_key_threshold_ratio: f64,
    /// Interior/exterior grid spacing as a ratio of avg key size.
    pub grid_spacing_ratio: f64,
    pub slot_size: f64,
    /// Interior slots need clearance above this × slot size.
    pub interior_clearance_ratio: f64,
    /// Empty band wider than this × avg key width counts as a split gap.
    pub split_gap_ratio: f64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            inter_key_threshold_ratio: 1.5,
            grid_spacing_ratio: 0.6,
            slot_size: 10.0,
            interior_clearance_ratio: 0.3,
            split_gap_ratio: 0.5,
        }
    }
}

/// Slot assignment cost weights and fallback parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignConfig {
    /// Trigger keys closer than this (× avg key size) count as connected.
    pub adjacency_threshold_ratio: f64,
    pub preferred_candidates: usize,
    pub fallback_candidates: usize,
    pub min_candidates: usize,
    pub key_overlap_weight: f64,
    pub spacing_weight: f64,
    pub clearance_weight: f64,
    pub region_bonus_ratio: f64,
    pub interior_bonus_ratio: f64,
    pub multi_key_penalty_ratio: f64,
    pub perimeter_step_ratio: f64,
    pub min_perimeter_step: f64,
    pub spiral_step_ratio: f64,
    pub min_spiral_step: f64,
    pub spiral_rings: usize,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            adjacency_threshold_ratio: 1.7,
            preferred_candidates: 20,
            fallback_candidates: 30,
            min_candidates: 10,
            key_overlap_weight: 2.0,
            spacing_weight: 1.0,
            clearance_weight: 0.2,
            region_bonus_ratio: 0.6,
            interior_bonus_ratio: 0.3,
            multi_key_penalty_ratio: 0.9,
            perimeter_step_ratio: 0.4,
            min_perimeter_step: 8.0,
            spiral_step_ratio: 0.2,
            min_spiral_step: 4.0,
            spiral_rings: 8,
        }
    }
}

/// Routing grid construction and A* costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Grid cell size as a ratio of avg key size.
    pub cell_ratio: f64,
    pub min_cell: f64,
    /// Margin around the keyboard bounding box, ratio of avg key size.
    pub margin_ratio: f64,
    pub min_margin: f64,
    pub base_cost: f64,
    pub near_key_cost: f64,
    pub blocked_cost: f64,
    pub bend_penalty: f64,
    /// Congestion surcharge for cells already claimed by a routed path.
    pub used_cell_surcharge: f64,
    /// Ring bound for relocating a blocked start/goal cell.
    pub unblock_rings: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            cell_ratio: 0.06,
            min_cell: 2.0,
            margin_ratio: 0.6,
            min_margin: 30.0,
            base_cost: 1.0,
            near_key_cost: 10.0,
            blocked_cost: 1000.0,
            bend_penalty: 5.0,
            used_cell_surcharge: 5.0,
            unblock_rings: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Canvas padding every label is clamped inside.
    pub padding: Padding,
    pub label: LabelConfig,
    pub slot: SlotConfig,
    pub assign: AssignConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Padding(pub f64);

impl Default for Padding {
    fn default() -> Self {
        Padding(5.0)
    }
}

/// Load a config from a JSON file; `None` yields the defaults. Unknown
/// fields are ignored and missing sections fall back to their defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let parsed: LayoutConfig = serde_json::from_str(&contents)?;
    Ok(parsed)
}

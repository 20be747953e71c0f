#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod scene;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;

pub use config::LayoutConfig;
pub use geometry::{Point, Rect};
pub use ir::{ComboSpec, FixedMetrics, FontRole, HasFootprint, TextMeasure};
pub use layout::{compute_layout, ComboLayout, ComboPlacement, LayoutCache, Route};
pub use scene::{load_scene, parse_scene, Scene, SceneError};
pub use text_metrics::FontMetrics;

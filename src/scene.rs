//! Scene document: the JSON input describing a keyboard, its combos, and
//! the canvas to lay them out on.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::geometry::Rect;
use crate::ir::ComboSpec;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scene: {0}")]
    Invalid(String),
}

/// A keyboard scene as supplied on disk. Combos may reference out-of-range
/// key indices; the engine drops those references rather than failing, so
/// validation here only rejects a scene no layout could be computed for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub canvas: Rect,
    pub keys: Vec<Rect>,
    #[serde(default)]
    pub combos: Vec<ComboSpec>,
}

impl Scene {
    fn validate(self) -> Result<Self, SceneError> {
        if self.canvas.is_empty() {
            return Err(SceneError::Invalid("canvas has no area".to_string()));
        }
        if let Some(idx) = self.keys.iter().position(Rect::is_empty) {
            return Err(SceneError::Invalid(format!("key {idx} has no area")));
        }
        Ok(self)
    }
}

pub fn parse_scene(input: &str) -> Result<Scene, SceneError> {
    let scene: Scene = serde_json::from_str(input)?;
    scene.validate()
}

pub fn load_scene(path: &Path) -> Result<Scene, SceneError> {
    let contents = std::fs::read_to_string(path)?;
    parse_scene(&contents)
}

//! Level Anchors
//!
//! A level's fixed support points. Loaded once per level and never edited;
//! the live structure graph is rebuilt around it on every reset.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::game_config::ConfigError;

/// One anchor in a level file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub x: f32,
    pub y: f32,
}

impl From<AnchorPoint> for Vec2 {
    fn from(p: AnchorPoint) -> Vec2 {
        Vec2::new(p.x, p.y)
    }
}

/// Ordered, immutable list of a level's anchor positions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelAnchorConfig {
    #[serde(default)]
    name: String,
    anchors: Vec<AnchorPoint>,
}

impl LevelAnchorConfig {
    pub fn new(name: impl Into<String>, anchors: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            name: name.into(),
            anchors: anchors.into_iter().map(|p| AnchorPoint { x: p.x, y: p.y }).collect(),
        }
    }

    /// A level without anchors; placement falls back to its default span.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let level: LevelAnchorConfig = serde_json::from_str(json)?;
        if let Some(bad) = level.anchors.iter().find(|a| !a.x.is_finite() || !a.y.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "level '{}' has a non-finite anchor ({}, {})",
                level.name, bad.x, bad.y
            )));
        }
        Ok(level)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn anchors(&self) -> impl ExactSizeIterator<Item = Vec2> + '_ {
        self.anchors.iter().map(|&a| a.into())
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// (min, max) of the anchor x coordinates.
    pub fn x_extent(&self) -> Option<(f32, f32)> {
        self.anchors().fold(None, |acc, p| match acc {
            None => Some((p.x, p.x)),
            Some((lo, hi)) => Some((lo.min(p.x), hi.max(p.x))),
        })
    }

    /// Mean anchor height, or 0 without anchors.
    pub fn mean_y(&self) -> f32 {
        if self.anchors.is_empty() {
            return 0.0;
        }
        self.anchors.iter().map(|a| a.y).sum::<f32>() / self.anchors.len() as f32
    }
}

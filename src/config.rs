use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the user outlines the selection region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionTool {
    /// Axis-aligned rectangle between press and current position
    #[default]
    Box,
    /// Free-form polyline following the pointer
    Lasso,
}

/// Which triangles count as selected by a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Any part of the projected triangle touches the region
    #[default]
    Intersection,
    /// The projected centroid lies inside the region
    Centroid,
}

/// Runtime-togglable viewer options, bound directly by the control panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub tool: SelectionTool,
    pub selection_mode: SelectionMode,
    pub live_update: bool,
    pub wireframe: bool,
    pub use_bounds_tree: bool,
    pub display_helper: bool,
    pub helper_depth: u32,
    pub auto_rotate: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            tool: SelectionTool::Box,
            selection_mode: SelectionMode::Intersection,
            live_update: false,
            wireframe: false,
            use_bounds_tree: true,
            display_helper: false,
            helper_depth: 10,
            auto_rotate: false,
        }
    }
}

impl Params {
    pub const MAX_HELPER_DEPTH: u32 = 40;

    pub fn from_json(json: &str) -> Result<Self> {
        let mut params: Params = serde_json::from_str(json).context("Invalid params JSON")?;
        params.helper_depth = params.helper_depth.min(Self::MAX_HELPER_DEPTH);
        Ok(params)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .context(format!("Failed to read params file: {:?}", path))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = Params::default();
        assert_eq!(params.tool, SelectionTool::Box);
        assert_eq!(params.selection_mode, SelectionMode::Intersection);
        assert!(!params.live_update);
        assert!(params.use_bounds_tree);
        assert!(!params.display_helper);
        assert_eq!(params.helper_depth, 10);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params = Params::from_json(r#"{ "tool": "lasso", "live_update": true }"#).unwrap();
        assert_eq!(params.tool, SelectionTool::Lasso);
        assert!(params.live_update);
        assert!(params.use_bounds_tree);
        assert_eq!(params.helper_depth, 10);
    }

    #[test]
    fn helper_depth_is_clamped() {
        let params = Params::from_json(r#"{ "helper_depth": 500 }"#).unwrap();
        assert_eq!(params.helper_depth, Params::MAX_HELPER_DEPTH);
    }

    #[test]
    fn selection_mode_names() {
        let params = Params::from_json(r#"{ "selection_mode": "centroid" }"#).unwrap();
        assert_eq!(params.selection_mode, SelectionMode::Centroid);
        assert!(Params::from_json(r#"{ "selection_mode": "everything" }"#).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Params::load("/definitely/not/here.json").is_err());
    }
}

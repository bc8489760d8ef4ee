// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "mesh-lasso")]
#[command(about = "Mesh viewer with BVH-accelerated lasso selection", long_about = None)]
pub struct Cli {
    /// Hide the control panel and stats overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Plain mesh viewer without selection overlay or bounds tree
    #[arg(long = "viewer-only", default_value = "false")]
    pub viewer_only: bool,

    /// JSON file overriding the default viewer params
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// glTF file to display instead of the torus knot
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Camera far plane, clamped to (near, 100]
    #[arg(long, default_value_t = crate::camera::MAX_FAR)]
    pub far: f32,
}

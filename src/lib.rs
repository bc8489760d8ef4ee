pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod helper;
pub mod input;
pub mod lasso;
pub mod loaders;
pub mod math;
pub mod mesh;
pub mod panel;
pub mod renderer;
pub mod scene;
pub mod selection;
pub mod stats;
pub mod types;
pub mod viewer;

pub use config::{Params, SelectionMode, SelectionTool};
pub use scene::Variant;
pub use viewer::{FrameUpdate, Viewer};

use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use mesh_lasso::cli::Cli;
use mesh_lasso::config::Params;
use mesh_lasso::core::input_adapter::WinitPointer;
use mesh_lasso::core::window::WindowDimensions;
use mesh_lasso::input::InputEvent;
use mesh_lasso::loaders::load_gltf_geometry;
use mesh_lasso::mesh::{Geometry, TorusKnot};
use mesh_lasso::renderer::Renderer;
use mesh_lasso::scene::Variant;
use mesh_lasso::viewer::Viewer;

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer>,
    renderer: Option<Renderer>,
    pointer: WinitPointer,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            viewer: None,
            renderer: None,
            pointer: WinitPointer::new(),
        }
    }

    fn load(&self) -> anyhow::Result<(Params, Geometry)> {
        let params = match &self.cli.config {
            Some(path) => Params::load(path)?,
            None => Params::default(),
        };
        let geometry = match &self.cli.model {
            Some(path) => load_gltf_geometry(path)?,
            None => TorusKnot::default().build().to_non_indexed(),
        };
        Ok((params, geometry))
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(viewer), Some(renderer)) =
            (&self.window, &mut self.viewer, &mut self.renderer)
        else {
            return;
        };

        let update = viewer.tick();
        if update.resized {
            let size = viewer.viewport();
            renderer.resize(size.width, size.height);
        }

        match renderer.render(window, viewer, update) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = renderer.size();
                renderer.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (params, geometry) = match self.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("Failed to load scene: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Mesh Lasso")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let variant = if self.cli.viewer_only {
            Variant::Viewer
        } else {
            Variant::Selection
        };
        let viewer = Viewer::new(
            geometry,
            variant,
            params,
            WindowDimensions::new(size.width.max(1), size.height.max(1)),
            self.cli.far,
        );

        let renderer =
            match pollster::block_on(Renderer::new(window.clone(), &viewer, !self.cli.no_ui)) {
                Ok(r) => r,
                Err(e) => {
                    log::error!("Failed to initialize renderer: {}", e);
                    event_loop.exit();
                    return;
                }
            };

        self.window = Some(window);
        self.viewer = Some(viewer);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        let consumed = match (&mut self.renderer, &self.window) {
            (Some(renderer), Some(window)) => renderer.handle_event(window, &event),
            _ => false,
        };

        // Pointer state is tracked even for events egui keeps, so releases
        // and resizes always reach the viewer
        if let Some(input) = self.pointer.translate(&event) {
            let always = matches!(
                input,
                InputEvent::PointerUp { .. } | InputEvent::Resize { .. }
            );
            if !consumed || always {
                if let Some(viewer) = &mut self.viewer {
                    viewer.push_event(input);
                }
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);

    log::info!("Mesh Lasso - left drag selects, right drag orbits, wheel zooms, Escape quits");
    event_loop.run_app(&mut app)?;

    Ok(())
}

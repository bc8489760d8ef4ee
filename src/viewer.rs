//! Per-frame application state.
//!
//! [`Viewer`] owns the scene and everything the input callbacks used to
//! share. Window callbacks only [`push_event`](Viewer::push_event); the
//! redraw callback calls [`tick`](Viewer::tick) once, which drains the queue
//! and brings the scene up to date before the renderer reads it.

use glam::{Mat4, Quat};

use crate::camera::PerspectiveCamera;
use crate::config::Params;
use crate::controls::OrbitControls;
use crate::core::controller::Button;
use crate::core::window::WindowDimensions;
use crate::input::{InputEvent, InputQueue, SelectionInput};
use crate::mesh::Geometry;
use crate::scene::{bootstrap, Scene, SceneHandles, Variant};
use crate::selection::select_triangles;
use crate::stats::FrameStats;

/// Radians per second when auto-rotating
pub const AUTO_ROTATE_SPEED: f32 = 0.5;

/// What changed during one frame, for the renderer to re-upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    pub lasso_rebuilt: bool,
    pub selection_changed: bool,
    pub helper_rebuilt: bool,
    pub resized: bool,
}

pub struct Viewer {
    pub scene: Scene,
    pub handles: SceneHandles,
    pub params: Params,
    variant: Variant,
    input: SelectionInput,
    queue: InputQueue,
    controls: OrbitControls,
    stats: FrameStats,
    viewport: WindowDimensions,
    selected: Vec<u32>,
    applied: Params,
}

impl Viewer {
    pub fn new(
        geometry: Geometry,
        variant: Variant,
        params: Params,
        viewport: WindowDimensions,
        far: f32,
    ) -> Self {
        let (scene, handles) = bootstrap(
            geometry,
            variant,
            viewport.aspect(),
            far,
            params.helper_depth as usize,
        );

        let mut controls = match scene.camera(handles.camera) {
            Some(camera) => OrbitControls::new(camera),
            None => OrbitControls::new(&PerspectiveCamera::new(viewport.aspect())),
        };
        // Primary drags draw the lasso in the selection viewer
        controls.enable_pan = variant == Variant::Viewer;

        Self {
            scene,
            handles,
            applied: params.clone(),
            params,
            variant,
            input: SelectionInput::new(),
            queue: InputQueue::new(),
            controls,
            stats: FrameStats::new(),
            viewport,
            selected: Vec::new(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn input(&self) -> &SelectionInput {
        &self.input
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn viewport(&self) -> WindowDimensions {
        self.viewport
    }

    /// Selected triangle indices, sorted ascending
    pub fn selected(&self) -> &[u32] {
        &self.selected
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.scene.camera(self.handles.camera)
    }

    pub fn mesh_world_matrix(&self) -> Mat4 {
        self.scene.world_matrix(self.handles.mesh)
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Sample the frame clock and advance by the measured delta
    pub fn tick(&mut self) -> FrameUpdate {
        let delta = self.stats.begin_frame();
        self.advance(delta)
    }

    /// One frame of work with an explicit `delta` in seconds
    pub fn advance(&mut self, delta: f32) -> FrameUpdate {
        let mut update = FrameUpdate::default();

        let events: Vec<InputEvent> = self.queue.drain().collect();
        for event in events {
            self.handle_event(event, &mut update);
        }

        self.apply_params(&mut update);

        if self.input.take_shape_dirty() {
            if let Some(lasso) = self.handles.lasso {
                if let Some(overlay) = self.scene.lasso_mut(lasso) {
                    overlay.rebuild(self.input.points());
                }
                self.scene.node_mut(lasso).frustum_culled = false;
                update.lasso_rebuilt = true;
            }
        }

        if let (Some(lasso), Some(camera)) = (self.handles.lasso, self.camera().cloned()) {
            if let Some(overlay) = self.scene.lasso_mut(lasso) {
                overlay.update_scale(&camera);
            }
        }

        if self.input.take_selection_dirty() {
            self.update_selection();
            update.selection_changed = true;
        }

        if self.params.auto_rotate {
            let group = self.scene.node_mut(self.handles.group);
            group.transform.rotation *= Quat::from_rotation_y(delta * AUTO_ROTATE_SPEED);
        }

        update
    }

    fn handle_event(&mut self, event: InputEvent, update: &mut FrameUpdate) {
        let selecting = self.variant == Variant::Selection;

        match event {
            InputEvent::PointerDown { x, y, button } => {
                if selecting && button == Button::Primary {
                    self.input.pointer_down(x, y, self.viewport);
                    self.set_lasso_visible(self.input.is_dragging());
                }
                self.controls.pointer_down(button, x, y);
            }
            InputEvent::PointerMove { x, y, buttons } => {
                if selecting {
                    self.input
                        .pointer_move(x, y, buttons, self.viewport, &self.params);
                }
                if let Some(camera) = self.scene.camera_mut(self.handles.camera) {
                    self.controls
                        .pointer_move(camera, x, y, self.viewport.height as f32);
                }
            }
            InputEvent::PointerUp { button, .. } => {
                if selecting && button == Button::Primary {
                    self.input.pointer_up();
                    self.set_lasso_visible(false);
                }
                self.controls.pointer_up();
            }
            InputEvent::Wheel { delta } => {
                if let Some(camera) = self.scene.camera_mut(self.handles.camera) {
                    self.controls.wheel(camera, delta);
                }
            }
            InputEvent::Resize { width, height } => {
                let Some(camera) = self.scene.camera_mut(self.handles.camera) else {
                    return;
                };
                if camera.set_viewport(width, height) {
                    self.viewport = WindowDimensions::new(width, height);
                    update.resized = true;
                } else {
                    log::debug!("Ignoring zero-sized resize {}x{}", width, height);
                }
            }
        }
    }

    fn set_lasso_visible(&mut self, visible: bool) {
        if let Some(lasso) = self.handles.lasso {
            self.scene.node_mut(lasso).visible = visible;
        }
    }

    /// Push panel-edited params onto the scene
    fn apply_params(&mut self, update: &mut FrameUpdate) {
        self.params.helper_depth = self.params.helper_depth.min(Params::MAX_HELPER_DEPTH);

        if let Some(mesh) = self.scene.mesh_mut(self.handles.mesh) {
            mesh.material.wireframe = self.params.wireframe;
        }

        if let Some(helper) = self.handles.helper {
            self.scene.node_mut(helper).visible = self.params.display_helper;
            if self.params.display_helper {
                update.helper_rebuilt = self.scene.set_helper_depth(
                    helper,
                    self.handles.mesh,
                    self.params.helper_depth as usize,
                );
            }
        }

        if self.params.selection_mode != self.applied.selection_mode
            || self.params.use_bounds_tree != self.applied.use_bounds_tree
        {
            self.input.request_selection_update();
        }
        self.applied = self.params.clone();
    }

    fn update_selection(&mut self) {
        let Some(camera) = self.camera() else {
            return;
        };
        let mvp = camera.view_projection() * self.mesh_world_matrix();
        let Some(mesh) = self.scene.mesh(self.handles.mesh) else {
            return;
        };

        self.selected = select_triangles(
            mesh,
            &mvp,
            &self.input.polygon(),
            self.params.selection_mode,
            self.params.use_bounds_tree,
        );
        log::debug!(
            "Selected {} of {} triangles",
            self.selected.len(),
            mesh.geometry().triangle_count()
        );
    }
}

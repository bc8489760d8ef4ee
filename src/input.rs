//! Pointer input as an explicit event queue plus the drag state machine that
//! turns it into a selection outline.

use glam::Vec2;
use std::collections::VecDeque;

use crate::config::{Params, SelectionTool};
use crate::core::controller::{Button, Buttons};
use crate::core::window::WindowDimensions;

/// Floats per outline point (x, y, z)
pub const POINT_STRIDE: usize = 3;

/// Platform-independent input, positions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, button: Button },
    PointerMove { x: f32, y: f32, buttons: Buttons },
    PointerUp { x: f32, y: f32, button: Button },
    /// Positive zooms out
    Wheel { delta: f32 },
    Resize { width: u32, height: u32 },
}

/// FIFO of input events, filled by window callbacks and drained once per frame
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// Drag state machine producing the selection outline
///
/// The outline is a closed polyline in normalized device coordinates stored
/// as flat `[x, y, 0]` triples; the last point always repeats the first.
/// With the default box tool it is exactly five points.
#[derive(Debug, Clone)]
pub struct SelectionInput {
    state: DragState,
    start_ndc: Vec2,
    prev_raw: Vec2,
    points: Vec<f32>,
    shape_dirty: bool,
    selection_dirty: bool,
}

impl Default for SelectionInput {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionInput {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            start_ndc: Vec2::ZERO,
            prev_raw: Vec2::ZERO,
            points: Vec::new(),
            shape_dirty: false,
            selection_dirty: false,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }

    /// Outline as 2D points, closing point included
    pub fn polygon(&self) -> Vec<Vec2> {
        self.points
            .chunks_exact(POINT_STRIDE)
            .map(|p| Vec2::new(p[0], p[1]))
            .collect()
    }

    pub fn shape_dirty(&self) -> bool {
        self.shape_dirty
    }

    pub fn selection_dirty(&self) -> bool {
        self.selection_dirty
    }

    pub fn take_shape_dirty(&mut self) -> bool {
        std::mem::take(&mut self.shape_dirty)
    }

    pub fn take_selection_dirty(&mut self) -> bool {
        std::mem::take(&mut self.selection_dirty)
    }

    /// Force a selection recompute, e.g. after a param change
    pub fn request_selection_update(&mut self) {
        if !self.points.is_empty() {
            self.selection_dirty = true;
        }
    }

    /// Idle -> Dragging
    pub fn pointer_down(&mut self, x: f32, y: f32, viewport: WindowDimensions) {
        let Some(ndc) = viewport.to_ndc(x, y) else {
            return;
        };

        self.state = DragState::Dragging;
        self.prev_raw = Vec2::new(x, y);
        self.start_ndc = ndc;
        self.points.clear();
        // The cleared outline must reach the line buffer too
        self.shape_dirty = true;
    }

    /// Dragging -> Dragging; ignored unless dragging with the primary button held
    pub fn pointer_move(
        &mut self,
        x: f32,
        y: f32,
        buttons: Buttons,
        viewport: WindowDimensions,
        params: &Params,
    ) {
        if self.state != DragState::Dragging || !buttons.contains(Button::Primary) {
            return;
        }
        let Some(ndc) = viewport.to_ndc(x, y) else {
            return;
        };

        let raw = Vec2::new(x, y);
        let moved = raw != self.prev_raw;
        self.prev_raw = raw;

        match params.tool {
            SelectionTool::Box => self.write_box(ndc),
            SelectionTool::Lasso if moved || self.points.is_empty() => self.append_lasso(ndc),
            SelectionTool::Lasso => {}
        }

        if moved {
            self.shape_dirty = true;
            if params.live_update {
                self.selection_dirty = true;
            }
        }
    }

    /// Dragging -> Idle, committing a non-empty outline
    pub fn pointer_up(&mut self) {
        if self.state != DragState::Dragging {
            return;
        }
        self.state = DragState::Idle;
        if !self.points.is_empty() {
            self.selection_dirty = true;
        }
    }

    fn push_point(&mut self, p: Vec2) {
        self.points.extend_from_slice(&[p.x, p.y, 0.0]);
    }

    fn write_box(&mut self, current: Vec2) {
        let start = self.start_ndc;
        self.points.clear();
        for p in [
            start,
            Vec2::new(current.x, start.y),
            current,
            Vec2::new(start.x, current.y),
            start,
        ] {
            self.push_point(p);
        }
    }

    fn append_lasso(&mut self, current: Vec2) {
        if self.points.is_empty() {
            self.push_point(self.start_ndc);
        } else {
            // drop the closing point, re-added below
            self.points.truncate(self.points.len() - POINT_STRIDE);
        }
        self.push_point(current);
        self.push_point(self.start_ndc);
    }
}

use glam::Vec2;
use mesh_lasso::config::{Params, SelectionTool};
use mesh_lasso::core::controller::Buttons;
use mesh_lasso::core::window::WindowDimensions;
use mesh_lasso::input::{DragState, SelectionInput, POINT_STRIDE};

const VIEWPORT: WindowDimensions = WindowDimensions {
    width: 800,
    height: 600,
};

fn box_params(live_update: bool) -> Params {
    Params {
        tool: SelectionTool::Box,
        live_update,
        ..Params::default()
    }
}

fn first_and_last(points: &[f32]) -> (&[f32], &[f32]) {
    (&points[..POINT_STRIDE], &points[points.len() - POINT_STRIDE..])
}

#[cfg(test)]
mod input_tests {
    use super::*;

    #[test]
    fn test_box_outline_is_closed_after_every_move() {
        let params = box_params(false);
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);

        for (x, y) in [(120.0, 90.0), (400.0, 500.0), (400.0, 500.0), (5.0, 5.0)] {
            input.pointer_move(x, y, Buttons::PRIMARY, VIEWPORT, &params);
            assert_eq!(input.points().len(), 15);
            let (first, last) = first_and_last(input.points());
            assert_eq!(first, last);
        }
    }

    #[test]
    fn test_lasso_outline_is_closed_after_every_move() {
        let params = Params {
            tool: SelectionTool::Lasso,
            ..Params::default()
        };
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);

        for i in 1..10 {
            let t = i as f32 * 20.0;
            input.pointer_move(100.0 + t, 100.0 + t * 0.5, Buttons::PRIMARY, VIEWPORT, &params);
            let (first, last) = first_and_last(input.points());
            assert_eq!(first, last);
        }
        assert!(input.polygon().len() >= 3);
    }

    #[test]
    fn test_repeated_position_does_not_dirty_shape() {
        let params = box_params(false);
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);
        input.take_shape_dirty();

        input.pointer_move(200.0, 150.0, Buttons::PRIMARY, VIEWPORT, &params);
        assert!(input.take_shape_dirty());

        input.pointer_move(200.0, 150.0, Buttons::PRIMARY, VIEWPORT, &params);
        assert!(!input.shape_dirty());
    }

    #[test]
    fn test_selection_waits_for_release_without_live_update() {
        let params = box_params(false);
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);

        for x in [150.0, 200.0, 250.0] {
            input.pointer_move(x, 200.0, Buttons::PRIMARY, VIEWPORT, &params);
            assert!(!input.selection_dirty());
        }

        input.pointer_up();
        assert!(input.selection_dirty());
    }

    #[test]
    fn test_release_without_points_does_not_select() {
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);
        input.pointer_up();

        assert!(input.points().is_empty());
        assert!(!input.selection_dirty());
        assert_eq!(input.state(), DragState::Idle);
    }

    #[test]
    fn test_live_update_marks_selection_on_move() {
        let params = box_params(true);
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);

        input.pointer_move(300.0, 250.0, Buttons::PRIMARY, VIEWPORT, &params);
        assert!(input.selection_dirty());
    }

    #[test]
    fn test_move_without_primary_leaves_points_alone() {
        let params = box_params(true);
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);
        input.pointer_move(300.0, 250.0, Buttons::PRIMARY, VIEWPORT, &params);
        let before = input.points().to_vec();
        input.take_shape_dirty();
        input.take_selection_dirty();

        input.pointer_move(500.0, 500.0, Buttons::NONE, VIEWPORT, &params);
        input.pointer_move(600.0, 20.0, Buttons::SECONDARY, VIEWPORT, &params);

        assert_eq!(input.points(), before.as_slice());
        assert!(!input.shape_dirty());
        assert!(!input.selection_dirty());
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let params = box_params(true);
        let mut input = SelectionInput::new();

        input.pointer_move(300.0, 250.0, Buttons::PRIMARY, VIEWPORT, &params);

        assert!(input.points().is_empty());
        assert!(!input.shape_dirty());
    }

    #[test]
    fn test_default_params_draw_closed_rectangle() {
        let params = Params::default();
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);

        for (x, y) in [(120.0, 90.0), (300.0, 250.0), (300.0, 250.0), (640.0, 20.0)] {
            input.pointer_move(x, y, Buttons::PRIMARY, VIEWPORT, &params);
            assert_eq!(input.points().len(), 15);
            let (first, last) = first_and_last(input.points());
            assert_eq!(first, last);
        }

        let polygon = input.polygon();
        assert_eq!(polygon.len(), 5);
        assert!(polygon[2].abs_diff_eq(Vec2::new(0.6, 14.0 / 15.0), 1e-6));
    }

    #[test]
    fn test_box_corners_in_ndc() {
        let params = box_params(false);
        let mut input = SelectionInput::new();
        input.pointer_down(100.0, 100.0, VIEWPORT);
        input.pointer_move(300.0, 250.0, Buttons::PRIMARY, VIEWPORT, &params);

        let start = Vec2::new(-0.75, 2.0 / 3.0);
        let end = Vec2::new(-0.25, 1.0 / 6.0);
        let polygon = input.polygon();
        assert_eq!(polygon.len(), 5);
        assert!(polygon[0].abs_diff_eq(start, 1e-6));
        assert!(polygon[1].abs_diff_eq(Vec2::new(end.x, start.y), 1e-6));
        assert!(polygon[2].abs_diff_eq(end, 1e-6));
        assert!(polygon[3].abs_diff_eq(Vec2::new(start.x, end.y), 1e-6));
        assert!(polygon[4].abs_diff_eq(start, 1e-6));
    }
}

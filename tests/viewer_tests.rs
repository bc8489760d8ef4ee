use glam::Vec2;
use mesh_lasso::config::{Params, SelectionTool};
use mesh_lasso::core::controller::{Button, Buttons};
use mesh_lasso::core::window::WindowDimensions;
use mesh_lasso::input::InputEvent;
use mesh_lasso::mesh::TorusKnot;
use mesh_lasso::scene::Variant;
use mesh_lasso::viewer::Viewer;

const DT: f32 = 1.0 / 60.0;

fn viewer_with(params: Params) -> Viewer {
    let geometry = TorusKnot::new(1.5, 0.5, 64, 8).build().to_non_indexed();
    Viewer::new(
        geometry,
        Variant::Selection,
        params,
        WindowDimensions::new(800, 600),
        100.0,
    )
}

fn box_viewer() -> Viewer {
    viewer_with(Params {
        tool: SelectionTool::Box,
        ..Params::default()
    })
}

fn drag(viewer: &mut Viewer, from: (f32, f32), to: (f32, f32)) {
    viewer.push_event(InputEvent::PointerDown {
        x: from.0,
        y: from.1,
        button: Button::Primary,
    });
    viewer.push_event(InputEvent::PointerMove {
        x: to.0,
        y: to.1,
        buttons: Buttons::PRIMARY,
    });
    viewer.push_event(InputEvent::PointerUp {
        x: to.0,
        y: to.1,
        button: Button::Primary,
    });
}

#[cfg(test)]
mod viewer_tests {
    use super::*;

    #[test]
    fn test_aspect_follows_last_resize() {
        let mut viewer = box_viewer();
        for (w, h) in [(1024, 768), (300, 900), (1920, 1080)] {
            viewer.push_event(InputEvent::Resize {
                width: w,
                height: h,
            });
        }
        let update = viewer.advance(DT);

        assert!(update.resized);
        let camera = viewer.camera().expect("camera");
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
        assert_eq!(viewer.viewport(), WindowDimensions::new(1920, 1080));
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut viewer = box_viewer();
        for _ in 0..5 {
            viewer.push_event(InputEvent::Resize {
                width: 640,
                height: 480,
            });
            viewer.advance(DT);
            assert_eq!(viewer.camera().map(|c| c.aspect), Some(640.0 / 480.0));
        }
    }

    #[test]
    fn test_drag_rectangle_end_to_end() {
        let mut viewer = box_viewer();
        drag(&mut viewer, (100.0, 100.0), (300.0, 250.0));
        assert_eq!(viewer.pending_events(), 3);

        let update = viewer.advance(DT);

        let polygon = viewer.input().polygon();
        let start = Vec2::new(-0.75, 2.0 / 3.0);
        let end = Vec2::new(-0.25, 1.0 / 6.0);
        assert_eq!(polygon.len(), 5);
        assert!(polygon[0].abs_diff_eq(start, 1e-6));
        assert!(polygon[2].abs_diff_eq(end, 1e-6));

        assert!(update.lasso_rebuilt);
        assert!(update.selection_changed);
        assert!(!viewer.input().shape_dirty());
        assert!(!viewer.input().selection_dirty());
        assert_eq!(viewer.pending_events(), 0);

        let lasso = viewer.handles.lasso.expect("lasso");
        let overlay = viewer.scene.lasso(lasso).expect("overlay");
        // four rectangle edges, two vertices each
        assert_eq!(overlay.segments().len(), 8);
        assert!(!viewer.scene.node(lasso).frustum_culled);
    }

    #[test]
    fn test_default_params_end_to_end() {
        let mut viewer = viewer_with(Params::default());
        drag(&mut viewer, (100.0, 100.0), (300.0, 250.0));
        viewer.advance(DT);

        let start = Vec2::new(-0.75, 2.0 / 3.0);
        let end = Vec2::new(-0.25, 1.0 / 6.0);
        let points = viewer.input().points();
        assert_eq!(points.len(), 15);
        assert_eq!(points[..3], points[12..]);

        let polygon = viewer.input().polygon();
        assert_eq!(polygon.len(), 5);
        assert!(polygon[0].abs_diff_eq(start, 1e-6));
        assert!(polygon[1].abs_diff_eq(Vec2::new(end.x, start.y), 1e-6));
        assert!(polygon[2].abs_diff_eq(end, 1e-6));
        assert!(polygon[3].abs_diff_eq(Vec2::new(start.x, end.y), 1e-6));
        assert!(polygon[4].abs_diff_eq(start, 1e-6));
        assert!(!viewer.input().shape_dirty());
        assert!(!viewer.input().selection_dirty());
    }

    #[test]
    fn test_click_without_drag_selects_nothing() {
        let mut viewer = viewer_with(Params::default());
        drag(&mut viewer, (400.0, 300.0), (400.0, 300.0));
        viewer.advance(DT);

        assert!(viewer.selected().is_empty());
    }

    #[test]
    fn test_shape_dirty_cleared_after_one_tick() {
        let mut viewer = box_viewer();
        viewer.push_event(InputEvent::PointerDown {
            x: 100.0,
            y: 100.0,
            button: Button::Primary,
        });
        viewer.push_event(InputEvent::PointerMove {
            x: 300.0,
            y: 250.0,
            buttons: Buttons::PRIMARY,
        });

        assert!(viewer.advance(DT).lasso_rebuilt);
        assert!(!viewer.input().shape_dirty());
        assert!(!viewer.advance(DT).lasso_rebuilt);
    }

    #[test]
    fn test_centered_box_selects_some_triangles() {
        let mut viewer = box_viewer();
        drag(&mut viewer, (300.0, 200.0), (500.0, 400.0));
        viewer.advance(DT);

        let selected = viewer.selected();
        let total = viewer
            .scene
            .mesh(viewer.handles.mesh)
            .map(|m| m.geometry().triangle_count())
            .expect("mesh");
        assert!(!selected.is_empty());
        assert!(selected.len() < total);
        assert!(selected.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_toggling_bounds_tree_keeps_selection() {
        let mut viewer = box_viewer();
        drag(&mut viewer, (250.0, 150.0), (550.0, 450.0));
        viewer.advance(DT);
        let with_tree = viewer.selected().to_vec();

        viewer.params.use_bounds_tree = false;
        let update = viewer.advance(DT);

        assert!(update.selection_changed);
        assert_eq!(viewer.selected(), with_tree.as_slice());
    }

    #[test]
    fn test_params_reach_the_scene() {
        let mut viewer = box_viewer();
        let helper = viewer.handles.helper.expect("helper");

        viewer.params.wireframe = true;
        viewer.params.display_helper = true;
        viewer.params.helper_depth = 3;
        let update = viewer.advance(DT);

        let mesh = viewer.scene.mesh(viewer.handles.mesh).expect("mesh");
        assert!(mesh.material.wireframe);
        assert!(viewer.scene.is_visible(helper));
        assert!(update.helper_rebuilt);
        assert_eq!(viewer.scene.helper(helper).map(|h| h.depth()), Some(3));

        viewer.params.display_helper = false;
        viewer.advance(DT);
        assert!(!viewer.scene.is_visible(helper));
    }

    #[test]
    fn test_auto_rotate_turns_the_group() {
        let mut viewer = box_viewer();
        viewer.params.auto_rotate = true;
        let before = viewer.mesh_world_matrix();
        viewer.advance(0.5);
        assert_ne!(viewer.mesh_world_matrix(), before);

        viewer.params.auto_rotate = false;
        let still = viewer.mesh_world_matrix();
        viewer.advance(0.5);
        assert_eq!(viewer.mesh_world_matrix(), still);
    }

    #[test]
    fn test_viewer_variant_ignores_primary_drag_for_selection() {
        let geometry = TorusKnot::new(1.5, 0.5, 64, 8).build().to_non_indexed();
        let mut viewer = Viewer::new(
            geometry,
            Variant::Viewer,
            Params::default(),
            WindowDimensions::new(800, 600),
            100.0,
        );
        drag(&mut viewer, (100.0, 100.0), (300.0, 250.0));
        let update = viewer.advance(DT);

        assert!(viewer.input().points().is_empty());
        assert!(!update.selection_changed);
        assert!(viewer.selected().is_empty());
    }
}

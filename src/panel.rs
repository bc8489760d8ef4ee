use crate::config::{Params, SelectionMode, SelectionTool};
use crate::core::bvh::BVHStats;
use crate::scene::Variant;

/// Read-only figures shown next to the controls
#[derive(Debug, Clone, Copy)]
pub struct PanelInfo {
    pub fps: f32,
    pub frame_ms: f32,
    pub triangles: usize,
    pub selected: usize,
    pub variant: Variant,
    pub bvh: Option<BVHStats>,
}

/// Draw the stats overlay and the params panel, editing `params` in place
pub fn show(ctx: &egui::Context, params: &mut Params, info: &PanelInfo) {
    egui::Window::new("Stats")
        .title_bar(false)
        .resizable(false)
        .fixed_pos(egui::pos2(10.0, 10.0))
        .show(ctx, |ui| {
            ui.heading(
                egui::RichText::new(format!("{:.0} FPS", info.fps))
                    .size(24.0)
                    .color(egui::Color32::from_rgb(74, 158, 255)),
            );
            ui.label(
                egui::RichText::new(format!("{:.2} ms", info.frame_ms))
                    .size(14.0)
                    .color(egui::Color32::GRAY),
            );
        });

    egui::Window::new("Params")
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .default_width(220.0)
        .show(ctx, |ui| {
            if info.variant == Variant::Selection {
                selection_controls(ui, params);
                ui.separator();
            }

            ui.checkbox(&mut params.wireframe, "wireframe");
            ui.checkbox(&mut params.auto_rotate, "rotate");

            ui.add_space(5.0);
            ui.separator();
            ui.monospace(format!("Triangles: {}", info.triangles));
            if info.variant == Variant::Selection {
                ui.monospace(format!("Selected:  {}", info.selected));
            }
            if let Some(stats) = info.bvh {
                ui.monospace(format!(
                    "BVH: {} nodes, depth {}",
                    stats.num_nodes, stats.max_depth
                ));
            }
        });
}

fn selection_controls(ui: &mut egui::Ui, params: &mut Params) {
    egui::ComboBox::from_label("tool")
        .selected_text(match params.tool {
            SelectionTool::Box => "box",
            SelectionTool::Lasso => "lasso",
        })
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut params.tool, SelectionTool::Box, "box");
            ui.selectable_value(&mut params.tool, SelectionTool::Lasso, "lasso");
        });

    egui::ComboBox::from_label("selection mode")
        .selected_text(match params.selection_mode {
            SelectionMode::Intersection => "intersection",
            SelectionMode::Centroid => "centroid",
        })
        .show_ui(ui, |ui| {
            ui.selectable_value(
                &mut params.selection_mode,
                SelectionMode::Intersection,
                "intersection",
            );
            ui.selectable_value(&mut params.selection_mode, SelectionMode::Centroid, "centroid");
        });

    ui.checkbox(&mut params.live_update, "live update");
    ui.checkbox(&mut params.use_bounds_tree, "use bounds tree");

    ui.add_space(5.0);
    ui.checkbox(&mut params.display_helper, "display helper");
    ui.add_enabled(
        params.display_helper,
        egui::Slider::new(&mut params.helper_depth, 1..=Params::MAX_HELPER_DEPTH)
            .text("helper depth"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(variant: Variant) -> PanelInfo {
        PanelInfo {
            fps: 60.0,
            frame_ms: 16.6,
            triangles: 60_000,
            selected: 12,
            variant,
            bvh: None,
        }
    }

    #[test]
    fn panel_runs_headless_without_touching_params() {
        let ctx = egui::Context::default();
        let mut params = Params::default();
        for variant in [Variant::Selection, Variant::Viewer] {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                show(ctx, &mut params, &info(variant));
            });
        }
        assert_eq!(params, Params::default());
    }
}

use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::{circle_visible, distance_to_segment, screen_to_world};

const EDGE_PICK_DISTANCE: f32 = 5.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 5.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
        self.scene.notify_viewport_changed();
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            if delta != egui::Vec2::ZERO {
                self.pan += delta;
                self.scene.notify_viewport_changed();
            }
        }
    }

    pub(in crate::app) fn visible_indices(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Vec<usize> {
        (0..screen_positions.len())
            .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
            .collect()
    }

    pub(in crate::app) fn hovered_index(
        pointer: Option<Pos2>,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = pointer?;
        visible_indices
            .iter()
            .filter_map(|index| {
                let distance = screen_positions[*index].distance(pointer);
                (distance <= screen_radii[*index]).then_some((*index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn hovered_edge(
        &self,
        pointer: Option<Pos2>,
        screen_positions: &[Pos2],
    ) -> Option<usize> {
        let pointer = pointer?;
        self.scene
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let distance = distance_to_segment(
                    pointer,
                    screen_positions[edge.from],
                    screen_positions[edge.to],
                );
                (distance <= EDGE_PICK_DISTANCE).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

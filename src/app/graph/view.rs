use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, vec2};

use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::highlight::build_highlight_state;
use super::super::render_utils::{
    blend_color, connection_color, dim_color, draw_background, edge_width, node_color,
    segment_maybe_visible, world_to_screen,
};
use super::super::scene::{GraphHandle, Selection};

const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const PATH_COLOR: Color32 = Color32::from_rgb(246, 180, 80);
const BADGE_COLOR: Color32 = Color32::from_rgb(196, 72, 72);
const LABEL_CHARS: usize = 28;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        self.refresh_scene();

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let highlight = build_highlight_state(&self.scene, &self.path_result);
        self.scene.set_highlight(highlight);

        if self.scene.node_count() == 0 {
            let message = if self.graph.is_empty() {
                "No entities loaded."
            } else {
                "No entities match the current filters."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(16.0),
                Color32::from_gray(200),
            );
            return;
        }

        let pan = self.pan;
        let zoom = self.zoom;
        let screen_positions = self
            .scene
            .nodes
            .iter()
            .map(|node| world_to_screen(rect, pan, zoom, node.world_pos))
            .collect::<Vec<_>>();
        let screen_radii = self
            .scene
            .nodes
            .iter()
            .map(|node| (node.base_radius * zoom.powf(0.45)).clamp(3.0, 42.0))
            .collect::<Vec<_>>();
        let visible_indices = Self::visible_indices(rect, &screen_positions, &screen_radii);

        let pointer = if response.hovered() {
            ui.input(|input| input.pointer.hover_pos())
        } else {
            None
        };
        let hovered =
            Self::hovered_index(pointer, &visible_indices, &screen_positions, &screen_radii);
        let hovered_edge = if hovered.is_none() {
            self.hovered_edge(pointer, &screen_positions)
        } else {
            None
        };
        let hovered_id = hovered.map(|index| self.scene.nodes[index].id.clone());
        self.scene.set_hovered(hovered_id);
        if hovered.is_some() || hovered_edge.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        self.draw_edges(&painter, rect, &screen_positions, hovered_edge);
        let animating = self.draw_nodes(
            ui,
            &painter,
            &visible_indices,
            &screen_positions,
            &screen_radii,
            hovered,
        );
        if animating {
            ui.ctx().request_repaint();
        }

        if let Some(index) = hovered {
            let graph_index = self.scene.nodes[index].graph_index;
            let node = &self.graph.nodes[graph_index];
            let mut text = format!(
                "{}  |  {}  |  {} connections",
                node.name,
                node.node_type.label(),
                self.graph.degree(graph_index)
            );
            if self.scene.nodes[index].hidden_count > 0 {
                text.push_str(&format!(
                    "  |  click to show {} more",
                    self.scene.nodes[index].hidden_count
                ));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            if let Some(index) = hovered {
                let id = self.scene.nodes[index].id.clone();
                self.expand_node(&id);
                self.scene.select_node(&id);
                self.popup = Some(id);
            } else if let Some(index) = hovered_edge {
                let id = self.scene.edges[index].id.clone();
                self.scene.select_edge(&id);
                self.popup = None;
            } else {
                self.scene.clear_selection();
                self.popup = None;
            }
        }

        if let Some(id) = self.popup.clone()
            && let Some(index) = self.scene.scene_index(&id)
        {
            let anchor = screen_positions[index] + vec2(screen_radii[index] + 8.0, -12.0);
            if rect.contains(anchor) {
                self.draw_node_popup(ui.ctx(), anchor, &id);
            }
        }
    }

    fn draw_edges(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        screen_positions: &[Pos2],
        hovered_edge: Option<usize>,
    ) {
        let highlight_active = self.scene.highlight.is_active();
        let selected_edge = match self.scene.selection() {
            Some(Selection::Edge(id)) => Some(id),
            _ => None,
        };

        for (index, scene_edge) in self.scene.edges.iter().enumerate() {
            let start = screen_positions[scene_edge.from];
            let end = screen_positions[scene_edge.to];
            if !segment_maybe_visible(rect, start, end) {
                continue;
            }

            let edge = &self.graph.edges[scene_edge.graph_index];
            let on_path = self.scene.highlight.path_edges.contains(&scene_edge.id);
            let is_selected = selected_edge == Some(&scene_edge.id);
            let mut width = edge_width(edge.strength, self.zoom);
            let mut color = connection_color(edge.connection);

            if on_path {
                width = (width * 1.8).max(2.5);
                color = PATH_COLOR;
            } else if is_selected || hovered_edge == Some(index) {
                width *= 1.6;
                color = blend_color(color, SELECTED_COLOR, 0.5);
            } else if highlight_active && self.scene.is_dimmed_edge(&scene_edge.id) {
                color = dim_color(color, 0.3);
            }

            let stroke = Stroke::new(width, color);
            if edge.connection.is_ai_discovered() {
                painter.extend(Shape::dashed_line(&[start, end], stroke, 7.0, 5.0));
            } else {
                painter.line_segment([start, end], stroke);
            }
        }
    }

    fn draw_nodes(
        &self,
        ui: &Ui,
        painter: &egui::Painter,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        hovered: Option<usize>,
    ) -> bool {
        let mut draw_order = visible_indices.to_vec();
        draw_order.sort_by(|a, b| {
            self.scene.nodes[*a]
                .base_radius
                .total_cmp(&self.scene.nodes[*b].base_radius)
        });

        let selected = self.scene.selected_node();
        let mut animating = false;

        for index in draw_order {
            let scene_node = &self.scene.nodes[index];
            let node = &self.graph.nodes[scene_node.graph_index];
            let position = screen_positions[index];
            let radius = screen_radii[index];

            let is_selected = selected == Some(&scene_node.id);
            let is_hovered = hovered == Some(index);
            let on_path = self.scene.highlight.path_nodes.contains(&scene_node.id);
            let is_related = self.scene.highlight.related_nodes.contains(&scene_node.id);

            let base_color = node_color(scene_node.node_type);
            let unselected_color = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.35)
            } else if on_path {
                blend_color(base_color, PATH_COLOR, 0.65)
            } else if self.scene.is_dimmed_node(&scene_node.id) {
                dim_color(base_color, 0.4)
            } else {
                base_color
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("node-selection", scene_node.id.as_str())),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                animating = true;
            }
            let color = blend_color(unselected_color, SELECTED_COLOR, selection_mix * 0.6);

            painter.circle_filled(position, radius, color);
            if selection_mix > 0.0 {
                painter.circle_stroke(
                    position,
                    radius + 3.0 + ((1.0 - selection_mix) * 6.0),
                    Stroke::new(1.5, SELECTED_COLOR.gamma_multiply(selection_mix)),
                );
            }

            let outline = if node.is_tier1() {
                Stroke::new(2.0, Color32::from_rgb(232, 200, 120))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(position, radius, outline);

            if scene_node.hidden_count > 0 {
                let badge_center = position + vec2(radius * 0.75, -radius * 0.75);
                let badge_radius = 8.0;
                painter.circle_filled(badge_center, badge_radius, BADGE_COLOR);
                painter.text(
                    badge_center,
                    Align2::CENTER_CENTER,
                    format!("+{}", scene_node.hidden_count),
                    FontId::proportional(9.5),
                    Color32::WHITE,
                );
            }

            let should_draw_label = is_selected
                || is_hovered
                || on_path
                || is_related
                || radius > 15.0
                || self.zoom > 1.2;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(&node.name, LABEL_CHARS),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        animating
    }
}

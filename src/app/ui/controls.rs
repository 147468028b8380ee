use eframe::egui::{self, Align, Layout, Ui};
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::circles::{
    ConnectionType, Era, NodeId, NodeType, PathResult, PathScope, SocialGraph,
    fuzzy_match_score,
};

use super::super::ViewModel;
use super::super::layout::LayoutMode;

const REVEAL_RESULT_LIMIT: usize = 50;

/// Fuzzy matches across the whole graph, best first.
fn search_graph(graph: &SocialGraph, query: &str, limit: usize) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = graph
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            fuzzy_match_score(&matcher, &node.name, query).map(|score| (score, index))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored.truncate(limit);
    scored.into_iter().map(|(_, index)| index).collect()
}

fn sorted_by_name(graph: &SocialGraph) -> Vec<usize> {
    let mut indices = (0..graph.node_count()).collect::<Vec<_>>();
    indices.sort_by(|a, b| graph.nodes[*a].name.cmp(&graph.nodes[*b].name));
    indices
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical()
            .id_salt("controls_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_search_controls(ui);
                ui.separator();
                self.draw_filter_controls(ui);
                ui.separator();
                self.draw_hub_controls(ui);
                ui.separator();
                self.draw_layout_controls(ui);
                ui.separator();
                self.draw_path_controls(ui);
                ui.separator();
                self.draw_reveal_list(ui);
            });
    }

    fn draw_search_controls(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.search_input)
                .hint_text("Filter by name")
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            let now = ui.input(|input| input.time);
            self.search.submit(self.search_input.clone(), now);
        }
        if self.search.is_pending() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.small("waiting for typing to settle");
            });
        }
    }

    fn draw_filter_controls(&mut self, ui: &mut Ui) {
        let mut changed = false;

        ui.heading("Filters");
        ui.label("Entity types");
        for node_type in NodeType::ALL {
            let count = self.graph.count_by_type(node_type);
            changed |= ui
                .checkbox(
                    self.filter.type_toggle(node_type),
                    format!("{} ({count})", node_type.label()),
                )
                .changed();
        }

        ui.add_space(4.0);
        egui::CollapsingHeader::new("Connection types")
            .default_open(true)
            .show(ui, |ui| {
                for connection in ConnectionType::ALL {
                    let mut enabled = self.filter.connection_enabled(connection);
                    let count = self.graph.count_by_connection(connection);
                    let label = format!("{} ({count})", connection.label());
                    let response = ui.checkbox(&mut enabled, label);
                    let response = if connection.is_ai_discovered() {
                        response.on_hover_text("AI-discovered relationship, drawn dashed.")
                    } else {
                        response
                    };
                    if response.changed() {
                        self.filter.toggle_connection(connection);
                        changed = true;
                    }
                }
            });

        egui::CollapsingHeader::new("Eras")
            .default_open(false)
            .show(ui, |ui| {
                for era in Era::ALL {
                    let mut enabled = self.filter.era_enabled(era);
                    if ui.checkbox(&mut enabled, era.label()).changed() {
                        self.filter.toggle_era(era);
                        changed = true;
                    }
                }
            });

        changed |= ui
            .checkbox(&mut self.filter.tier1_only, "Tier 1 only")
            .on_hover_text("Show only entities marked as tier 1.")
            .changed();

        let can_reset = !self.filter.is_default() || !self.search_input.is_empty();
        if ui
            .add_enabled(can_reset, egui::Button::new("Reset filters"))
            .clicked()
        {
            self.reset_filters();
        }

        if changed {
            self.graph_dirty = true;
        }
    }

    fn draw_hub_controls(&mut self, ui: &mut Ui) {
        let budget = self.config.budget;
        let filtered_count = self.filtered.node_count();

        ui.heading("Hub mode");
        ui.label(format!(
            "Showing {} of {} entities ({}, {} hidden)",
            self.hub_view.visible_count(),
            filtered_count,
            self.hub.level.label(),
            self.hub_view.total_hidden(&self.filtered)
        ));

        if budget.available_levels(filtered_count).len() > 1 {
            ui.horizontal(|ui| {
                if self.hub.can_show_less(budget, filtered_count)
                    && ui.button("Show less").clicked()
                    && self.hub.show_less(budget, filtered_count)
                {
                    self.graph_dirty = true;
                }
                if self.hub.can_show_more(budget, filtered_count)
                    && ui.button("Show more").clicked()
                    && self.hub.show_more(budget, filtered_count)
                {
                    self.graph_dirty = true;
                }
            });
        }

        if !self.hub.expanded.is_empty() {
            ui.horizontal(|ui| {
                ui.label(format!("{} expanded", self.hub.expanded.len()));
                if ui
                    .button("Collapse")
                    .on_hover_text("Forget expanded entities and return to the smallest level.")
                    .clicked()
                {
                    self.collapse_hub();
                }
            });
        }

        let unreachable = self
            .hub_view
            .unreachable_hidden(&self.graph, &self.filtered)
            .len();
        if unreachable > 0 {
            ui.small(format!(
                "{unreachable} hidden entities have no visible neighbor; use Find entity to reach them."
            ));
        }
    }

    fn draw_layout_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout");
        let mut layout = self.scene.layout();
        ui.horizontal_wrapped(|ui| {
            for mode in LayoutMode::ALL {
                ui.selectable_value(&mut layout, mode, mode.label());
            }
        });
        if layout != self.scene.layout() {
            self.scene.set_layout(&self.graph, layout);
        }
        if ui.button("Re-run layout").clicked() {
            self.scene.relayout(&self.graph);
        }
    }

    fn endpoint_combo(&self, ui: &mut Ui, label: &str, current: &mut Option<NodeId>) -> bool {
        let selected_text = current
            .as_ref()
            .and_then(|id| self.graph.node(id))
            .map_or_else(|| "choose…".to_owned(), |node| node.name.clone());
        let before = current.clone();

        egui::ComboBox::from_id_salt(("path_endpoint", label))
            .selected_text(selected_text)
            .width(220.0)
            .show_ui(ui, |ui| {
                for index in sorted_by_name(&self.graph) {
                    let node = &self.graph.nodes[index];
                    ui.selectable_value(current, Some(node.id.clone()), &node.name);
                }
            });

        *current != before
    }

    fn draw_path_controls(&mut self, ui: &mut Ui) {
        ui.heading("Path finder");

        let mut start = self.path_start.clone();
        let mut end = self.path_end.clone();
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label("From");
            changed |= self.endpoint_combo(ui, "start", &mut start);
        });
        ui.horizontal(|ui| {
            ui.label("To");
            changed |= self.endpoint_combo(ui, "end", &mut end);
        });
        if changed {
            self.path_start = start;
            self.path_end = end;
            self.path_result = PathResult::NotSearched;
        }

        ui.horizontal(|ui| {
            for scope in [PathScope::Full, PathScope::Visible] {
                if ui
                    .selectable_value(&mut self.path_scope, scope, scope.label())
                    .changed()
                {
                    self.path_result = PathResult::NotSearched;
                }
            }
        });

        let validation = self
            .path_query()
            .map(|_| ())
            .map_err(|error| error.to_string());
        ui.horizontal(|ui| {
            let find = ui
                .add_enabled(validation.is_ok(), egui::Button::new("Find path"))
                .on_disabled_hover_text(validation.as_ref().err().cloned().unwrap_or_default());
            if find.clicked() {
                self.find_path_clicked();
            }

            let has_path_state = self.path_start.is_some()
                || self.path_end.is_some()
                || self.path_result.is_searched();
            if ui
                .add_enabled(has_path_state, egui::Button::new("Clear"))
                .clicked()
            {
                self.clear_path();
            }
        });

        if let Some(degrees) = self.path_result.degrees() {
            ui.label(format!("{degrees} degrees of separation"));
        } else if self.path_result.is_searched() {
            ui.label("No connection found.");
        }
    }

    fn draw_reveal_list(&mut self, ui: &mut Ui) {
        let mut reveal = None;

        egui::CollapsingHeader::new("Find entity")
            .default_open(false)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.reveal_query)
                        .hint_text("Name")
                        .desired_width(f32::INFINITY),
                );

                let matches = search_graph(&self.graph, &self.reveal_query, REVEAL_RESULT_LIMIT);
                if matches.is_empty() && !self.reveal_query.trim().is_empty() {
                    ui.label("No entities match.");
                }

                let selected = self.scene.selected_node().cloned();
                egui::ScrollArea::vertical()
                    .id_salt("reveal_results_scroll")
                    .max_height(220.0)
                    .auto_shrink([false, true])
                    .show_rows(ui, 22.0, matches.len(), |ui, row_range| {
                        for row in row_range {
                            let index = matches[row];
                            let node = &self.graph.nodes[index];
                            let status = if !self.filtered.contains_node(index) {
                                "filtered"
                            } else if !self.hub_view.contains(index) {
                                "hidden"
                            } else {
                                ""
                            };

                            let clicked = ui
                                .horizontal(|ui| {
                                    let clicked = ui
                                        .selectable_label(
                                            selected.as_ref() == Some(&node.id),
                                            &node.name,
                                        )
                                        .clicked();
                                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                        ui.small(status);
                                    });
                                    clicked
                                })
                                .inner;
                            if clicked {
                                reveal = Some(node.id.clone());
                            }
                        }
                    });
            });

        if let Some(id) = reveal {
            self.reveal_node(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::circles::fixtures::star;

    use super::*;

    #[test]
    fn graph_search_ranks_and_limits() {
        let graph = star(30);
        let matches = search_graph(&graph, "spoke", 5);
        assert_eq!(matches.len(), 5);
        assert!(
            matches
                .iter()
                .all(|index| graph.nodes[*index].name.starts_with("Spoke"))
        );
        assert!(search_graph(&graph, "   ", 5).is_empty());
    }

    #[test]
    fn endpoints_are_listed_by_name() {
        let graph = star(4);
        let names = sorted_by_name(&graph)
            .into_iter()
            .map(|index| graph.nodes[index].name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Hub Press", "Spoke 000", "Spoke 001", "Spoke 002"]);
    }
}

use eframe::egui::{self, Context, Pos2, RichText, Ui};

use crate::circles::{ConnectionType, EdgeId, Node, NodeId, PathResult};
use crate::util::format_year_span;

use super::super::ViewModel;
use super::super::scene::Selection;

/// Deferred actions; the panels only borrow the model while drawing.
#[derive(Default)]
struct DetailActions {
    reveal: Option<NodeId>,
    expand: Option<NodeId>,
    path_start: Option<NodeId>,
    path_end: Option<NodeId>,
    reveal_path: bool,
    close_popup: bool,
}

fn node_summary(ui: &mut Ui, node: &Node) {
    ui.label(RichText::new(&node.name).strong());
    ui.small(format!("{} · {}", node.node_type.label(), node.id));

    if let Some(lifespan) = node.lifespan() {
        ui.label(lifespan);
    }
    if let Some(era) = node.era {
        ui.label(format!("Era: {}", era.label()));
    }
    if let Some(tier) = node.tier {
        ui.label(format!("Tier {tier}"));
    }
    ui.label(format!(
        "{} book{} in the collection",
        node.book_count,
        if node.book_count == 1 { "" } else { "s" }
    ));
}

impl ViewModel {
    fn apply_detail_actions(&mut self, actions: DetailActions) {
        if let Some(id) = actions.expand {
            self.expand_node(&id);
        }
        if let Some(id) = actions.reveal {
            self.reveal_node(&id);
        }
        if let Some(id) = actions.path_start {
            self.path_start = Some(id);
            self.path_result = PathResult::NotSearched;
        }
        if let Some(id) = actions.path_end {
            self.path_end = Some(id);
            self.path_result = PathResult::NotSearched;
        }
        if actions.reveal_path {
            self.reveal_path();
        }
        if actions.close_popup {
            self.popup = None;
        }
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        let mut actions = DetailActions::default();
        match self.scene.selection().cloned() {
            Some(Selection::Node(id)) => self.draw_node_details(ui, &id, &mut actions),
            Some(Selection::Edge(id)) => self.draw_edge_details(ui, &id, &mut actions),
            None => {
                ui.label("Select an entity or connection in the graph.");
            }
        }

        ui.separator();
        self.draw_path_details(ui, &mut actions);

        self.apply_detail_actions(actions);
    }

    fn draw_node_details(&self, ui: &mut Ui, id: &NodeId, actions: &mut DetailActions) {
        let Some(index) = self.graph.index_of(id) else {
            ui.label("Selected entity no longer exists.");
            return;
        };
        let node = &self.graph.nodes[index];
        node_summary(ui, node);

        let hidden = self.hub_view.hidden_count(index);
        if hidden > 0 {
            ui.horizontal(|ui| {
                ui.label(format!("{hidden} connected entities hidden"));
                if ui.button("Expand").clicked() {
                    actions.expand = Some(id.clone());
                }
            });
        }

        ui.horizontal(|ui| {
            if ui.button("Path from here").clicked() {
                actions.path_start = Some(id.clone());
            }
            if ui.button("Path to here").clicked() {
                actions.path_end = Some(id.clone());
            }
        });

        ui.separator();
        ui.label(RichText::new(format!("Connections ({})", self.graph.degree(index))).strong());

        egui::ScrollArea::vertical()
            .id_salt("connections_scroll")
            .max_height(360.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for connection in ConnectionType::ALL {
                    let links = self
                        .graph
                        .links(index)
                        .iter()
                        .filter(|link| self.graph.edges[link.edge].connection == connection)
                        .collect::<Vec<_>>();
                    if links.is_empty() {
                        continue;
                    }

                    let header = format!("{} ({})", connection.label(), links.len());
                    egui::CollapsingHeader::new(header)
                        .id_salt(("connections", connection.label()))
                        .default_open(links.len() <= 8)
                        .show(ui, |ui| {
                            for link in links {
                                let neighbor = &self.graph.nodes[link.neighbor];
                                let suffix = if !self.filtered.contains_node(link.neighbor) {
                                    "  (filtered)"
                                } else if !self.hub_view.contains(link.neighbor) {
                                    "  (hidden)"
                                } else {
                                    ""
                                };
                                let text = format!("{}{suffix}", neighbor.name);
                                let response = ui.selectable_label(false, text);
                                if response.clicked() {
                                    actions.reveal = Some(neighbor.id.clone());
                                }
                            }
                        });
                }
            });
    }

    fn draw_edge_details(&self, ui: &mut Ui, id: &EdgeId, actions: &mut DetailActions) {
        let Some(edge) = self.graph.edge(id) else {
            ui.label("Selected connection no longer exists.");
            return;
        };
        let source = &self.graph.nodes[edge.source];
        let target = &self.graph.nodes[edge.target];

        ui.label(RichText::new(edge.connection.label()).strong());
        if edge.connection.is_ai_discovered() {
            ui.small("AI-discovered relationship");
        }
        ui.add_space(4.0);

        for endpoint in [source, target] {
            if ui.link(&endpoint.name).clicked() {
                actions.reveal = Some(endpoint.id.clone());
            }
        }

        if let Some(strength) = edge.strength {
            ui.label(format!("Strength: {strength}/10"));
        }
        if let Some(span) = format_year_span(edge.start_year, edge.end_year) {
            ui.label(format!("Years: {span}"));
        }
        if !edge.shared_book_ids.is_empty() {
            ui.label(format!("Shared books: {}", edge.shared_book_ids.len()));
        }
        if let Some(evidence) = &edge.evidence {
            ui.separator();
            ui.label(RichText::new("Evidence").strong());
            ui.label(evidence.as_str());
        }
    }

    fn draw_path_details(&self, ui: &mut Ui, actions: &mut DetailActions) {
        ui.label(RichText::new("Path").strong());

        let name_of = |id: &NodeId| {
            self.graph
                .node(id)
                .map_or_else(|| id.to_string(), |node| node.name.clone())
        };

        match &self.path_result {
            PathResult::NotSearched => {
                ui.label("Pick two entities in the path finder.");
            }
            PathResult::NoPath => {
                let start = self.path_start.as_ref().map(name_of).unwrap_or_default();
                let end = self.path_end.as_ref().map(name_of).unwrap_or_default();
                ui.label(format!("No connection found between {start} and {end}."));
            }
            PathResult::Found { nodes, edges } => {
                let degrees = nodes.len() - 1;
                ui.label(format!(
                    "{degrees} degree{} of separation",
                    if degrees == 1 { "" } else { "s" }
                ));

                for (step, node_id) in nodes.iter().enumerate() {
                    ui.label(format!("{}. {}", step + 1, name_of(node_id)));
                    if let Some(edge) = edges.get(step).and_then(|id| self.graph.edge(id)) {
                        ui.small(format!("   ↓ {}", edge.connection.label()));
                    }
                }

                let hidden = self.hidden_path_nodes().len();
                if hidden > 0 && ui.button(format!("Reveal {hidden} hidden")).clicked() {
                    actions.reveal_path = true;
                }
            }
        }
    }

    /// Floating card next to a node; closed by viewport changes or the
    /// close button.
    pub(in crate::app) fn draw_node_popup(&mut self, ctx: &Context, anchor: Pos2, id: &NodeId) {
        let Some(index) = self.graph.index_of(id) else {
            return;
        };

        let mut actions = DetailActions::default();
        egui::Area::new(egui::Id::new("node_popup"))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(260.0);
                    node_summary(ui, &self.graph.nodes[index]);

                    let hidden = self.hub_view.hidden_count(index);
                    if hidden > 0 && ui.button(format!("Show {hidden} more")).clicked() {
                        actions.expand = Some(id.clone());
                    }

                    ui.horizontal(|ui| {
                        if ui.small_button("Path from").clicked() {
                            actions.path_start = Some(id.clone());
                        }
                        if ui.small_button("Path to").clicked() {
                            actions.path_end = Some(id.clone());
                        }
                        if ui.small_button("Close").clicked() {
                            actions.close_popup = true;
                        }
                    });
                });
            });

        self.apply_detail_actions(actions);
    }
}

use std::time::Duration;

use eframe::egui::{self, Align, Context, Layout, Vec2};
use tracing::trace;

use crate::circles::{
    Debounced, FilterState, FilteredView, HubState, HubView, PathResult, SocialGraph, rank_nodes,
};
use crate::config::ExplorerConfig;

use super::super::ViewModel;
use super::super::scene::{Scene, SceneEvent};

impl ViewModel {
    pub(in crate::app) fn new(graph: SocialGraph, config: ExplorerConfig) -> Self {
        let ranking = rank_nodes(&graph);
        let filtered = FilteredView::all(&graph);
        let hub = HubState::new(config.budget, filtered.node_count());
        let hub_view = HubView::compute(&graph, &filtered, &ranking, &hub, config.budget);

        Self {
            ranking,
            filter: FilterState::default(),
            search_input: String::new(),
            search: Debounced::new(config.search_debounce),
            hub,
            filtered,
            hub_view,
            scene: Scene::new(config.layout),
            graph_dirty: true,
            pending_selection: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            path_start: None,
            path_end: None,
            path_scope: config.path_scope,
            path_result: PathResult::NotSearched,
            popup: None,
            reveal_query: String::new(),
            graph,
            config,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        let now = ctx.input(|input| input.time);
        if let Some(remaining) = self.poll_search(now) {
            ctx.request_repaint_after(Duration::from_secs_f64(remaining));
        }
        self.refresh_scene();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Social Circles");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(format!("entities: {}", self.graph.node_count()));
                    ui.label(format!("connections: {}", self.graph.edge_count()));
                    ui.label(format!("books: {}", self.graph.meta.total_books));
                    if let Some((start, end)) = self.graph.meta.date_range {
                        ui.label(format!("{start}–{end}"));
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.scene_summary());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading social circles...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });

        self.handle_scene_events();
    }

    fn scene_summary(&self) -> String {
        let stats = self.scene.stats();
        format!(
            "shown {} / {} filtered  |  {} edges  |  {} layout  |  rev {} ({} layouts)",
            stats.node_count,
            self.filtered.node_count(),
            stats.edge_count,
            stats.layout.label(),
            stats.revision,
            stats.layout_runs
        )
    }

    fn handle_scene_events(&mut self) {
        for event in self.scene.drain_events() {
            trace!(?event, "scene event");
            match event {
                SceneEvent::ViewportChanged | SceneEvent::EdgeSelected(_) => self.popup = None,
                SceneEvent::NodeSelected(id) => self.popup = Some(id),
                SceneEvent::NodeHovered(_) => {}
            }
        }
    }
}

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{error, info};

use crate::circles::{
    Debounced, FilterState, FilteredView, HubState, HubView, NodeId, PathResult, PathScope,
    SocialGraph, load_social_graph,
};
use crate::config::ExplorerConfig;

mod graph;
mod highlight;
mod layout;
mod render_utils;
mod scene;
mod ui;

pub use self::layout::LayoutMode;
use self::scene::Scene;

pub struct CirclesApp {
    config: ExplorerConfig,
    state: AppState,
    reload_rx: Option<Receiver<Result<SocialGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<SocialGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: SocialGraph,
    ranking: Vec<usize>,
    config: ExplorerConfig,
    filter: FilterState,
    search_input: String,
    search: Debounced<String>,
    hub: HubState,
    filtered: FilteredView,
    hub_view: HubView,
    scene: Scene,
    graph_dirty: bool,
    pending_selection: Option<NodeId>,
    pan: Vec2,
    zoom: f32,
    path_start: Option<NodeId>,
    path_end: Option<NodeId>,
    path_scope: PathScope,
    path_result: PathResult,
    popup: Option<NodeId>,
    reveal_query: String,
}

impl CirclesApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ExplorerConfig) -> Self {
        let state = Self::start_load(&config);
        Self {
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(config: &ExplorerConfig) -> Receiver<Result<SocialGraph, String>> {
        let (tx, rx) = mpsc::channel();
        let source = config.data.clone();
        info!(source = %source.describe(), "loading social circles");

        thread::spawn(move || {
            let result = load_social_graph(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(config: &ExplorerConfig) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(config),
        }
    }

    fn ready_or_error(&self, result: Result<SocialGraph, String>) -> AppState {
        match result {
            Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph, self.config.clone()))),
            Err(message) => {
                error!(%message, "failed to load social circles");
                AppState::Error(message)
            }
        }
    }
}

impl eframe::App for CirclesApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading social circles...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load social circles");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(&self.config);
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.config.data.describe(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(&self.config));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            ctx.request_repaint();
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready_or_error(result);
        }
    }
}

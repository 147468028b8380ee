mod app;
mod circles;
mod config;
mod util;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::LayoutMode;
use crate::circles::{
    DEFAULT_COMPACT_BUDGET, DEFAULT_MEDIUM_BUDGET, DEFAULT_SEARCH_DEBOUNCE, DataSource, PathScope,
};
use crate::config::ExplorerConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Social circles JSON payload, or `-` to read it from stdin.
    #[arg(long, default_value = "social-circles.json")]
    data: String,

    /// Entities shown at the compact hub level.
    #[arg(long, default_value_t = DEFAULT_COMPACT_BUDGET)]
    compact_budget: usize,

    /// Entities shown at the medium hub level.
    #[arg(long, default_value_t = DEFAULT_MEDIUM_BUDGET)]
    medium_budget: usize,

    /// Quiet period before typed search text is applied.
    #[arg(long, default_value_t = DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64)]
    search_debounce_ms: u64,

    #[arg(long, value_enum, default_value_t = PathScope::Full)]
    path_scope: PathScope,

    #[arg(long, value_enum, default_value_t = LayoutMode::Force)]
    layout: LayoutMode,
}

impl Args {
    fn into_config(self) -> ExplorerConfig {
        ExplorerConfig::new(DataSource::from_arg(&self.data))
            .with_budget(self.compact_budget, self.medium_budget)
            .with_search_debounce(self.search_debounce_ms)
            .with_path_scope(self.path_scope)
            .with_layout(self.layout)
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moxon_circles=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn main() -> eframe::Result<()> {
    init_tracing();

    let config = Args::parse().into_config();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "BlueMoxon Social Circles",
        options,
        Box::new(move |cc| Ok(Box::new(app::CirclesApp::new(cc, config)))),
    )
}

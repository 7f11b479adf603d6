mod api;
mod app;
mod blog_entry;
mod config;
mod error;
mod input;
mod logging;
mod route;
mod screens;
mod tags;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use tracing::info;

use api::HttpBlogApi;
use app::App;
use config::{Config, Overrides, API_URL_ENV};
use route::Route;
use ui::Tui;

#[derive(Debug, Parser)]
#[command(name = "blog-editor", version, about = "Terminal editor for blog entries")]
struct Cli {
    /// Config file (TOML). Defaults to ./blog-editor.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL including the `/api` prefix.
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Screen to open first, e.g. `/new-entry`, `/details/42`, `/edit-entry/42`.
    #[arg(default_value = "/")]
    route: Route,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_url(std::env::var(API_URL_ENV).ok());
    config.apply(Overrides {
        api_base_url: cli.api_url,
        request_timeout_secs: cli.timeout,
        log_dir: cli.log_dir,
    });
    config.validate()?;

    let _log_guard = logging::init(&config.log_dir)?;
    info!(api = %config.api_base_url, route = %cli.route, "starting blog editor");

    let api = HttpBlogApi::builder(&config.api_base_url)
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    let mut tui = Tui::new()?;
    let mut app = App::new(Arc::new(api), cli.route);
    app.run(&mut tui).await
}

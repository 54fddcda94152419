use anyhow::{Context, Result};
use clap::Parser;
use project_console::api::ProjectRest;
use project_console::config::Config;
use project_console::console::ProjectConsole;
use project_console::tui::{self, dispatch, TuiCommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

/// Terminal console for creating, listing, running, and deleting projects
#[derive(Parser)]
#[command(name = "project-console")]
#[command(version, about)]
struct Cli {
    /// Config file [default: config.toml, optional]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, env = "PROJECT_CONSOLE_API_BASE")]
    base_url: Option<String>,

    /// Load projects and config once, print the state as JSON, and exit
    #[arg(long)]
    dump: bool,
}

fn init_logging(config: &Config) -> Result<()> {
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("Failed to create log file: {}", config.logging.file))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Saved values from .env; real env vars take precedence
    let env_vars = Config::load_env_file();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = Config::load_or_default(&config_path, cli.config.is_some())?;
    config.override_base_url(cli.base_url.as_deref());

    init_logging(&config)?;
    tracing::debug!(env_vars, "applied .env");

    let token = Config::api_token();
    let rest = ProjectRest::new(&config.backend, token.as_deref())?;
    let backend_url = rest.base_url().to_string();
    tracing::info!(backend = backend_url.as_str(), "starting project console");

    let (console, state_rx) = ProjectConsole::new(Arc::new(rest));

    if cli.dump {
        console.initialize().await;
        let state = console.snapshot();
        println!("{}", serde_json::to_string_pretty(&state)?);
        if state.has_error() {
            eprintln!("Error: {}", state.last_error);
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<TuiCommand>(16);

    let init = console.clone();
    tokio::spawn(async move { init.initialize().await });
    tokio::spawn(dispatch::run_dispatcher(console, cmd_rx));

    tui::run_tui(state_rx, cmd_tx, &backend_url).await?;

    tracing::debug!("shutting down");
    Ok(ExitCode::SUCCESS)
}

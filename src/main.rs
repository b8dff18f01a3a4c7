use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use chat_tui::{
    logging, ChatBackend, ChatClient, Config, ConversationStore, SubmissionController,
    SubmissionOutcome, Toasts,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "chat")]
#[command(version, about = "Terminal chat client for a /api/chat backend")]
struct Cli {
    /// Backend base address (overrides CHAT_BACKEND_URL and the config file)
    #[arg(short, long, global = true)]
    backend_url: Option<String>,

    /// Path to a config file instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message, print the reply and exit
    Send {
        /// Message text
        message: String,
    },
    /// Write a config file with the current settings
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { force }) => init_config(cli.config, cli.backend_url, force),
        Some(Commands::Send { message }) => {
            logging::init_stderr("warn")?;
            let config = load_config(cli.config.as_deref())?;
            let backend_url = config.resolve_backend_url(cli.backend_url.as_deref());
            let controller = build_controller(&config, &backend_url)?;
            send_once(&controller, &config, &message).await
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            let backend_url = config.resolve_backend_url(cli.backend_url.as_deref());
            let _guard = logging::init_file(config.log_level())?;
            tracing::info!(%backend_url, "starting chat session");
            let controller = build_controller(&config, &backend_url)?;
            run_tui(controller, &config, backend_url).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// A path given on the command line must exist; the default one may not
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_existing(path),
        None => Config::load(),
    }
}

fn init_config(path: Option<PathBuf>, backend_url: Option<String>, force: bool) -> Result<ExitCode> {
    let target = match &path {
        Some(path) => path.clone(),
        None => Config::get_config_path()?,
    };

    if target.exists() && !force {
        eprintln!(
            "{} {} (use --force to replace it)",
            "Config already exists:".yellow(),
            target.display()
        );
        return Ok(ExitCode::from(2));
    }

    let mut config = Config::load_from(&target).unwrap_or_default();
    config.backend_url = Some(config.resolve_backend_url(backend_url.as_deref()));

    match path {
        Some(path) => config.save_to(&path)?,
        None => config.save()?,
    }
    println!("{} {}", "Wrote".bold().green(), target.display());
    Ok(ExitCode::SUCCESS)
}

fn build_controller(config: &Config, backend_url: &str) -> Result<SubmissionController> {
    let client = match config.request_timeout() {
        Some(timeout) => ChatClient::with_timeout(backend_url, timeout)?,
        None => ChatClient::new(backend_url),
    };
    let backend: Arc<dyn ChatBackend> = Arc::new(client);
    Ok(SubmissionController::new(backend))
}

async fn send_once(controller: &SubmissionController, config: &Config, message: &str) -> Result<ExitCode> {
    let mut store = ConversationStore::new();
    let mut toasts = Toasts::new(config.notification_duration());
    store.set_pending_input(message);

    match controller.submit(&mut store, &mut toasts).await {
        None => {
            eprintln!("{}", "Nothing to send: message is empty".yellow());
            Ok(ExitCode::from(2))
        }
        Some(SubmissionOutcome::Replied(reply)) => {
            println!("{} {}", format!("{}:", reply.role().display_name()).bold().green(), reply.content());
            Ok(ExitCode::SUCCESS)
        }
        Some(SubmissionOutcome::Failed(_)) => {
            if let Some(notice) = toasts.current() {
                eprintln!("{}: {}", notice.title.bold().red(), notice.message);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_tui(controller: SubmissionController, config: &Config, backend_url: String) -> Result<()> {
    let mut app = App::new(controller, Toasts::new(config.notification_duration()), backend_url);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!(messages = app.store.len(), "chat session ended");
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    let tx = events.sender();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event, &tx)?;
        app.sync_store_events();
    }

    Ok(())
}

use std::path::PathBuf;
use std::time::Instant;

use affirm_core::fetcher::resolve;
use affirm_core::{
    AffirmationPanel, AffirmationsClient, ApiResult, CategoryFilter, Config, FetchState, Feedback,
    Mutation, RandomAffirmation, RandomFetcher,
};
use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "affirm")]
#[command(about = "Terminal client for the affirmations site", version)]
struct Cli {
    /// Site root, e.g. http://localhost:5000
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Session cookie sent with every request (e.g. "session=...")
    #[arg(long, global = true)]
    session: Option<String>,
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one random affirmation
    Random {
        /// Category ID, or "all"
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Save an affirmation to your list
    Save { id: i64 },
    /// Pin an affirmation (at most 3)
    Pin { id: i64 },
    /// Remove your pins and favorites from an affirmation
    Unpin { id: i64 },
    /// Add an affirmation to your favorites
    Favorite { id: i64 },
    /// Create a category
    AddCategory { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let mut config = Config::load_from(&config_path)?.with_env();
    if let Some(url) = cli.base_url {
        config.base_url = Some(url);
    }
    if let Some(session) = cli.session {
        config.session_cookie = Some(session);
    }

    let client = AffirmationsClient::with_session(config.base_url(), config.session_cookie.as_deref())?;

    match cli.command {
        None => run_tui(config, config_path, client).await,
        Some(command) => {
            init_stderr_logging();
            run_command(&client, &config, command).await
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("AFFIRM_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The terminal UI owns stderr, so logs go to a file under the data directory.
fn init_file_logging() -> Result<WorkerGuard> {
    let log_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("affirm");
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, "affirm.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

async fn run_tui(config: Config, config_path: PathBuf, client: AffirmationsClient) -> Result<()> {
    let _guard = init_file_logging()?;
    info!(base_url = client.base_url(), "starting");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(config, Some(config_path), client, events.sender());

    // Initial load
    app.request_affirmation();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn run_command(client: &AffirmationsClient, config: &Config, command: Commands) -> Result<()> {
    let mutation = match command {
        Commands::Random { category } => return print_random(client, config, category.as_deref()).await,
        Commands::Save { id } => Mutation::Save(id),
        Commands::Pin { id } => Mutation::Pin(id),
        Commands::Unpin { id } => Mutation::Unpin(id),
        Commands::Favorite { id } => Mutation::Favorite(id),
        Commands::AddCategory { name } => Mutation::AddCategory(name),
    };

    let reply = mutation.run(client).await;
    match mutation.feedback(&reply) {
        Feedback::Banner { kind: affirm_core::BannerKind::Success, message } => {
            println!("{}", message);
            Ok(())
        }
        Feedback::Banner { message, .. } => bail!(message),
        Feedback::Dialog { message, .. } => bail!(message),
    }
}

async fn print_random(client: &AffirmationsClient, config: &Config, category: Option<&str>) -> Result<()> {
    let filter = match category {
        Some(raw) => CategoryFilter::from_str(raw).ok_or_else(|| anyhow!("Invalid category: {}", raw))?,
        None => config.default_filter(),
    };

    let mut fetcher = RandomFetcher::new(AffirmationPanel::new());
    let pending = fetcher.begin(filter);
    let completion = resolve(client, pending).await;
    let failure = describe_failure(&completion.result);

    match fetcher.complete(completion, Instant::now()) {
        FetchState::Rendered | FetchState::NotFound => {
            let panel = fetcher.view();
            println!("{}", panel.text);
            if !panel.categories.is_empty() {
                println!("  {}", panel.categories);
            }
            if let Some(id) = panel.pin.affirmation_id() {
                println!("  #{}", id);
            }
            Ok(())
        }
        FetchState::RateLimited => {
            let message = fetcher
                .view()
                .notice
                .as_ref()
                .map(|n| n.message.clone())
                .unwrap_or_default();
            bail!(message)
        }
        FetchState::RolledBack | FetchState::Superseded => bail!(failure),
    }
}

fn describe_failure(result: &ApiResult<RandomAffirmation>) -> String {
    match result {
        Err(e) => format!("Could not fetch an affirmation: {}", e),
        Ok(_) => "Could not fetch an affirmation".to_string(),
    }
}

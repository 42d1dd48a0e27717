mod action;
mod browser;
mod config;
mod error;
mod event;
mod format;
mod gh;
mod source;
mod tui;
mod types;
mod ui;

use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::browser::Browser;
use crate::config::Config;
use crate::error::Result;
use crate::event::Event;
use crate::format::truncate;
use crate::gh::GhCli;
use crate::source::RepoSource;
use crate::tui::{EventHandler, ScreenGuard};
use crate::types::{RepoDetail, SearchFilters, SortField};

#[derive(Debug, Parser)]
#[command(name = "ghx", version, about = "Explore GitHub from the terminal, via the gh CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search repositories and browse the results interactively
    Repos {
        query: String,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
        /// Filter by primary language
        #[arg(long)]
        language: Option<String>,
        /// Filter by topic
        #[arg(long)]
        topic: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortField>,
        /// Print results as JSON instead of opening the browser
        #[arg(long)]
        json: bool,
    },
    /// Show details for a single repository
    View {
        /// Repository in OWNER/NAME form
        repo: String,
        /// Open in the web browser instead
        #[arg(long)]
        web: bool,
        #[arg(long)]
        json: bool,
    },
    /// Search code across GitHub
    Code {
        query: String,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Create a gist from a file
    Gist {
        file: PathBuf,
        #[arg(short, long)]
        desc: Option<String>,
        /// Public instead of secret
        #[arg(long)]
        public: bool,
    },
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Restore the terminal before the default panic output, so a panic
    // inside the browser never leaves the shell in raw mode.
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let cli = Cli::parse();
    let config = Config::load();
    let source: Arc<dyn RepoSource> = Arc::new(GhCli::new().await?);

    match cli.command {
        Command::Repos {
            query,
            limit,
            language,
            topic,
            sort,
            json,
        } => {
            let filters = SearchFilters {
                limit: limit.unwrap_or(config.search.limit),
                language,
                topic,
                sort: sort.or_else(|| config.default_sort()),
            };
            run_repos(source, &query, &filters, json, config.clone.dir).await?;
        }
        Command::View { repo, web, json } => {
            run_view(source, &repo, web, json).await?;
        }
        Command::Code {
            query,
            limit,
            language,
            json,
        } => {
            run_code(source, &query, limit.unwrap_or(15), language.as_deref(), json).await?;
        }
        Command::Gist { file, desc, public } => {
            let url = source.create_gist(&file, desc.as_deref(), public).await?;
            println!("{}", url);
        }
    }

    Ok(())
}

async fn run_repos(
    source: Arc<dyn RepoSource>,
    query: &str,
    filters: &SearchFilters,
    json: bool,
    clone_dir: Option<PathBuf>,
) -> Result<()> {
    let repos = source.search_repos(query, filters).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&repos)?);
        return Ok(());
    }

    if repos.is_empty() {
        println!("No repositories found matching your criteria.");
        return Ok(());
    }

    run_browser(repos, source, clone_dir).await
}

/// The interactive browser loop: read input, dispatch, render, until quit.
/// The screen guard restores the terminal on every exit path.
async fn run_browser(
    repos: Vec<types::RepoSummary>,
    source: Arc<dyn RepoSource>,
    clone_dir: Option<PathBuf>,
) -> Result<()> {
    let (mut terminal, mut guard) = ScreenGuard::acquire()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut browser = Browser::new(repos, source, action_tx.clone(), clone_dir);

    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(100);
    let mut events = EventHandler::new(guard.tier(), tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &browser))?;
                    }
                    _ => {
                        let action = browser.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action).ok();
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                browser.update(action);
            }
        }

        if browser.should_quit {
            break;
        }
    }

    guard.release();
    Ok(())
}

async fn run_view(source: Arc<dyn RepoSource>, repo: &str, web: bool, json: bool) -> Result<()> {
    if web {
        return source.open_in_browser(repo).await;
    }

    let detail = source.fetch_detail(repo).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        print_detail(&detail);
    }
    Ok(())
}

fn print_detail(detail: &RepoDetail) {
    println!("{}", detail.full_name);
    if let Some(desc) = &detail.description {
        println!("{}", desc);
    }
    println!();
    print!("★ {}  ⑂ {}", detail.stars, detail.forks);
    if let Some(lang) = &detail.language {
        print!("  {}", lang);
    }
    if let Some(updated) = detail.updated_at {
        print!("  updated {}", format::relative_date(updated));
    }
    println!();
    if let Some(url) = &detail.url {
        println!("{}", url);
    }
    if let Some(readme) = &detail.readme {
        println!();
        println!("{}", readme);
    }
}

async fn run_code(
    source: Arc<dyn RepoSource>,
    query: &str,
    limit: u32,
    language: Option<&str>,
    json: bool,
) -> Result<()> {
    let matches = source.search_code(query, limit, language).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No code found matching your criteria.");
        return Ok(());
    }

    for m in &matches {
        println!(
            "{:<30} {:<30} {}",
            truncate(&m.repo, 30),
            truncate(&m.path, 30),
            truncate(&m.fragment, 60)
        );
    }
    Ok(())
}

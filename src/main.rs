mod app;
mod catalog;
mod config;
mod picker;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use catalog::{CatalogFormat, EntityCatalog, EntityName};
use config::PickerConfig;
use picker::Selection;

#[derive(Parser, Debug)]
#[command(name = "entity-picker")]
#[command(version)]
#[command(about = "Pick an entity from a list with a case-sensitive search")]
struct Args {
    /// Entity names (overrides --catalog and stdin)
    entities: Vec<String>,

    /// Read entity names from a file (`-` for stdin)
    #[arg(short, long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Catalog format
    #[arg(short, long, value_enum, default_value_t = CatalogFormat::Auto)]
    format: CatalogFormat,

    /// Preset search query
    #[arg(short, long)]
    query: Option<String>,

    /// Entity to highlight when the dialog opens, if it is visible
    #[arg(short, long, value_name = "NAME")]
    select: Option<String>,

    /// Dialog title (overrides config)
    #[arg(short, long)]
    title: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Config file (default: <config dir>/entity-picker/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Result line printed by `--json`
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
enum JsonOutput<'a> {
    Confirmed { entity: &'a str },
    Cancelled,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(selection) => match selection {
            Selection::Confirmed(_) => ExitCode::SUCCESS,
            Selection::Cancelled => ExitCode::from(1),
        },
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<Selection> {
    init_logging(args.log_file.as_deref())?;

    let app = build_app(&args)?;
    let selection = run_tui(app)?;

    if let Some(line) = format_selection(&selection, args.json)? {
        println!("{}", line);
    }
    Ok(selection)
}

/// Config, CLI overrides, catalog and preselection, everything before the terminal is touched
fn build_app(args: &Args) -> Result<App> {
    let mut config = PickerConfig::load(args.config.as_deref());
    if let Some(title) = &args.title {
        config.title = title.clone();
    }

    let catalog = load_catalog(args)?;
    tracing::info!("Opening entity picker with {} entities", catalog.len());

    let mut app = App::new(catalog, args.query.as_deref(), &config);
    if let Some(name) = &args.select {
        if !app.picker.highlight_entity(&EntityName::from(name.as_str())) {
            tracing::debug!("Preselected entity {:?} is not visible", name);
        }
    }
    Ok(app)
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    // The terminal belongs to the dialog, so logs only go to a file
    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

fn load_catalog(args: &Args) -> Result<EntityCatalog> {
    if !args.entities.is_empty() {
        return Ok(args.entities.iter().cloned().collect());
    }

    if let Some(path) = &args.catalog {
        return EntityCatalog::load(path, args.format)
            .with_context(|| format!("Cannot load catalog {}", path.display()));
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return EntityCatalog::from_reader(stdin.lock(), args.format).context("Cannot read catalog from stdin");
    }

    tracing::warn!("No catalog given, opening an empty picker");
    Ok(EntityCatalog::default())
}

/// Text for stdout: the entity name (or JSON). Nothing on plain cancel.
fn format_selection(selection: &Selection, json: bool) -> Result<Option<String>> {
    if json {
        let output = match selection {
            Selection::Confirmed(name) => JsonOutput::Confirmed { entity: name.as_str() },
            Selection::Cancelled => JsonOutput::Cancelled,
        };
        return Ok(Some(serde_json::to_string(&output)?));
    }

    Ok(match selection {
        Selection::Confirmed(name) => Some(name.to_string()),
        Selection::Cancelled => None,
    })
}

fn run_tui(mut app: App) -> Result<Selection> {
    install_panic_hook();

    // Draw on stderr so stdout only carries the result
    let mut session = TerminalSession::start_with(|| Ok(CrosstermBackend::new(io::stderr())))?;
    run_modal(&mut session.terminal, &mut app, event::read)
}

/// Raw mode + alternate screen, undone on drop
struct TerminalSession<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> TerminalSession<B> {
    fn start_with(make_backend: impl FnOnce() -> io::Result<B>) -> io::Result<Self> {
        enable_raw_mode()?;

        let setup = || -> io::Result<Terminal<B>> {
            execute!(io::stderr(), EnterAlternateScreen)?;
            Terminal::new(make_backend()?)
        };

        match setup() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                teardown_terminal();
                Err(e)
            }
        }
    }
}

impl<B: Backend> Drop for TerminalSession<B> {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

/// Best effort; every step runs even if an earlier one fails
fn teardown_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stderr(), LeaveAlternateScreen, Show);
}

// Release builds abort on panic, so Drop never runs there
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        teardown_terminal();
        default_hook(info);
    }));
}

/// Block until the picker reaches a closed state
fn run_modal<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut next_event: impl FnMut() -> io::Result<Event>,
) -> Result<Selection> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Resize and focus events only need the redraw above
        if let Event::Key(key) = next_event()? {
            app.handle_key(key);
        }

        if let Some(selection) = app.outcome() {
            return Ok(selection);
        }
    }
}

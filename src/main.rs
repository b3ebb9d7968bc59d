//! Terminal preview of a portfolio page.
//!
//! Run the binary to scroll through the page with its reveal, navigation,
//! counter and form behaviour.  Run with `--print-config` to dump a config
//! file reproducing the current settings.

mod app;
mod config;
mod core;
mod shell;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::AppState,
    submit::{SubmitResult, Submitter},
    telemetry::{JsonLinesSink, LogSink},
};
use crate::config::{AppConfig, FilePreferences};
use crate::core::{
    form::SubmitPolicy,
    observe::VisibilityMode,
    page::{PageSpec, DEFAULT_PAGE},
    scroll::SCROLL_FRAME_BUDGET,
    theme::{MemoryStore, PreferenceStore, ThemePreference, THEME_KEY},
    tracking::TrackingSink,
};

type Tui = Terminal<CrosstermBackend<io::Stderr>>;

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Terminal preview of a portfolio page")]
struct Cli {
    /// Page description (JSON).  Defaults to the bundled sample page.
    #[arg(long)]
    page: Option<PathBuf>,

    /// Config file (defaults to `$XDG_CONFIG_HOME/folio-view/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// How one-shot effects learn that their region is on screen.
    #[arg(long, value_parser = parse_visibility)]
    visibility: Option<VisibilityMode>,

    /// `optimistic` (success after a delay) or `acknowledged` (wait for the
    /// endpoint).
    #[arg(long = "submit-mode", value_parser = ["optimistic", "acknowledged"])]
    submit_mode: Option<String>,

    /// Contact endpoint the form POSTs to.
    #[arg(long)]
    endpoint: Option<String>,

    /// Append tracking events to this file as JSON lines.
    #[arg(long = "track-log")]
    track_log: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Keep the theme preference in memory only.
    #[arg(long = "no-persist")]
    no_persist: bool,

    /// Print a config file reproducing the current settings and exit.
    #[arg(long = "print-config")]
    print_config: bool,
}

fn parse_visibility(s: &str) -> Result<VisibilityMode, String> {
    VisibilityMode::parse(s).ok_or_else(|| format!("expected `observe` or `fixed-delay`, got `{s}`"))
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        // The TUI draws on stderr; only log there when explicitly asked to.
        None if std::env::var_os("RUST_LOG").is_some() => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    // ── settings ──────────────────────────────────────────────
    let mut config = AppConfig::load(cli.config.as_deref());
    if let Some(mode) = cli.visibility {
        config.visibility = mode;
    }
    match cli.submit_mode.as_deref() {
        Some("acknowledged") => config.submit_policy = SubmitPolicy::Acknowledged,
        Some("optimistic") if config.submit_policy == SubmitPolicy::Acknowledged => {
            config.submit_policy = SubmitPolicy::default();
        }
        _ => {}
    }
    if cli.endpoint.is_some() {
        config.endpoint = cli.endpoint.clone();
    }

    let prefs: Box<dyn PreferenceStore> = if cli.no_persist {
        Box::new(MemoryStore::default())
    } else {
        Box::new(FilePreferences::new(config.path.clone()))
    };

    if cli.print_config {
        let theme = prefs
            .get(THEME_KEY)
            .and_then(|v| ThemePreference::parse(&v))
            .unwrap_or_default();
        print!("{}", config.template(theme.as_str()));
        return Ok(());
    }

    // ── page ──────────────────────────────────────────────────
    let spec = match &cli.page {
        Some(path) => PageSpec::load(path).with_context(|| format!("failed to load page {}", path.display()))?,
        None => PageSpec::from_json(DEFAULT_PAGE).context("bundled page is invalid")?,
    };

    let mut sinks: Vec<Box<dyn TrackingSink>> = vec![Box::new(LogSink)];
    if let Some(path) = &cli.track_log {
        sinks.push(Box::new(JsonLinesSink::open(path)?));
    }

    let mut state = AppState::new(&spec, config, prefs, sinks);

    let (result_tx, result_rx) = mpsc::unbounded_channel::<SubmitResult>();
    let submitter = Submitter::new(state.endpoint.clone(), result_tx)?;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stderr()))?;

    let outcome = run(&mut terminal, &mut state, &submitter, result_rx).await;

    // ── teardown ──────────────────────────────────────────────
    state.teardown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    outcome
}

async fn run(
    terminal: &mut Tui,
    state: &mut AppState,
    submitter: &Submitter,
    mut results: mpsc::UnboundedReceiver<SubmitResult>,
) -> Result<()> {
    let started = Instant::now();
    let now = || started.elapsed().as_millis() as u64;

    let size = terminal.size()?;
    state.boot(Rect::new(0, 0, size.width, size.height));

    let mut events = spawn_event_reader(Duration::from_millis(100));
    let mut frames = tokio::time::interval(Duration::from_millis(SCROLL_FRAME_BUDGET));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        // ── draw first ─────────────────────────────────────────
        terminal.draw(|frame| ui::draw(frame, state))?;

        for submission in state.outbox.drain(..) {
            submitter.dispatch(submission);
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                state.advance(now());
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m),
                    AppEvent::Resize(w, h) => state.resize(Rect::new(0, 0, w, h)),
                }
            }

            Some(result) = results.recv() => {
                state.advance(now());
                state.acknowledge(result);
            }

            _ = frames.tick() => state.frame(now()),
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

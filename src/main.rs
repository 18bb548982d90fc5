use std::io::{self, stdout, Read, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use triage::api::AnalysisClient;
use triage::app::LogicThread;
use triage::config::Config;
use triage::render::RenderState;
use triage::{tlog, ui, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// Triage - terminal client for a task prioritization service
#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    TRIAGE_DEBUG=1    Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Scoring service base URL (overrides config)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Ranking strategy sent to the scorer (overrides config)
    #[arg(short = 's', long)]
    pub strategy: Option<String>,

    /// Pin the scorer's reference date (YYYY-MM-DD) for deterministic runs
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Enable debug logging (writes to ~/.triage/triage.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Headless commands for scripted use
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Score a JSON task batch and print the result as JSON
    Analyze {
        /// File holding a JSON array of tasks, or - for stdin
        #[arg(long, default_value = "-")]
        input: String,
    },

    /// Ask the scorer for its top suggestions for a JSON task batch
    Suggest {
        /// File holding a JSON array of tasks, or - for stdin
        #[arg(long, default_value = "-")]
        input: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    triage::log::init(cli.debug);

    let mut config = Config::load()?;
    if cli.endpoint.is_some() {
        config.endpoint = cli.endpoint.clone();
    }
    if cli.strategy.is_some() {
        config.strategy = cli.strategy.clone();
    }
    if cli.today.is_some() {
        config.today = cli.today;
    }

    match cli.command {
        Some(Command::Analyze { input }) => return run_analyze(&config, &input),
        Some(Command::Suggest { input }) => return run_suggest(&config, &input),
        None => {
            // No subcommand: launch the TUI
        }
    }

    tlog!("triage starting");

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle = thread::spawn(move || LogicThread::run(config, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let _ = logic_handle.join();
    restore_terminal(&mut terminal)?;
    result
}

/// Read a task batch from a file or stdin ("-").
fn read_batch(input: &str) -> Result<Vec<triage::core::task::Task>> {
    let text = if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(input)?
    };
    AnalysisClient::parse_batch(&text)
}

/// Headless analyze: batch in, scored JSON out.
fn run_analyze(config: &Config, input: &str) -> Result<()> {
    let tasks = read_batch(input)?;
    tlog!("headless analyze: {} tasks from {}", tasks.len(), input);

    let client = AnalysisClient::new(config.effective_endpoint());
    let analysis = tokio::runtime::Runtime::new()?.block_on(client.analyze(
        &tasks,
        config.effective_strategy(),
        config.today,
    ))?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

/// Headless suggest: batch in, the scorer's top picks out.
fn run_suggest(config: &Config, input: &str) -> Result<()> {
    let tasks = read_batch(input)?;
    tlog!("headless suggest: {} tasks from {}", tasks.len(), input);

    let client = AnalysisClient::new(config.effective_endpoint());
    let suggestions = tokio::runtime::Runtime::new()?
        .block_on(client.suggest(&tasks, config.effective_strategy()))?;

    let json = serde_json::json!({ "suggestions": suggestions });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(
        io::stdout(),
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(
        io::stdout(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    Ok(disable_raw_mode()?)
}

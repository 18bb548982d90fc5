//! The logic thread: owns the model, pumps terminal events through the
//! update function, executes commands as spawned tokio tasks, advances the
//! force simulation at frame cadence, and publishes render snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use crossterm::event::{self, Event};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::AnalysisClient;
use crate::config::Config;
use crate::render::RenderState;
use crate::tea::{update, Command, Message, Model};
use crate::{tlog_debug, Result};

const MAX_BG_MESSAGES: usize = 50;

/// Simulation frame cadence while the layout is hot.
const SIM_FRAME: Duration = Duration::from_millis(16);

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: Config,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        let client = Arc::new(AnalysisClient::new(config.effective_endpoint()));
        tlog_debug!("LogicThread::run_async endpoint={}", client.endpoint());

        let today = chrono::Local::now().date_naive();
        let mut model = Model::new(config, today);

        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
        // Token of the in-flight analyze request; superseding cancels it.
        let mut inflight: Option<CancellationToken> = None;

        model.dirty = !send_state(&state_tx, &model);
        let mut last_frame = Instant::now();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Terminal input (priority)
            while event::poll(Duration::ZERO)? {
                let msg = match event::read()? {
                    Event::Key(key) => Some(Message::Key(key)),
                    Event::Mouse(mouse) => Some(Message::Mouse(mouse)),
                    Event::Paste(text) => Some(Message::Paste(text)),
                    Event::Resize(w, h) => Some(Message::Resize(w, h)),
                    _ => None,
                };
                let Some(msg) = msg else { continue };
                for cmd in update(&mut model, msg) {
                    if execute_command(cmd, &client, &msg_tx, &mut inflight) {
                        shutdown.store(true, Ordering::SeqCst);
                        if let Some(token) = inflight.take() {
                            token.cancel();
                        }
                        return Ok(());
                    }
                }
            }

            // Background messages (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                for cmd in update(&mut model, msg) {
                    if execute_command(cmd, &client, &msg_tx, &mut inflight) {
                        shutdown.store(true, Ordering::SeqCst);
                        if let Some(token) = inflight.take() {
                            token.cancel();
                        }
                        return Ok(());
                    }
                }
            }

            // Simulation frame
            if last_frame.elapsed() >= SIM_FRAME {
                last_frame = Instant::now();
                update(&mut model, Message::Tick);
            }

            if model.dirty {
                // A full channel means the renderer is a frame behind; keep
                // the dirty flag so this snapshot goes out next pass.
                model.dirty = !send_state(&state_tx, &model);
            }

            tokio::time::sleep(Duration::from_micros(500)).await;
        }

        if let Some(token) = inflight.take() {
            token.cancel();
        }
        Ok(())
    }
}

/// Execute one side effect. Returns true when the app should quit.
fn execute_command(
    cmd: Command,
    client: &Arc<AnalysisClient>,
    msg_tx: &mpsc::UnboundedSender<Message>,
    inflight: &mut Option<CancellationToken>,
) -> bool {
    match cmd {
        Command::Analyze {
            seq,
            tasks,
            strategy,
            today,
        } => {
            if let Some(previous) = inflight.take() {
                previous.cancel();
            }
            let token = CancellationToken::new();
            *inflight = Some(token.clone());

            let client = client.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {
                        tlog_debug!("analyze seq={} superseded, dropping request", seq);
                    }
                    outcome = client.analyze(&tasks, &strategy, today) => {
                        let _ = tx.send(Message::AnalysisFinished { seq, outcome });
                    }
                }
            });
            false
        }

        Command::SendFeedback { task_id, helpful } => {
            let client = client.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                let outcome = client.feedback(&task_id, helpful).await;
                let _ = tx.send(Message::FeedbackFinished {
                    task_id,
                    helpful,
                    outcome,
                });
            });
            false
        }

        Command::Quit => true,
    }
}

/// Publish a snapshot to the render thread. Returns false when the bounded
/// channel was full and the snapshot was dropped.
fn send_state(state_tx: &Sender<RenderState>, model: &Model) -> bool {
    state_tx.try_send(model.snapshot()).is_ok()
}

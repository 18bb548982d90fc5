//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - keyboard and mouse events,
//! the simulation frame tick, and completion callbacks from spawned
//! network tasks.

use crossterm::event::{KeyEvent, MouseEvent};

use crate::api::client::Analysis;
use crate::error::Error;

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Terminal events
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Bracketed paste content, routed to the active input buffer.
    Paste(String),
    Resize(u16, u16),

    /// Per-frame simulation advance while the layout is hot.
    Tick,

    /// An analyze request finished.
    AnalysisFinished {
        /// Sequence number the request was issued with; stale responses
        /// (older than the latest issued) are discarded.
        seq: u64,
        outcome: std::result::Result<Analysis, Error>,
    },

    /// A feedback submission finished.
    FeedbackFinished {
        task_id: String,
        helpful: bool,
        outcome: std::result::Result<(), Error>,
    },
}

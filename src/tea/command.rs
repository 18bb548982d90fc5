//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side
//! effects (network calls, app exit) to be executed by the runtime.

use chrono::NaiveDate;

use crate::core::task::Task;

/// Output commands from the update function.
#[derive(Debug)]
pub enum Command {
    /// Submit a batch for scoring. The runtime cancels any in-flight
    /// analyze request before dispatching this one.
    Analyze {
        seq: u64,
        tasks: Vec<Task>,
        strategy: String,
        today: Option<NaiveDate>,
    },

    /// Record feedback for a single task.
    SendFeedback { task_id: String, helpful: bool },

    // App lifecycle
    Quit,
}

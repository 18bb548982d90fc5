//! The Elm Architecture (TEA) implementation for the triage TUI.
//!
//! - `Model`: pure application state
//! - `Message`: inputs to the update function
//! - `Command`: outputs (side effects) from the update function
//! - `update`: pure function that transforms state

pub mod command;
pub mod message;
pub mod model;
pub mod update;

pub use command::Command;
pub use message::Message;
pub use model::{
    FeedbackPhase, FormField, FormState, Mode, Model, Notification, NotificationLevel, ViewTab,
    STRATEGIES,
};
pub use update::update;

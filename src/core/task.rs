//! Task wire types shared between the draft list and the scoring service.
//!
//! Fields follow the service's input contract: `estimated_hours` and
//! `importance` fall back to their documented defaults when a pasted batch
//! omits them or carries junk values, and an unparseable `due_date` is
//! treated as no due date rather than an error.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Fallback effort estimate when absent or invalid.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 1.0;

/// Fallback importance when absent or invalid.
pub const DEFAULT_IMPORTANCE: i64 = 5;

/// A dependency cycle as reported by the scoring service: a set of task ids.
pub type Cycle = Vec<String>;

/// A unit of work in a batch submitted for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique within a session for locally created tasks; externally
    /// supplied ids are taken as-is.
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "de_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default = "default_estimated_hours",
        deserialize_with = "de_estimated_hours"
    )]
    pub estimated_hours: f64,
    #[serde(default = "default_importance", deserialize_with = "de_importance")]
    pub importance: i64,
    /// Ordered dependency ids; may be empty, may reference ids absent from
    /// the batch.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A task as returned by the scoring service, annotated with its priority
/// score and a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    #[serde(flatten)]
    pub task: Task,
    /// In [0, 1] by convention; not locally enforced.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub reason: String,
}

/// Generate a session-local id: lowercase title with whitespace runs
/// collapsed to underscores, suffixed with the 1-based insertion index.
pub fn slug_id(title: &str, index: usize) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let ws = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"));
    format!("{}_{}", ws.replace_all(&title.to_lowercase(), "_"), index)
}

fn default_estimated_hours() -> f64 {
    DEFAULT_ESTIMATED_HOURS
}

fn default_importance() -> i64 {
    DEFAULT_IMPORTANCE
}

fn de_due_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => s.parse::<NaiveDate>().ok(),
        _ => None,
    })
}

fn de_estimated_hours<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed
        .filter(|h| h.is_finite() && *h > 0.0)
        .unwrap_or(DEFAULT_ESTIMATED_HOURS))
}

fn de_importance<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(d)?;
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(parsed.unwrap_or(DEFAULT_IMPORTANCE))
}

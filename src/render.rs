//! Immutable render snapshots.
//!
//! The logic thread builds a `RenderState` after every model change and
//! hands it to the render thread over a bounded channel. Snapshots carry a
//! monotonically increasing version so the render thread can skip frames
//! when nothing changed.

use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::tea::{FeedbackPhase, FormState, Mode, Notification, ViewTab};

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Display tier for a scored task. Styling only; never reorders results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            PriorityTier::High
        } else if score >= 0.4 {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        }
    }
}

/// A draft task as shown on the compose tab.
#[derive(Debug, Clone)]
pub struct DraftRow {
    pub id: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: f64,
    pub importance: i64,
    pub dependencies: Vec<String>,
}

/// A scored task as shown on the results tab, in service order.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub id: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: f64,
    pub importance: i64,
    pub score: f64,
    pub reason: String,
    pub tier: PriorityTier,
    pub feedback: FeedbackPhase,
}

/// A laid-out graph node ready to draw.
#[derive(Debug, Clone)]
pub struct NodeSprite {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub in_cycle: bool,
}

/// A resolved edge in world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct EdgeLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// The dependency graph view, positions included.
#[derive(Debug, Clone)]
pub struct GraphScene {
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeLine>,
    /// Edges whose source id resolved to no node; skipped when drawing.
    pub dangling_edges: usize,
    pub settled: bool,
}

/// Chips per quadrant, ordered as [`crate::core::quadrant::Quadrant::ALL`].
pub type MatrixCells = [Vec<String>; 4];

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub view: ViewTab,
    pub mode: Mode,
    pub form: FormState,
    pub json_input: String,
    pub strategy: String,
    pub drafts: Vec<DraftRow>,
    pub results: Vec<ResultRow>,
    pub selected: usize,
    pub graph: Option<GraphScene>,
    pub matrix: Option<MatrixCells>,
    pub loading: bool,
    pub notification: Option<Notification>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            view: ViewTab::Compose,
            mode: Mode::Normal,
            form: FormState::default(),
            json_input: String::new(),
            strategy: String::new(),
            drafts: Vec::new(),
            results: Vec::new(),
            selected: 0,
            graph: None,
            matrix: None,
            loading: false,
            notification: None,
        }
    }
}

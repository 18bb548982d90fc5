//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no handles, no
//! runtime infrastructure. The draft list is an owned `TaskStore`
//! instance, created with the model and reset only by restarting the app.

use std::collections::HashMap;

use chrono::NaiveDate;
use petgraph::graph::NodeIndex;

use crate::config::Config;
use crate::core::graph::TaskGraph;
use crate::core::layout::ForceSimulation;
use crate::core::quadrant::{classify, Quadrant};
use crate::core::store::TaskStore;
use crate::core::task::ScoredTask;
use crate::render::{
    next_version, DraftRow, EdgeLine, GraphScene, MatrixCells, NodeSprite, PriorityTier,
    RenderState, ResultRow,
};

/// Strategy presets the scoring service ships with. The strategy is still
/// transmitted as an opaque string, so a config override outside this list
/// works fine; cycling just starts over from the first preset.
pub const STRATEGIES: [&str; 4] = [
    "smart_balance",
    "fastest_wins",
    "high_impact",
    "deadline_driven",
];

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Error notification - displayed in red
    Error,
    /// Informational notification - displayed in green
    Info,
}

/// A notification message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// The four tabs of the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewTab {
    #[default]
    Compose,
    Results,
    Graph,
    Matrix,
}

impl ViewTab {
    pub const ALL: [ViewTab; 4] = [
        ViewTab::Compose,
        ViewTab::Results,
        ViewTab::Graph,
        ViewTab::Matrix,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViewTab::Compose => "Compose",
            ViewTab::Results => "Results",
            ViewTab::Graph => "Graph",
            ViewTab::Matrix => "Matrix",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ViewTab::Compose => 0,
            ViewTab::Results => 1,
            ViewTab::Graph => 2,
            ViewTab::Matrix => 3,
        }
    }

    /// Cycle to the next tab (Tab key behavior).
    pub fn next(&self) -> ViewTab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// Fields of the task entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    DueDate,
    Hours,
    Importance,
    Dependencies,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::DueDate => "Due date",
            FormField::Hours => "Hours",
            FormField::Importance => "Importance",
            FormField::Dependencies => "Depends on",
        }
    }

    /// Cycle to the next field (Tab behavior).
    pub fn next(&self) -> FormField {
        match self {
            FormField::Title => FormField::DueDate,
            FormField::DueDate => FormField::Hours,
            FormField::Hours => FormField::Importance,
            FormField::Importance => FormField::Dependencies,
            FormField::Dependencies => FormField::Title,
        }
    }
}

/// Application input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Editing a form field on the compose tab.
    EditForm(FormField),
    /// Editing the raw JSON batch buffer.
    EditJson,
}

/// Raw text buffers for the task entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub title: String,
    pub due_date: String,
    pub estimated_hours: String,
    pub importance: String,
    pub dependencies: String,
}

impl FormState {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::DueDate => &self.due_date,
            FormField::Hours => &self.estimated_hours,
            FormField::Importance => &self.importance,
            FormField::Dependencies => &self.dependencies,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::DueDate => &mut self.due_date,
            FormField::Hours => &mut self.estimated_hours,
            FormField::Importance => &mut self.importance,
            FormField::Dependencies => &mut self.dependencies,
        }
    }

    /// Reset the fields that describe the task identity; hours and
    /// importance stick around for rapid repeated entry.
    pub fn clear_after_add(&mut self) {
        self.title.clear();
        self.due_date.clear();
        self.dependencies.clear();
    }
}

/// Per-task lifecycle of the feedback controls. Anything but `Idle`
/// means both controls are disabled for that task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackPhase {
    #[default]
    Idle,
    Pending,
    Acked {
        helpful: bool,
    },
    ServiceFailed,
    NetworkFailed,
}

impl FeedbackPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, FeedbackPhase::Idle)
    }

    /// Control label once feedback has been activated.
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackPhase::Idle => "",
            FeedbackPhase::Pending => "sending…",
            FeedbackPhase::Acked { helpful: true } => "thanks!",
            FeedbackPhase::Acked { helpful: false } => "noted.",
            FeedbackPhase::ServiceFailed => "error",
            FeedbackPhase::NetworkFailed => "network error",
        }
    }
}

/// Pure application state - the single source of truth.
pub struct Model {
    // Draft input
    pub store: TaskStore,
    pub form: FormState,
    pub json_input: String,

    // UI state
    pub mode: Mode,
    pub view: ViewTab,
    pub strategy: String,
    pub selected: usize,
    pub notification: Option<Notification>,
    pub terminal: (u16, u16),

    // Latest analysis
    pub results: Vec<ScoredTask>,
    pub graph: Option<TaskGraph>,
    pub sim: Option<ForceSimulation>,
    pub feedback: HashMap<String, FeedbackPhase>,

    // In-flight request tracking
    pub loading: bool,
    /// Sequence number of the most recently issued analyze request;
    /// responses tagged with an older number are discarded.
    pub latest_seq: u64,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    // Immutable after init
    pub config: Config,
    pub today: NaiveDate,
}

impl Model {
    /// Create a fresh model. `fallback_today` is the local date; a
    /// `today` override in the config wins so the quadrant view agrees
    /// with a pinned scorer date.
    pub fn new(config: Config, fallback_today: NaiveDate) -> Self {
        let strategy = config.effective_strategy().to_string();
        let today = config.today.unwrap_or(fallback_today);
        Self {
            store: TaskStore::new(),
            form: FormState::default(),
            json_input: String::new(),
            mode: Mode::default(),
            view: ViewTab::default(),
            strategy,
            selected: 0,
            notification: None,
            terminal: (80, 24),
            results: Vec::new(),
            graph: None,
            sim: None,
            feedback: HashMap::new(),
            loading: false,
            latest_seq: 0,
            dirty: true,
            config,
            today,
        }
    }

    /// Advance to the next strategy preset.
    pub fn cycle_strategy(&mut self) {
        let next = STRATEGIES
            .iter()
            .position(|s| *s == self.strategy)
            .map(|i| (i + 1) % STRATEGIES.len())
            .unwrap_or(0);
        self.strategy = STRATEGIES[next].to_string();
    }

    pub fn feedback_phase(&self, task_id: &str) -> FeedbackPhase {
        self.feedback.get(task_id).copied().unwrap_or_default()
    }

    /// Create an immutable snapshot for the render thread.
    ///
    /// Each snapshot gets a monotonically increasing version number so the
    /// render thread can skip redundant draws.
    pub fn snapshot(&self) -> RenderState {
        let drafts = self
            .store
            .tasks()
            .iter()
            .map(|t| DraftRow {
                id: t.id.clone(),
                title: t.title.clone(),
                due_date: t.due_date,
                estimated_hours: t.estimated_hours,
                importance: t.importance,
                dependencies: t.dependencies.clone(),
            })
            .collect();

        let results = self
            .results
            .iter()
            .map(|s| ResultRow {
                id: s.task.id.clone(),
                title: s.task.title.clone(),
                due_date: s.task.due_date,
                estimated_hours: s.task.estimated_hours,
                importance: s.task.importance,
                score: s.score,
                reason: s.reason.clone(),
                tier: PriorityTier::from_score(s.score),
                feedback: self.feedback_phase(&s.task.id),
            })
            .collect();

        RenderState {
            version: next_version(),
            view: self.view,
            mode: self.mode,
            form: self.form.clone(),
            json_input: self.json_input.clone(),
            strategy: self.strategy.clone(),
            drafts,
            results,
            selected: self.selected,
            graph: self.graph_scene(),
            matrix: self.matrix_cells(),
            loading: self.loading,
            notification: self.notification.clone(),
        }
    }

    fn graph_scene(&self) -> Option<GraphScene> {
        let (graph, sim) = (self.graph.as_ref()?, self.sim.as_ref()?);

        let nodes = (0..graph.node_count())
            .filter_map(|i| {
                let node = graph.node(NodeIndex::new(i))?;
                let (x, y) = sim.position(i)?;
                Some(NodeSprite {
                    id: node.id.clone(),
                    x,
                    y,
                    in_cycle: graph.is_in_cycle(&node.id),
                })
            })
            .collect();

        let edges: Vec<EdgeLine> = graph
            .resolved_edges()
            .filter_map(|(a, b)| {
                let (x1, y1) = sim.position(a.index())?;
                let (x2, y2) = sim.position(b.index())?;
                Some(EdgeLine { x1, y1, x2, y2 })
            })
            .collect();

        Some(GraphScene {
            dangling_edges: graph.edge_count() - edges.len(),
            nodes,
            edges,
            settled: sim.settled(),
        })
    }

    fn matrix_cells(&self) -> Option<MatrixCells> {
        if self.results.is_empty() {
            return None;
        }
        let mut cells: MatrixCells = Default::default();
        for scored in &self.results {
            let quadrant = classify(&scored.task, self.today);
            let slot = Quadrant::ALL
                .iter()
                .position(|q| *q == quadrant)
                .unwrap_or(0);
            cells[slot].push(format!("{} ({})", scored.task.id, scored.task.title));
        }
        Some(cells)
    }
}

//! Eisenhower quadrant classification.
//!
//! Urgency looks only at the due date: due within three days counts as
//! urgent, and a task without a due date is never urgent. Importance is a
//! plain threshold; upstream defaulting means a task entered without an
//! importance lands at 5 and renders as not-important.

use chrono::NaiveDate;

use crate::core::task::Task;

/// Days-until-due at or below which a task is urgent.
pub const URGENCY_WINDOW_DAYS: i64 = 3;

/// Importance at or above which a task is important.
pub const IMPORTANCE_THRESHOLD: i64 = 7;

/// One of the four urgency/importance buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Urgent and important.
    DoFirst,
    /// Not urgent, important.
    Schedule,
    /// Urgent, not important.
    Delegate,
    /// Neither urgent nor important.
    Eliminate,
}

impl Quadrant {
    /// All quadrants in display order: top-left, top-right, bottom-left,
    /// bottom-right.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::DoFirst,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Eliminate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::DoFirst => "Do First",
            Quadrant::Schedule => "Schedule",
            Quadrant::Delegate => "Delegate",
            Quadrant::Eliminate => "Eliminate",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Quadrant::DoFirst => "urgent & important",
            Quadrant::Schedule => "not urgent & important",
            Quadrant::Delegate => "urgent & not important",
            Quadrant::Eliminate => "not urgent & not important",
        }
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// True when the due date exists and falls within the urgency window of
/// `today`. Overdue tasks are urgent; undated tasks never are.
pub fn is_urgent(due_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    due_date
        .map(|due| (due - today).num_days() <= URGENCY_WINDOW_DAYS)
        .unwrap_or(false)
}

pub fn is_important(importance: i64) -> bool {
    importance >= IMPORTANCE_THRESHOLD
}

/// Assign a task to its quadrant relative to `today`.
pub fn classify(task: &Task, today: NaiveDate) -> Quadrant {
    match (is_urgent(task.due_date, today), is_important(task.importance)) {
        (true, true) => Quadrant::DoFirst,
        (false, true) => Quadrant::Schedule,
        (true, false) => Quadrant::Delegate,
        (false, false) => Quadrant::Eliminate,
    }
}

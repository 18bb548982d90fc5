//! In-memory draft list of manually entered tasks.
//!
//! The store is owned by the application model and passed by reference to
//! the handlers that need it. Entries live for the session: they are only
//! ever appended, and the whole store is dropped when the app exits.

use chrono::NaiveDate;

use crate::core::task::{slug_id, Task, DEFAULT_ESTIMATED_HOURS, DEFAULT_IMPORTANCE};
use crate::error::{Error, Result};

/// Ordered draft list of tasks awaiting submission.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task from form input.
    ///
    /// The title is trimmed and must be non-empty; `estimated_hours` and
    /// `importance` fall back to their defaults when absent or invalid.
    /// The generated id is the title slug plus the 1-based insertion index,
    /// so ids stay unique within a session even when titles repeat.
    ///
    /// # Errors
    /// Returns `Error::Validation` when the title is empty after trimming.
    pub fn add_task(
        &mut self,
        title: &str,
        due_date: Option<NaiveDate>,
        estimated_hours: Option<f64>,
        importance: Option<i64>,
        dependencies_raw: &str,
    ) -> Result<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }

        let task = Task {
            id: slug_id(title, self.tasks.len() + 1),
            title: title.to_string(),
            due_date,
            estimated_hours: estimated_hours
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(DEFAULT_ESTIMATED_HOURS),
            importance: importance.unwrap_or(DEFAULT_IMPORTANCE),
            dependencies: parse_dependencies(dependencies_raw),
        };

        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// The full ordered list, for rendering and submission.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Split a comma-separated dependency string into ids: tokens are trimmed,
/// empty tokens dropped, order preserved, duplicates kept.
pub fn parse_dependencies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

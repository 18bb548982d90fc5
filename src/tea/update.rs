//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute. All I/O happens via the
//! returned commands; errors from completed commands come back in as
//! messages and land in the notification area or per-task state.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::api::client::{Analysis, AnalysisClient};
use crate::core::graph::build_graph;
use crate::core::layout::ForceSimulation;
use crate::error::Error;
use crate::{tlog, tlog_warn, ui};

use super::command::Command;
use super::message::Message;
use super::model::{
    FeedbackPhase, FormField, Mode, Model, Notification, NotificationLevel, ViewTab,
};

/// World-space radius for picking a node with the mouse.
const HIT_RADIUS: f64 = 20.0;

/// Longest service error body shown in the notification line.
const ERROR_BODY_MAX: usize = 200;

/// Helper to set an error notification and mark model as dirty.
fn set_error(model: &mut Model, message: String) {
    tlog_warn!("UI Error: {}", message);
    model.notification = Some(Notification {
        level: NotificationLevel::Error,
        message,
    });
    model.dirty = true;
}

fn set_info(model: &mut Model, message: String) {
    model.notification = Some(Notification {
        level: NotificationLevel::Info,
        message,
    });
    model.dirty = true;
}

/// Pure update function: Model + Message → Commands
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.notification = None; // Clear notification on any key press
            model.dirty = true;
            match model.mode {
                Mode::Normal => update_normal_mode(model, key, &mut cmds),
                Mode::EditForm(field) => update_form_mode(model, key, field),
                Mode::EditJson => update_json_mode(model, key),
            }
        }

        Message::Paste(text) => {
            match model.mode {
                Mode::EditForm(field) => model.form.field_mut(field).push_str(&text),
                Mode::EditJson => model.json_input.push_str(&text),
                Mode::Normal => {}
            }
            model.dirty = true;
        }

        Message::Mouse(mouse) => update_mouse(model, mouse),

        Message::Resize(w, h) => {
            model.terminal = (w, h);
            model.dirty = true;
        }

        Message::Tick => {
            if let Some(sim) = model.sim.as_mut() {
                if !sim.settled() {
                    sim.tick();
                    if model.view == ViewTab::Graph {
                        model.dirty = true;
                    }
                }
            }
        }

        Message::AnalysisFinished { seq, outcome } => {
            handle_analysis_finished(model, seq, outcome);
        }

        Message::FeedbackFinished {
            task_id,
            helpful,
            outcome,
        } => {
            handle_feedback_finished(model, task_id, helpful, outcome);
        }
    }

    cmds
}

fn update_normal_mode(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Char('q') => cmds.push(Command::Quit),

        KeyCode::Tab => model.view = model.view.next(),
        KeyCode::Char('1') => model.view = ViewTab::Compose,
        KeyCode::Char('2') => model.view = ViewTab::Results,
        KeyCode::Char('3') => model.view = ViewTab::Graph,
        KeyCode::Char('4') => model.view = ViewTab::Matrix,

        KeyCode::Char('s') => model.cycle_strategy(),

        KeyCode::Char('e') => {
            model.view = ViewTab::Compose;
            model.mode = Mode::EditForm(FormField::Title);
        }

        KeyCode::Char('p') => {
            model.view = ViewTab::Compose;
            model.mode = Mode::EditJson;
        }

        KeyCode::Char('a') => submit_analysis(model, cmds),

        // Results navigation and feedback
        KeyCode::Char('j') | KeyCode::Down if model.view == ViewTab::Results => {
            if !model.results.is_empty() {
                model.selected = (model.selected + 1) % model.results.len();
            }
        }
        KeyCode::Char('k') | KeyCode::Up if model.view == ViewTab::Results => {
            if !model.results.is_empty() {
                model.selected = model
                    .selected
                    .checked_sub(1)
                    .unwrap_or(model.results.len() - 1);
            }
        }
        KeyCode::Char('h') if model.view == ViewTab::Results => {
            send_feedback(model, cmds, true);
        }
        KeyCode::Char('x') if model.view == ViewTab::Results => {
            send_feedback(model, cmds, false);
        }

        _ => {}
    }
}

fn update_form_mode(model: &mut Model, key: KeyEvent, field: FormField) {
    match key.code {
        KeyCode::Esc => model.mode = Mode::Normal,
        KeyCode::Tab => model.mode = Mode::EditForm(field.next()),
        KeyCode::Enter => commit_form(model),
        KeyCode::Backspace => {
            model.form.field_mut(field).pop();
        }
        KeyCode::Char(c) => model.form.field_mut(field).push(c),
        _ => {}
    }
}

fn update_json_mode(model: &mut Model, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => model.mode = Mode::Normal,
        KeyCode::Enter => model.json_input.push('\n'),
        KeyCode::Backspace => {
            model.json_input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(crossterm::event::KeyModifiers::CONTROL) => {
            model.json_input.clear();
        }
        KeyCode::Char(c) => model.json_input.push(c),
        _ => {}
    }
}

/// Turn the form buffers into a draft task. Only the title is validated;
/// the numeric fields fall back to their defaults when unparseable, and a
/// bad date is treated as no due date.
fn commit_form(model: &mut Model) {
    let due_date = model.form.due_date.trim().parse().ok();
    let hours = model.form.estimated_hours.trim().parse::<f64>().ok();
    let importance = model.form.importance.trim().parse::<i64>().ok();

    let title = model.form.title.clone();
    let deps = model.form.dependencies.clone();
    match model.store.add_task(&title, due_date, hours, importance, &deps) {
        Ok(task) => {
            let id = task.id.clone();
            model.form.clear_after_add();
            model.mode = Mode::EditForm(FormField::Title);
            set_info(model, format!("added {}", id));
        }
        Err(e) => set_error(model, e.to_string()),
    }
}

/// Pick the batch (pasted JSON wins over the draft list), validate it, and
/// dispatch an analyze command tagged with a fresh sequence number.
fn submit_analysis(model: &mut Model, cmds: &mut Vec<Command>) {
    let tasks = if !model.json_input.trim().is_empty() {
        match AnalysisClient::parse_batch(&model.json_input) {
            Ok(tasks) => tasks,
            Err(e) => {
                set_error(model, e.to_string());
                return;
            }
        }
    } else if model.store.is_empty() {
        set_error(model, "add tasks or paste JSON before analyzing".to_string());
        return;
    } else {
        model.store.tasks().to_vec()
    };

    model.latest_seq += 1;
    model.loading = true;
    tlog!(
        "analyze dispatched: seq={}, {} tasks, strategy={}",
        model.latest_seq,
        tasks.len(),
        model.strategy
    );
    cmds.push(Command::Analyze {
        seq: model.latest_seq,
        tasks,
        strategy: model.strategy.clone(),
        today: model.config.today,
    });
}

fn send_feedback(model: &mut Model, cmds: &mut Vec<Command>, helpful: bool) {
    let Some(scored) = model.results.get(model.selected) else {
        return;
    };
    let task_id = scored.task.id.clone();
    if !model.feedback_phase(&task_id).is_idle() {
        // Both controls are disabled once one has been activated.
        return;
    }
    model.feedback.insert(task_id.clone(), FeedbackPhase::Pending);
    cmds.push(Command::SendFeedback { task_id, helpful });
}

fn update_mouse(model: &mut Model, mouse: MouseEvent) {
    if model.view != ViewTab::Graph {
        return;
    }
    let Some(sim) = model.sim.as_mut() else {
        return;
    };

    let area = ui::graph_area(model.terminal.0, model.terminal.1);
    let world = ui::cell_to_world(area, mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some((x, y)) = world {
                if let Some(index) = sim.nearest_within(x, y, HIT_RADIUS) {
                    sim.drag_start(index);
                    model.dirty = true;
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some((x, y)) = world {
                sim.drag_to(x, y);
                model.dirty = true;
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            sim.drag_end();
            model.dirty = true;
        }
        _ => {}
    }
}

fn handle_analysis_finished(
    model: &mut Model,
    seq: u64,
    outcome: std::result::Result<Analysis, Error>,
) {
    if seq < model.latest_seq {
        // A newer request owns the loading indicator now.
        tlog_warn!(
            "discarding stale analyze response: seq={} latest={}",
            seq,
            model.latest_seq
        );
        return;
    }

    model.loading = false;
    model.dirty = true;

    match outcome {
        Ok(analysis) => {
            tlog!(
                "analysis complete: {} tasks, {} cycles",
                analysis.tasks.len(),
                analysis.cycles.len()
            );
            let tasks: Vec<_> = analysis.tasks.iter().map(|s| s.task.clone()).collect();
            let graph = build_graph(&tasks, &analysis.cycles);
            model.sim = Some(ForceSimulation::new(&graph));
            model.graph = Some(graph);
            model.results = analysis.tasks;
            model.feedback.clear();
            model.selected = 0;
            model.view = ViewTab::Results;
        }
        Err(Error::Service { status, body }) => {
            set_error(
                model,
                format!("service error ({}): {}", status, truncate(&body, ERROR_BODY_MAX)),
            );
        }
        Err(Error::Network(_)) => {
            set_error(model, "network error: could not reach the scoring service".to_string());
        }
        Err(e) => set_error(model, e.to_string()),
    }
}

fn handle_feedback_finished(
    model: &mut Model,
    task_id: String,
    helpful: bool,
    outcome: std::result::Result<(), Error>,
) {
    let phase = match outcome {
        Ok(()) => FeedbackPhase::Acked { helpful },
        Err(Error::Network(_)) => FeedbackPhase::NetworkFailed,
        Err(_) => FeedbackPhase::ServiceFailed,
    };
    model.feedback.insert(task_id, phase);
    model.dirty = true;
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len).collect();
        format!("{}…", cut)
    }
}

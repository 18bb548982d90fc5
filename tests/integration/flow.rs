//! End-to-end update-loop flows, driven without a terminal.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use triage::api::client::Analysis;
use triage::config::Config;
use triage::render::PriorityTier;
use triage::tea::{update, Command, FeedbackPhase, Message, Model, NotificationLevel, ViewTab};
use triage::Error;

use crate::fixtures::scored;

fn model() -> Model {
    let config = Config {
        today: NaiveDate::from_ymd_opt(2025, 3, 1),
        ..Config::default()
    };
    Model::new(config, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
}

fn key(model: &mut Model, code: KeyCode) -> Vec<Command> {
    update(model, Message::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn type_text(model: &mut Model, text: &str) {
    for c in text.chars() {
        key(model, KeyCode::Char(c));
    }
}

#[test]
fn compose_analyze_and_review_all_views() {
    let mut m = model();

    // Enter two tasks through the form.
    key(&mut m, KeyCode::Char('e'));
    type_text(&mut m, "Write report");
    key(&mut m, KeyCode::Tab); // due date
    type_text(&mut m, "2025-03-02");
    key(&mut m, KeyCode::Tab); // hours
    type_text(&mut m, "4");
    key(&mut m, KeyCode::Tab); // importance
    type_text(&mut m, "9");
    key(&mut m, KeyCode::Enter);

    type_text(&mut m, "Review draft");
    key(&mut m, KeyCode::Tab);
    key(&mut m, KeyCode::Tab);
    key(&mut m, KeyCode::Tab);
    key(&mut m, KeyCode::Tab); // dependencies
    type_text(&mut m, "write_report_1");
    key(&mut m, KeyCode::Enter);
    key(&mut m, KeyCode::Esc);

    assert_eq!(m.store.len(), 2);
    assert_eq!(m.store.tasks()[1].dependencies, vec!["write_report_1"]);

    // Dispatch the analysis.
    let cmds = key(&mut m, KeyCode::Char('a'));
    let (seq, tasks) = match &cmds[..] {
        [Command::Analyze { seq, tasks, .. }] => (*seq, tasks.clone()),
        other => panic!("expected analyze command, got {:?}", other),
    };
    assert!(m.loading);
    assert_eq!(tasks.len(), 2);

    // Simulate the service response: scores, one cycle.
    let analysis = Analysis {
        tasks: vec![
            scored(
                "write_report_1",
                NaiveDate::from_ymd_opt(2025, 3, 2),
                9,
                0.85,
                &[],
            ),
            scored("review_draft_2", None, 4, 0.35, &["write_report_1"]),
        ],
        cycles: vec![vec![
            "write_report_1".to_string(),
            "review_draft_2".to_string(),
        ]],
    };
    update(&mut m, Message::AnalysisFinished { seq, outcome: Ok(analysis) });

    assert!(!m.loading);
    assert_eq!(m.view, ViewTab::Results);

    // Results keep service order and tier by score.
    let state = m.snapshot();
    assert_eq!(state.results[0].id, "write_report_1");
    assert_eq!(state.results[0].tier, PriorityTier::High);
    assert_eq!(state.results[1].tier, PriorityTier::Low);

    // Graph: both nodes flagged as cycle members, one resolved edge.
    let scene = state.graph.expect("graph scene");
    assert_eq!(scene.nodes.len(), 2);
    assert!(scene.nodes.iter().all(|n| n.in_cycle));
    assert_eq!(scene.edges.len(), 1);
    assert_eq!(scene.dangling_edges, 0);

    // Matrix: due-in-1-day importance-9 lands in Do First; undated
    // importance-4 lands in Eliminate.
    let matrix = state.matrix.expect("matrix cells");
    assert!(matrix[0].iter().any(|c| c.contains("write_report_1")));
    assert!(matrix[3].iter().any(|c| c.contains("review_draft_2")));

    // The simulation settles if ticked long enough.
    for _ in 0..2000 {
        update(&mut m, Message::Tick);
    }
    assert!(m.snapshot().graph.expect("graph scene").settled);
}

#[test]
fn overlapping_analyses_latest_issued_wins() {
    let mut m = model();
    m.json_input = r#"[{"id":"a","title":"A"}]"#.to_string();

    let first = key(&mut m, KeyCode::Char('a'));
    let first_seq = match &first[..] {
        [Command::Analyze { seq, .. }] => *seq,
        other => panic!("expected analyze, got {:?}", other),
    };
    let second = key(&mut m, KeyCode::Char('a'));
    let second_seq = match &second[..] {
        [Command::Analyze { seq, .. }] => *seq,
        other => panic!("expected analyze, got {:?}", other),
    };
    assert!(second_seq > first_seq);

    // The slower first request resolves after the second: discarded.
    update(
        &mut m,
        Message::AnalysisFinished {
            seq: second_seq,
            outcome: Ok(Analysis {
                tasks: vec![scored("fresh", None, 5, 0.5, &[])],
                cycles: Vec::new(),
            }),
        },
    );
    update(
        &mut m,
        Message::AnalysisFinished {
            seq: first_seq,
            outcome: Ok(Analysis {
                tasks: vec![scored("stale", None, 5, 0.5, &[])],
                cycles: Vec::new(),
            }),
        },
    );

    assert_eq!(m.results.len(), 1);
    assert_eq!(m.results[0].task.id, "fresh");
}

#[test]
fn validation_failure_never_reaches_the_network() {
    let mut m = model();
    m.json_input = r#"{"a":1}"#.to_string();

    let cmds = key(&mut m, KeyCode::Char('a'));

    assert!(cmds.is_empty(), "no command may be dispatched");
    assert!(!m.loading);
    assert_eq!(m.latest_seq, 0);
    let note = m.notification.clone().expect("validation notification");
    assert_eq!(note.level, NotificationLevel::Error);
    assert!(note.message.contains("array"));
}

#[test]
fn service_failure_keeps_previous_results() {
    let mut m = model();
    m.latest_seq = 1;
    m.loading = true;
    update(
        &mut m,
        Message::AnalysisFinished {
            seq: 1,
            outcome: Ok(Analysis {
                tasks: vec![scored("keep_me", None, 5, 0.6, &[])],
                cycles: Vec::new(),
            }),
        },
    );

    m.json_input = r#"[{"id":"b","title":"B"}]"#.to_string();
    let cmds = key(&mut m, KeyCode::Char('a'));
    let seq = match &cmds[..] {
        [Command::Analyze { seq, .. }] => *seq,
        other => panic!("expected analyze, got {:?}", other),
    };
    update(
        &mut m,
        Message::AnalysisFinished {
            seq,
            outcome: Err(Error::Service {
                status: 400,
                body: "bad batch".to_string(),
            }),
        },
    );

    assert!(!m.loading, "loading clears on the error path");
    assert_eq!(m.results[0].task.id, "keep_me", "old results survive");
}

#[test]
fn feedback_lifecycle_is_independent_per_task() {
    let mut m = model();
    m.latest_seq = 1;
    update(
        &mut m,
        Message::AnalysisFinished {
            seq: 1,
            outcome: Ok(Analysis {
                tasks: vec![
                    scored("x", None, 5, 0.8, &[]),
                    scored("y", None, 5, 0.2, &[]),
                ],
                cycles: Vec::new(),
            }),
        },
    );
    assert_eq!(m.view, ViewTab::Results);

    // Not-helpful on x.
    let cmds = key(&mut m, KeyCode::Char('x'));
    assert!(matches!(
        &cmds[..],
        [Command::SendFeedback { task_id, helpful: false }] if task_id == "x"
    ));

    // While x is pending, its controls are dead but y's are live.
    assert_eq!(m.feedback_phase("x"), FeedbackPhase::Pending);
    assert!(key(&mut m, KeyCode::Char('h')).is_empty());
    key(&mut m, KeyCode::Char('j'));
    let cmds = key(&mut m, KeyCode::Char('h'));
    assert!(matches!(
        &cmds[..],
        [Command::SendFeedback { task_id, helpful: true }] if task_id == "y"
    ));

    // Outcomes land independently and update the labels.
    update(
        &mut m,
        Message::FeedbackFinished {
            task_id: "x".to_string(),
            helpful: false,
            outcome: Err(Error::Network("down".to_string())),
        },
    );
    update(
        &mut m,
        Message::FeedbackFinished {
            task_id: "y".to_string(),
            helpful: true,
            outcome: Ok(()),
        },
    );
    let state = m.snapshot();
    assert_eq!(state.results[0].feedback, FeedbackPhase::NetworkFailed);
    assert_eq!(
        state.results[1].feedback,
        FeedbackPhase::Acked { helpful: true }
    );

    // A new analysis resets the feedback state wholesale.
    m.latest_seq += 1;
    let seq = m.latest_seq;
    update(
        &mut m,
        Message::AnalysisFinished {
            seq,
            outcome: Ok(Analysis {
                tasks: vec![scored("x", None, 5, 0.8, &[])],
                cycles: Vec::new(),
            }),
        },
    );
    assert!(m.feedback_phase("x").is_idle());
}

#[test]
fn dangling_dependencies_flow_through_to_the_scene() {
    let mut m = model();
    m.latest_seq = 1;
    update(
        &mut m,
        Message::AnalysisFinished {
            seq: 1,
            outcome: Ok(Analysis {
                tasks: vec![scored("a", None, 5, 0.5, &["missing", "also_missing"])],
                cycles: Vec::new(),
            }),
        },
    );
    let scene = m.snapshot().graph.expect("graph scene");
    assert_eq!(scene.nodes.len(), 1);
    assert!(scene.edges.is_empty(), "unresolved edges draw no lines");
    assert_eq!(scene.dangling_edges, 2);
}

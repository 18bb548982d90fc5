//! Terminal UI rendering for the triage TUI.
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state, which keeps every view testable against a
//! ratatui TestBackend. Minimal chrome: whitespace and color carry the
//! structure, selection uses the REVERSED modifier so it adapts to the
//! terminal theme.
//!
//! The graph canvas and the mouse hit-test share `graph_area` /
//! `cell_to_world`, so pointer math and drawing can never disagree.

use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Paragraph,
    },
    Frame,
};

use crate::core::layout::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::core::quadrant::Quadrant;
use crate::render::{GraphScene, PriorityTier, RenderState, ResultRow};
use crate::tea::{FeedbackPhase, FormField, Mode, NotificationLevel, ViewTab};

// Color tokens (selection uses REVERSED modifier to adapt to terminal theme)
const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;

// Graph node coding per the cycle highlight contract
const COLOR_NODE_CYCLE: Color = Color::Red;
const COLOR_NODE_OK: Color = Color::Green;
const COLOR_EDGE: Color = Color::DarkGray;

// Priority tier coding for the results list
const COLOR_TIER_HIGH: Color = Color::Red;
const COLOR_TIER_MEDIUM: Color = Color::Yellow;
const COLOR_TIER_LOW: Color = Color::DarkGray;

const COLOR_LOADING: Color = Color::Yellow;

const HEADER_HEIGHT: u16 = 2;
const FOOTER_HEIGHT: u16 = 2;

/// Lines each result row occupies in the list.
const RESULT_ROW_LINES: usize = 4;

fn tier_color(tier: PriorityTier) -> Color {
    match tier {
        PriorityTier::High => COLOR_TIER_HIGH,
        PriorityTier::Medium => COLOR_TIER_MEDIUM,
        PriorityTier::Low => COLOR_TIER_LOW,
    }
}

/// Split the whole terminal into header, body, footer.
fn regions(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// The rectangle the graph canvas occupies for a terminal of the given
/// size. The update loop uses this for mouse hit-testing.
pub fn graph_area(width: u16, height: u16) -> Rect {
    let (_, body, _) = regions(Rect::new(0, 0, width, height));
    // First body line is the graph status line.
    Rect {
        y: body.y + 1,
        height: body.height.saturating_sub(1),
        ..body
    }
}

/// Map a terminal cell inside `area` to layout world coordinates.
/// Returns None outside the area. The y axis flips: canvas world
/// coordinates grow upward, terminal rows grow downward.
pub fn cell_to_world(area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    if area.width == 0 || area.height == 0 || !area.contains(Position::new(column, row)) {
        return None;
    }
    let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
    let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
    Some((fx * WORLD_WIDTH, (1.0 - fy) * WORLD_HEIGHT))
}

/// Render one frame from a snapshot.
pub fn draw(f: &mut Frame, state: &RenderState) {
    let (header, body, footer) = regions(f.area());

    draw_header(f, header, state);
    match state.view {
        ViewTab::Compose => draw_compose(f, body, state),
        ViewTab::Results => draw_results(f, body, state),
        ViewTab::Graph => draw_graph(f, body, state),
        ViewTab::Matrix => draw_matrix(f, body, state),
    }
    draw_footer(f, footer, state);
}

fn draw_header(f: &mut Frame, area: Rect, state: &RenderState) {
    let mut spans = vec![Span::raw(" ")];
    for tab in ViewTab::ALL {
        let style = if tab == state.view {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(COLOR_TEXT_DIMMED)
        };
        spans.push(Span::styled(
            format!(" {} {} ", tab.index() + 1, tab.label()),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        format!("  strategy: {}", state.strategy),
        Style::default().fg(COLOR_TEXT_MUTED),
    ));
    if state.loading {
        spans.push(Span::styled(
            "  analyzing…",
            Style::default().fg(COLOR_LOADING),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_compose(f: &mut Frame, area: Rect, state: &RenderState) {
    let columns = Layout::horizontal([Constraint::Length(36), Constraint::Min(0)]).split(area);
    draw_form(f, columns[0], state);
    draw_drafts(f, columns[1], state);
}

fn draw_form(f: &mut Frame, area: Rect, state: &RenderState) {
    let fields = [
        FormField::Title,
        FormField::DueDate,
        FormField::Hours,
        FormField::Importance,
        FormField::Dependencies,
    ];

    let mut lines = vec![Line::from(Span::styled(
        " new task",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for field in fields {
        let active = state.mode == Mode::EditForm(field);
        let marker = if active { "▸" } else { " " };
        let value_style = if active {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} {:<11}", marker, field.label()),
                Style::default().fg(COLOR_TEXT_DIMMED),
            ),
            Span::styled(state.form.field(field).to_string(), value_style),
        ]));
    }

    lines.push(Line::default());
    let json_len = state.json_input.trim().len();
    if state.mode == Mode::EditJson {
        lines.push(Line::from(Span::styled(
            " json batch (esc when done)",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let preview: String = state.json_input.chars().rev().take(200).collect();
        lines.push(Line::from(Span::styled(
            preview.chars().rev().collect::<String>(),
            Style::default().add_modifier(Modifier::REVERSED),
        )));
    } else if json_len > 0 {
        lines.push(Line::from(Span::styled(
            format!(" pasted JSON: {} chars (overrides drafts)", json_len),
            Style::default().fg(COLOR_TEXT_MUTED),
        )));
    }

    f.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn draw_drafts(f: &mut Frame, area: Rect, state: &RenderState) {
    let mut lines = vec![Line::from(Span::styled(
        format!(" local tasks ({})", state.drafts.len()),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for draft in &state.drafts {
        lines.push(Line::from(Span::raw(format!(" {}", draft.title))));
        let due = draft
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "—".to_string());
        let mut detail = format!(
            "   id: {} | due: {} | hours: {} | importance: {}",
            draft.id, due, draft.estimated_hours, draft.importance
        );
        if !draft.dependencies.is_empty() {
            detail.push_str(&format!(" | deps: {}", draft.dependencies.join(", ")));
        }
        lines.push(Line::from(Span::styled(
            detail,
            Style::default().fg(COLOR_TEXT_MUTED),
        )));
    }

    f.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn result_lines(row: &ResultRow, selected: bool) -> Vec<Line<'static>> {
    let head_style = if selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    let due = row
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "—".to_string());

    let feedback_line = if row.feedback.is_idle() {
        Line::from(Span::styled(
            "   [h] 👍 helpful   [x] 👎 not helpful",
            Style::default().fg(COLOR_TEXT_DIMMED),
        ))
    } else {
        Line::from(Span::styled(
            format!("   feedback: {}", row.feedback.label()),
            Style::default().fg(COLOR_TEXT_MUTED),
        ))
    };

    vec![
        Line::from(vec![
            Span::styled(format!(" {}", row.title), head_style),
            Span::raw("  "),
            Span::styled(
                format!("score {:.2} [{}]", row.score, row.tier.label()),
                Style::default().fg(tier_color(row.tier)),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "   id: {} | due: {} | hours: {} | importance: {}",
                row.id, due, row.estimated_hours, row.importance
            ),
            Style::default().fg(COLOR_TEXT_MUTED),
        )),
        Line::from(Span::styled(
            format!("   why: {}", row.reason),
            Style::default().fg(COLOR_TEXT_DIMMED),
        )),
        feedback_line,
    ]
}

fn draw_results(f: &mut Frame, area: Rect, state: &RenderState) {
    if state.results.is_empty() {
        let hint = if state.loading {
            " waiting for the scoring service…"
        } else {
            " no results yet — press a to analyze"
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(COLOR_TEXT_MUTED))),
            area,
        );
        return;
    }

    let mut lines = Vec::with_capacity(state.results.len() * RESULT_ROW_LINES);
    for (i, row) in state.results.iter().enumerate() {
        lines.extend(result_lines(row, i == state.selected));
    }

    // Keep the selection in view: scroll so the selected row sits roughly
    // mid-screen once the list outgrows the area.
    let selected_top = state.selected * RESULT_ROW_LINES;
    let scroll = (selected_top as u16).saturating_sub(area.height / 2);

    f.render_widget(
        Paragraph::new(Text::from(lines)).scroll((scroll, 0)),
        area,
    );
}

fn draw_graph(f: &mut Frame, area: Rect, state: &RenderState) {
    let Some(scene) = &state.graph else {
        f.render_widget(
            Paragraph::new(Span::styled(
                " no graph yet — run an analysis first",
                Style::default().fg(COLOR_TEXT_MUTED),
            )),
            area,
        );
        return;
    };

    let mut status = vec![Span::styled(
        if scene.settled {
            " settled"
        } else {
            " settling…"
        },
        Style::default().fg(COLOR_TEXT_MUTED),
    )];
    status.push(Span::styled(
        "   drag nodes with the mouse",
        Style::default().fg(COLOR_TEXT_MUTED),
    ));
    status.push(Span::styled("   ● in cycle", Style::default().fg(COLOR_NODE_CYCLE)));
    status.push(Span::styled("  ● ok", Style::default().fg(COLOR_NODE_OK)));
    if scene.dangling_edges > 0 {
        status.push(Span::styled(
            format!("   {} unresolved dependencies hidden", scene.dangling_edges),
            Style::default().fg(COLOR_TEXT_MUTED),
        ));
    }
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);
    f.render_widget(Paragraph::new(Line::from(status)), rows[0]);

    let canvas = Canvas::default()
        .x_bounds([0.0, WORLD_WIDTH])
        .y_bounds([0.0, WORLD_HEIGHT])
        .paint(|ctx| paint_graph(ctx, scene));
    f.render_widget(canvas, rows[1]);
}

fn paint_graph(ctx: &mut ratatui::widgets::canvas::Context<'_>, scene: &GraphScene) {
    for edge in &scene.edges {
        ctx.draw(&CanvasLine {
            x1: edge.x1,
            y1: edge.y1,
            x2: edge.x2,
            y2: edge.y2,
            color: COLOR_EDGE,
        });
    }
    for node in &scene.nodes {
        let color = if node.in_cycle {
            COLOR_NODE_CYCLE
        } else {
            COLOR_NODE_OK
        };
        ctx.draw(&Circle {
            x: node.x,
            y: node.y,
            radius: 6.0,
            color,
        });
        ctx.print(
            node.x + 9.0,
            node.y,
            Line::from(Span::styled(
                node.id.clone(),
                Style::default().fg(COLOR_TEXT_DIMMED),
            )),
        );
    }
}

fn draw_matrix(f: &mut Frame, area: Rect, state: &RenderState) {
    let Some(cells) = &state.matrix else {
        f.render_widget(
            Paragraph::new(Span::styled(
                " no matrix yet — run an analysis first",
                Style::default().fg(COLOR_TEXT_MUTED),
            )),
            area,
        );
        return;
    };

    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let slots = [top[0], top[1], bottom[0], bottom[1]];

    for (i, quadrant) in Quadrant::ALL.iter().enumerate() {
        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!(" {}", quadrant.label()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", quadrant.subtitle()),
                Style::default().fg(COLOR_TEXT_MUTED),
            ),
        ])];
        // Chips stack in arrival order; overlap with the cell edge is fine.
        for chip in &cells[i] {
            lines.push(Line::from(Span::raw(format!("  {}", chip))));
        }
        f.render_widget(Paragraph::new(Text::from(lines)), slots[i]);
    }
}

fn draw_footer(f: &mut Frame, area: Rect, state: &RenderState) {
    let keys = match state.mode {
        Mode::Normal => match state.view {
            ViewTab::Results => {
                " j/k select │ h helpful │ x not helpful │ a analyze │ s strategy │ 1-4 views │ q quit"
            }
            ViewTab::Graph => " drag with mouse │ a analyze │ s strategy │ 1-4 views │ q quit",
            _ => " e edit task │ p paste json │ a analyze │ s strategy │ 1-4 views │ q quit",
        },
        Mode::EditForm(_) => " type to edit │ tab next field │ enter add task │ esc done",
        Mode::EditJson => " paste or type json │ ctrl-u clear │ esc done",
    };
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);
    f.render_widget(
        Paragraph::new(Span::styled(keys, Style::default().fg(COLOR_TEXT_MUTED))),
        rows[0],
    );

    if let Some(note) = &state.notification {
        let (style, prefix) = match note.level {
            NotificationLevel::Error => (Style::default().fg(Color::Red), " Error: "),
            NotificationLevel::Info => (Style::default().fg(Color::Green), " "),
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(note.message.clone(), style),
            ])),
            rows[1],
        );
    }
}

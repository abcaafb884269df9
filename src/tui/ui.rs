//! UI rendering for the TUI.
//!
//! Handles layout and widget rendering using ratatui.
//! Supports customizable themes via the Theme struct.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
    Frame,
};

use crate::app::AppMode;
use crate::core::NotificationLevel;
use crate::workflow::WorkflowState;
use crate::App;

/// Key hints shown in the status bar, by workflow state.
const IDLE_HINTS: &str = "g generate • l logout • ? help • q quit";
const DRAFT_HINTS: &str = "g regenerate • e edit • t time • s schedule • ? help";
const BUSY_HINTS: &str = "waiting for the content service…";
const DONE_HINTS: &str = "a acknowledge • g generate • ? help";
const EDIT_HINTS: &str = "Enter save • Esc cancel";
const EDIT_DRAFT_HINTS: &str = "Enter save • Alt+Enter new line • Esc cancel";

/// Draw the main UI.
pub fn draw(frame: &mut Frame, app: &App) {
    if matches!(app.mode, AppMode::Help) {
        draw_help_screen(frame, app);
        return;
    }

    if app.session.is_none() {
        draw_login_screen(frame, app);
        return;
    }

    draw_workflow_screen(frame, app);
}

/// Draw the username prompt.
fn draw_login_screen(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered_rect(50, 9, frame.area());

    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(
            " brandpost ",
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .padding(Padding::horizontal(2));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Intro
            Constraint::Length(1), // Prompt
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Status
        ])
        .split(inner);

    let intro = Paragraph::new(Line::from(Span::styled(
        "Log in to generate and schedule posts.",
        Style::default().fg(theme.text_dim),
    )));
    frame.render_widget(intro, chunks[0]);

    let prompt = "Username: ";
    let input = Paragraph::new(Line::from(vec![
        Span::styled(prompt, Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD)),
        Span::styled(&app.input, Style::default().fg(theme.text)),
    ]));
    frame.render_widget(input, chunks[1]);
    set_input_cursor(frame, app, chunks[1], prompt.len() as u16);

    if let Some(message) = &app.status_message {
        let status = Paragraph::new(Span::styled(message, Style::default().fg(theme.warning)))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, chunks[3]);
    }
}

/// Draw the generate/review/schedule screen.
fn draw_workflow_screen(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(6),    // Draft
            Constraint::Length(3), // Schedule time
            Constraint::Length(3), // Notification
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    draw_draft_panel(frame, app, chunks[1]);
    draw_time_field(frame, app, chunks[2]);
    draw_notification(frame, app, chunks[3]);
    draw_status_bar(frame, app, chunks[4]);
}

/// Draw the header with the user and the workflow state badge.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let user = app.session.as_ref().map(|s| s.identity().as_str()).unwrap_or_default();

    let mut spans = vec![
        Span::styled(" ", Style::default()),
        Span::styled(user, Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD)),
        Span::styled(" │ ", Style::default().fg(theme.border)),
    ];

    if let Some(state) = app.workflow_state() {
        spans.push(Span::styled(
            format!(" {} ", state.name().to_uppercase()),
            Style::default()
                .bg(theme.state_color(state))
                .fg(theme.background)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled(
                " brandpost ",
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            ))
            .title(
                Line::from(Span::styled(
                    format!(" {} ", app.service_name()),
                    Style::default().fg(theme.text_muted),
                ))
                .right_aligned(),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(header, area);
}

/// Draw the draft, or the editor when editing it.
fn draw_draft_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let editing = app.mode == AppMode::EditDraft;
    let state = app.workflow_state();

    let (text, style) = if editing {
        (app.input.clone(), Style::default().fg(theme.text))
    } else if let Some(draft) = state.and_then(WorkflowState::draft) {
        (draft.content.clone(), Style::default().fg(theme.secondary))
    } else if let Some(WorkflowState::Scheduled { request }) = state {
        (request.content.clone(), Style::default().fg(theme.text_dim))
    } else {
        let hint = match state {
            Some(WorkflowState::Generating { .. }) => "Generating your post…",
            _ => "No draft yet. Press g to generate one from your profile.",
        };
        (hint.to_string(), Style::default().fg(theme.text_muted))
    };

    let title = if editing { " Draft (editing) " } else { " Draft " };
    let border = if editing { theme.primary } else { theme.border };

    let panel = Paragraph::new(text).style(style).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(Span::styled(title, Style::default().fg(theme.text_dim)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(panel, area);

    if editing {
        // Cursor on the last line of the editor
        let inner_width = area.width.saturating_sub(4).max(1);
        let before_cursor: String = app.input.chars().take(app.cursor_position).collect();
        let last_line = before_cursor.rsplit('\n').next().unwrap_or_default();
        let lines = before_cursor.matches('\n').count() as u16;
        let col = last_line.chars().count() as u16;
        frame.set_cursor_position((
            area.x + 2 + col % inner_width,
            (area.y + 1 + lines + col / inner_width).min(area.bottom().saturating_sub(2)),
        ));
    }
}

/// Draw the schedule time field.
fn draw_time_field(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let editing = app.mode == AppMode::EditTime;

    let line = if editing {
        Line::from(Span::styled(&app.input, Style::default().fg(theme.text)))
    } else {
        match app.workflow_state() {
            Some(WorkflowState::DraftReady { scheduled_time: Some(time), .. }) => {
                Line::from(Span::styled(time.as_str(), Style::default().fg(theme.text)))
            }
            Some(WorkflowState::Scheduling { request, .. } | WorkflowState::Scheduled { request }) => {
                Line::from(Span::styled(
                    request.scheduled_time.as_str(),
                    Style::default().fg(theme.text),
                ))
            }
            _ => Line::from(Span::styled(
                "not set (YYYY-MM-DDTHH:MM)",
                Style::default().fg(theme.text_muted),
            )),
        }
    };

    let border = if editing { theme.primary } else { theme.border };
    let field = Paragraph::new(line).block(
        Block::default()
            .title(Span::styled(" Schedule time ", Style::default().fg(theme.text_dim)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(field, area);

    if editing {
        set_input_cursor(frame, app, area, 2);
    }
}

/// Draw the latest notification, or the current error.
fn draw_notification(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let line = if let Some(notification) = &app.last_notification {
        let color = match notification.level {
            NotificationLevel::Success => theme.success,
            NotificationLevel::Error => theme.error,
        };
        Line::from(vec![
            Span::styled(
                format!("{} ", notification.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(&notification.message, Style::default().fg(theme.text)),
        ])
    } else if let Some(error) = app.workflow_state().and_then(WorkflowState::error) {
        Line::from(Span::styled(error.to_string(), Style::default().fg(theme.error)))
    } else {
        Line::from("")
    };

    let panel = Paragraph::new(line).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(panel, area);
}

/// Draw the status bar: status message on the left, key hints on the right.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let hints = match (app.mode, app.workflow_state()) {
        (AppMode::EditDraft, _) => EDIT_DRAFT_HINTS,
        (AppMode::EditTime, _) => EDIT_HINTS,
        (_, Some(state)) if state.is_busy() => BUSY_HINTS,
        (_, Some(WorkflowState::DraftReady { .. })) => DRAFT_HINTS,
        (_, Some(WorkflowState::Scheduled { .. } | WorkflowState::Failed { .. })) => DONE_HINTS,
        _ => IDLE_HINTS,
    };

    let left = app.status_message.as_deref().unwrap_or_default();
    let left_width = left.chars().count() + 1;
    let right_width = hints.chars().count();
    let total_width = area.width as usize;

    let padding = if total_width > left_width + right_width + 2 {
        total_width - left_width - right_width - 1
    } else {
        1
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {left}"), Style::default().fg(theme.text_dim)),
        Span::raw(" ".repeat(padding)),
        Span::styled(hints, Style::default().fg(theme.text_muted)),
    ]))
    .style(Style::default().bg(theme.background));

    frame.render_widget(status, area);
}

/// Draw the help screen.
fn draw_help_screen(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(10),   // Content
            Constraint::Length(2), // Footer
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![Span::styled(
        " Keyboard Shortcuts ",
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    )]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.primary)));
    frame.render_widget(title, chunks[0]);

    let section = |name: &'static str| {
        Line::from(Span::styled(
            name,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
    };

    let lines = vec![
        section("Posts"),
        Line::from(""),
        help_line("g", "Generate a post from your profile", theme),
        help_line("e", "Edit the draft", theme),
        help_line("t", "Pick the schedule time", theme),
        help_line("s", "Schedule the draft", theme),
        help_line("a / Enter", "Acknowledge a result or error", theme),
        Line::from(""),
        section("Editing"),
        Line::from(""),
        help_line("Enter", "Save", theme),
        help_line("Alt+Enter", "New line in the draft", theme),
        help_line("Esc", "Cancel", theme),
        help_line("Ctrl+U", "Clear input", theme),
        help_line("← / →", "Move cursor", theme),
        Line::from(""),
        section("General"),
        Line::from(""),
        help_line("l", "Log out", theme),
        help_line("?", "Show this help", theme),
        help_line("q / Esc", "Quit", theme),
        help_line("Ctrl+C", "Quit", theme),
    ];

    let content = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .padding(Padding::horizontal(2)),
    );
    frame.render_widget(content, chunks[1]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" Press ", Style::default().fg(theme.text_dim)),
        Span::styled("Esc", Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        Span::styled(", ", Style::default().fg(theme.text_dim)),
        Span::styled("?", Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        Span::styled(", or ", Style::default().fg(theme.text_dim)),
        Span::styled("Enter", Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        Span::styled(" to close ", Style::default().fg(theme.text_dim)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[2]);
}

fn help_line<'a>(key: &'a str, description: &'a str, theme: &crate::tui::Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("  {:14}", key),
            Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(description, Style::default().fg(theme.text)),
    ])
}

/// Place the terminal cursor inside a single-line input.
fn set_input_cursor(frame: &mut Frame, app: &App, area: Rect, offset: u16) {
    let col = app.input.chars().take(app.cursor_position).count() as u16;
    let x = (area.x + offset + col).min(area.right().saturating_sub(2));
    let y = if area.height > 2 { area.y + 1 } else { area.y };
    frame.set_cursor_position((x, y));
}

/// A rectangle of `width` percent and `height` rows, centered in `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(height), Constraint::Fill(1)])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width) / 2),
            Constraint::Percentage(width),
            Constraint::Percentage((100 - width) / 2),
        ])
        .split(vertical[1])[1]
}

//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, EditField, View};
use crate::data::duration::{format_duration, format_elapsed};

/// Render the header bar with the session overview.
///
/// Displays: run state, host, up/down counts, port count, session age.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.snapshot;
    let run_state = app.session().run_state();

    let up = snapshot.up_count();
    let down = snapshot.down_count();
    let elapsed = app
        .elapsed()
        .map(format_elapsed)
        .unwrap_or_else(|| "--:--".to_string());

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.run_state_style(run_state)),
        Span::styled("PORTWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(app.host.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
        Span::styled(run_state.label(), app.theme.run_state_style(run_state)),
        Span::raw(" │ "),
        Span::styled(format!("{}", up), Style::default().fg(app.theme.up)),
        Span::raw(" up "),
        if down > 0 {
            Span::styled(
                format!("{}", down),
                Style::default().fg(app.theme.down).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" down │ "),
        Span::styled(
            format!("{}", snapshot.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ports │ every "),
        Span::raw(format_duration(app.session().interval())),
        Span::raw(" │ "),
        Span::raw(elapsed),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Chart "),
        Line::from(format!(" 2:Targets ({}) ", app.snapshot.len())),
        Line::from(format!(" 3:Events ({}) ", app.snapshot.events.len())),
    ];

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: current view, time since last refresh, available controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let toggle = if app.is_monitoring() { "stop" } else { "start" };
    let controls = match app.current_view {
        View::Chart => format!("Space:{} r:restart i:edit e:export x:json Tab:switch ?:help q:quit", toggle),
        View::Targets | View::Events => format!(
            "↑↓:scroll Space:{} r:restart i:edit e:export x:json Tab:switch ?:help q:quit",
            toggle
        ),
    };

    let updated = app
        .last_refresh
        .map(|t| format!("Updated {:.1}s ago", t.elapsed().as_secs_f64()))
        .unwrap_or_else(|| "Not started".to_string());

    let status = format!(" {} | {} | {}", app.current_view.label(), updated, controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab/←/→     Switch views"),
        Line::from("  1/2/3       Chart/Targets/Events"),
        Line::from("  ↑/↓ j/k     Select target / scroll"),
        Line::from("  PgUp/PgDn   Jump 10 lines"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Session",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Space       Stop / start monitoring"),
        Line::from("  r           Restart monitoring"),
        Line::from("  i           Edit host / ports"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Export",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(format!("  e           Event log ({})", app.exports.summary.display())),
        Line::from(format!("  x           JSON ({})", app.exports.json.display())),
        Line::from(""),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 48u16.min(area.width.saturating_sub(4));
    let help_height = 23u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render the host/ports editor as a centered modal.
pub fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = &app.editor else {
        return;
    };

    let field_line = |label: &str, value: &str, active: bool| {
        let style = if active {
            app.theme.selected
        } else {
            Style::default()
        };
        let cursor = if active { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!(" {:<6}", label), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}{}", value, cursor), style),
        ])
    };

    let lines = vec![
        field_line("Host", &editor.host, editor.field == EditField::Host),
        field_line("Ports", &editor.ports, editor.field == EditField::Ports),
        Line::from(""),
        Line::from(Span::styled(
            " Enter:start  Tab:field  Esc:cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Targets ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let width = 56u16.min(area.width.saturating_sub(4));
    let height = 6u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let editor_area = Rect::new(x, y, width, height);

    frame.render_widget(ratatui::widgets::Clear, editor_area);
    frame.render_widget(Paragraph::new(lines).block(block), editor_area);
}

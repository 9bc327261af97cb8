//! Events view: the session's transition log.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use portwatch_core::output::{format_timestamp, SUMMARY_HEADER};
use portwatch_core::PortState;

use crate::app::App;

/// Render the event log, newest at the bottom.
///
/// `app.event_scroll` counts lines scrolled back from the newest event.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let events = &app.snapshot.events;
    let title = format!(" {} ({}) ", SUMMARY_HEADER.trim_end_matches(':'), events.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if events.is_empty() {
        let hint = Paragraph::new(" No transitions yet.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let end = events.len().saturating_sub(app.event_scroll);
    let start = end.saturating_sub(visible);

    let lines: Vec<Line> = events[start..end]
        .iter()
        .map(|event| {
            let state_style = match event.state {
                PortState::Up => Style::default().fg(app.theme.up),
                PortState::Down => Style::default().fg(app.theme.down).add_modifier(Modifier::BOLD),
            };
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", format_timestamp(event.timestamp_ms)),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::raw(format!(
                    "Port {} on {} went ",
                    event.target.port, event.target.host
                )),
                Span::styled(event.state.label(), state_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

//! Targets view: one row per monitored port.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use portwatch_core::output::format_timestamp;

use crate::app::App;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Samples shown in the trend column.
const TREND_WIDTH: usize = 20;

/// Render the Targets table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Port"),
        Cell::from("Rank"),
        Cell::from("State"),
        Cell::from("Samples"),
        Cell::from("Uptime"),
        Cell::from("Changes"),
        Cell::from("Last change"),
        Cell::from("Trend"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .snapshot
        .iter()
        .map(|series| {
            let state = series.current_state();
            let state_label = state.map(|s| s.label()).unwrap_or("-");
            let uptime = series
                .uptime_ratio()
                .map(|r| format!("{:.1}%", r * 100.0))
                .unwrap_or_else(|| "-".to_string());
            let changes = app.snapshot.events_for(&series.target).count();
            let last_change = app
                .snapshot
                .last_change(&series.target)
                .map(|e| format_timestamp(e.timestamp_ms))
                .unwrap_or_else(|| "-".to_string());
            let trend = render_sparkline(&app.history.sparkline(&series.target));

            Row::new(vec![
                Cell::from(series.target.port.to_string()),
                Cell::from(series.rank.to_string()),
                Cell::from(state_label).style(app.theme.state_style(state)),
                Cell::from(series.len().to_string()),
                Cell::from(uptime),
                Cell::from(changes.to_string()),
                Cell::from(last_change),
                Cell::from(trend).style(app.theme.state_style(state)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(24),
        Constraint::Min(TREND_WIDTH as u16),
    ];

    let position_info = if app.snapshot.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", app.selected_target + 1, app.snapshot.len())
    };
    let title = format!(" Targets on {}{} ", app.host, position_info);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !app.snapshot.is_empty() {
        state.select(Some(app.selected_target));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// Render the most recent bar heights as sparkline characters.
pub fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return " ".repeat(TREND_WIDTH);
    }

    let skip = data.len().saturating_sub(TREND_WIDTH);
    data[skip..]
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}

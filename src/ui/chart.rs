//! Chart view: every target's level over time.
//!
//! Up samples sit at the target's rank, down samples at 0, so each target
//! has its own baseline and outages drop to a shared floor.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use portwatch_types::TargetSeries;

use crate::app::App;

/// Seconds of history visible at once.
const WINDOW_SECS: f64 = 60.0;

/// Render the Chart view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Port levels (up = rank, down = 0) ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(origin_ms) = app
        .session_start_ms
        .or_else(|| app.snapshot.started_at_ms())
    else {
        let hint = Paragraph::new(" No session yet. Press Space to start monitoring.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let points: Vec<Vec<(f64, f64)>> = app
        .snapshot
        .iter()
        .map(|series| step_points(series, origin_ms))
        .collect();

    let latest = points
        .iter()
        .filter_map(|p| p.last().map(|(x, _)| *x))
        .fold(0.0_f64, f64::max);
    let x_max = latest.max(WINDOW_SECS);
    let x_min = (x_max - WINDOW_SECS).max(0.0);

    let datasets: Vec<Dataset> = app
        .snapshot
        .iter()
        .zip(points.iter())
        .map(|(series, data)| {
            Dataset::default()
                .name(format!(":{}", series.target.port))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(series.rank)))
                .data(data)
        })
        .collect();

    let top = app.snapshot.iter().map(|s| s.rank).max().unwrap_or(1);
    let y_labels: Vec<Span> = (0..=top).map(|level| Span::raw(level.to_string())).collect();
    let x_labels: Vec<Span> = [x_min, (x_min + x_max) / 2.0, x_max]
        .iter()
        .map(|x| Span::raw(format!("{:.0}s", x)))
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("elapsed")
                .style(Style::default().fg(app.theme.border))
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("level")
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, f64::from(top) + 0.5])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

/// Chart points for one series as a step line.
///
/// A level change is drawn as a vertical edge at the time of the new sample
/// instead of a diagonal between the two samples.
pub fn step_points(series: &TargetSeries, origin_ms: u64) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(series.len() * 2);
    let mut previous: Option<u16> = None;

    for sample in &series.samples {
        let x = sample.timestamp_ms.saturating_sub(origin_ms) as f64 / 1000.0;
        if let Some(level) = previous.filter(|&level| level != sample.level) {
            points.push((x, f64::from(level)));
        }
        points.push((x, f64::from(sample.level)));
        previous = Some(sample.level);
    }

    points
}

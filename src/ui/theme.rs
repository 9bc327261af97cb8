//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use portwatch_types::{PortState, RunState};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for reachable targets.
    pub up: Color,
    /// Color for unreachable targets.
    pub down: Color,
    /// Color for targets without samples yet.
    pub pending: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// One color per chart series, reused cyclically.
    pub series: Vec<Color>,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            up: Color::Green,
            down: Color::Red,
            pending: Color::Gray,
            border: Color::Gray,
            series: vec![
                Color::Cyan,
                Color::Yellow,
                Color::Magenta,
                Color::LightGreen,
                Color::LightBlue,
                Color::LightRed,
            ],
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            up: Color::Green,
            down: Color::Red,
            pending: Color::DarkGray,
            border: Color::DarkGray,
            series: vec![
                Color::Blue,
                Color::Magenta,
                Color::Rgb(176, 112, 0),
                Color::Green,
                Color::Red,
                Color::DarkGray,
            ],
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a target's current state (`None` = no sample yet).
    pub fn state_style(&self, state: Option<PortState>) -> Style {
        match state {
            Some(PortState::Up) => Style::default().fg(self.up),
            Some(PortState::Down) => Style::default().fg(self.down).add_modifier(Modifier::BOLD),
            None => Style::default().fg(self.pending),
        }
    }

    pub fn run_state_style(&self, state: RunState) -> Style {
        match state {
            RunState::Running => Style::default().fg(self.up).add_modifier(Modifier::BOLD),
            RunState::Stopped => Style::default().fg(self.pending),
        }
    }

    /// Chart color for the series with 1-based `rank`.
    pub fn series_color(&self, rank: u16) -> Color {
        if self.series.is_empty() {
            return self.highlight;
        }
        let index = (rank.saturating_sub(1) as usize) % self.series.len();
        self.series[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_colors_cycle() {
        let theme = Theme::dark();
        let n = theme.series.len() as u16;
        assert_eq!(theme.series_color(1), theme.series_color(1 + n));
        assert_ne!(theme.series_color(1), theme.series_color(2));
    }
}

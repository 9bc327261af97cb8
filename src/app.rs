//! Application state and session control for the terminal UI.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use portwatch_core::{Output, SessionController, SessionSnapshot};
use portwatch_types::current_timestamp_ms;
use tokio::runtime::Handle;

use crate::data::History;
use crate::ui::Theme;

/// How long a status message stays on screen.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Levels of every target over time.
    Chart,
    /// Per-target table with state, uptime and trend.
    Targets,
    /// The session event log.
    Events,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Chart => View::Targets,
            View::Targets => View::Events,
            View::Events => View::Chart,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Chart => View::Events,
            View::Targets => View::Chart,
            View::Events => View::Targets,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Chart => "Chart",
            View::Targets => "Targets",
            View::Events => "Events",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Chart => 0,
            View::Targets => 1,
            View::Events => 2,
        }
    }
}

/// Field being edited in the target editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Host,
    Ports,
}

/// Pending host and port list, applied on the next start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEditor {
    pub host: String,
    pub ports: String,
    pub field: EditField,
}

impl TargetEditor {
    fn buffer_mut(&mut self) -> &mut String {
        match self.field {
            EditField::Host => &mut self.host,
            EditField::Ports => &mut self.ports,
        }
    }

    pub fn push(&mut self, c: char) {
        self.buffer_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.buffer_mut().pop();
    }

    pub fn switch_field(&mut self) {
        self.field = match self.field {
            EditField::Host => EditField::Ports,
            EditField::Ports => EditField::Host,
        };
    }
}

/// Where the export keys write to.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub summary: PathBuf,
    pub json: PathBuf,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    /// Open while the user edits host/ports.
    pub editor: Option<TargetEditor>,

    // Session
    session: SessionController,
    runtime: Handle,
    pub host: String,
    pub port_spec: String,
    pub snapshot: SessionSnapshot,
    pub history: History,
    /// Wall-clock start of the current session.
    pub session_start_ms: Option<u64>,
    started_at: Option<Instant>,
    pub last_refresh: Option<Instant>,

    // Navigation state
    pub selected_target: usize,
    /// Lines scrolled up from the newest event.
    pub event_scroll: usize,

    pub exports: ExportPaths,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an app around a stopped controller.
    ///
    /// `runtime` is where monitors are spawned and where stop is awaited; the
    /// UI loop itself runs outside the runtime.
    pub fn new(
        session: SessionController,
        runtime: Handle,
        host: impl Into<String>,
        port_spec: impl Into<String>,
        exports: ExportPaths,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Chart,
            show_help: false,
            editor: None,
            session,
            runtime,
            host: host.into(),
            port_spec: port_spec.into(),
            snapshot: SessionSnapshot::default(),
            history: History::new(),
            session_start_ms: None,
            started_at: None,
            last_refresh: None,
            selected_target: 0,
            event_scroll: 0,
            exports,
            theme,
            status_message: None,
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn is_monitoring(&self) -> bool {
        self.session.is_running()
    }

    /// Time since the current (or last) session started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Start monitoring `host`/`port_spec`.
    pub fn start_session(&mut self) {
        let _guard = self.runtime.enter();
        match self.session.start(&self.host, &self.port_spec) {
            Ok(report) => {
                self.history.clear();
                self.session_start_ms = Some(current_timestamp_ms());
                self.started_at = Some(Instant::now());
                self.selected_target = 0;
                self.event_scroll = 0;

                let mut message = if report.targets.is_empty() {
                    "No valid ports to monitor".to_string()
                } else {
                    format!("Monitoring {} port(s) on {}", report.targets.len(), self.host)
                };
                if !report.rejected.is_empty() {
                    let skipped: Vec<String> = report.rejected.iter().map(|e| e.token()).collect();
                    message.push_str(&format!(" | skipped: {}", skipped.join(", ")));
                }
                self.set_status_message(message);
            }
            Err(e) => self.set_status_message(format!("Start failed: {}", e)),
        }
        self.refresh();
    }

    /// Stop the running session and wait for its monitors.
    pub fn stop_session(&mut self) {
        if !self.session.is_running() {
            return;
        }
        let report = self.runtime.block_on(self.session.stop());
        self.refresh();
        self.set_status_message(format!("Stopped {} monitor(s)", report.total()));
    }

    /// Space bar: stop if running, otherwise start.
    pub fn toggle_session(&mut self) {
        if self.session.is_running() {
            self.stop_session();
        } else {
            self.start_session();
        }
    }

    /// Stop (if running) and start afresh with the same ports.
    pub fn restart_session(&mut self) {
        self.stop_session();
        self.start_session();
    }

    /// Open the editor on the ports field, seeded with the current values.
    pub fn begin_edit(&mut self) {
        self.editor = Some(TargetEditor {
            host: self.host.clone(),
            ports: self.port_spec.clone(),
            field: EditField::Ports,
        });
    }

    pub fn cancel_edit(&mut self) {
        self.editor = None;
    }

    /// Adopt the edited host/ports and start a fresh session with them.
    pub fn apply_edit(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        let host = editor.host.trim();
        if host.is_empty() {
            self.set_status_message("Host must not be empty".to_string());
            self.editor = Some(editor);
            return;
        }
        self.host = host.to_string();
        self.port_spec = editor.ports;
        self.restart_session();
    }

    /// Pull a fresh snapshot from the aggregator.
    pub fn refresh(&mut self) {
        self.snapshot = self.session.snapshot();
        self.history.record(&self.snapshot);
        self.last_refresh = Some(Instant::now());

        if self.selected_target >= self.snapshot.len() {
            self.selected_target = self.snapshot.len().saturating_sub(1);
        }
        self.event_scroll = self.event_scroll.min(self.snapshot.events.len());
    }

    /// Write the event log to the summary path.
    pub fn export_summary(&mut self) {
        let output = Output::summary(self.exports.summary.clone());
        self.export(output);
    }

    /// Write the session snapshot as JSON.
    pub fn export_json(&mut self) {
        let output = Output::json(self.exports.json.clone());
        self.export(output);
    }

    fn export(&mut self, output: Output) {
        match output.emit(&self.snapshot) {
            Ok(()) => {
                self.set_status_message(format!("Exported to {}", output.path().display()));
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.set_status_message(format!("Export failed: {}", e));
            }
        }
    }

    /// Stop monitoring and leave the main loop.
    pub fn shutdown(&mut self) {
        self.stop_session();
        self.running = false;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down (Targets) or towards newer events (Events).
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Targets => {
                let max = self.snapshot.len().saturating_sub(1);
                self.selected_target = (self.selected_target + n).min(max);
            }
            View::Events => {
                self.event_scroll = self.event_scroll.saturating_sub(n);
            }
            View::Chart => {}
        }
    }

    /// Move selection up (Targets) or towards older events (Events).
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Targets => {
                self.selected_target = self.selected_target.saturating_sub(n);
            }
            View::Events => {
                let max = self.snapshot.events.len().saturating_sub(1);
                self.event_scroll = (self.event_scroll + n).min(max);
            }
            View::Chart => {}
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwatch_core::{FnProbe, RunState, Target};
    use std::sync::Arc;
    use tokio::runtime::Runtime;

    fn app(runtime: &Runtime, spec: &str, dir: &std::path::Path) -> App {
        let session = SessionController::builder()
            .prober(Arc::new(FnProbe::new(|t: &Target| t.port == 80)))
            .interval(Duration::from_millis(20))
            .build();
        App::new(
            session,
            runtime.handle().clone(),
            "127.0.0.1",
            spec,
            ExportPaths {
                summary: dir.join("port-summary.txt"),
                json: dir.join("session.json"),
            },
            Theme::dark(),
        )
    }

    #[test]
    fn view_cycle() {
        assert_eq!(View::Chart.next(), View::Targets);
        assert_eq!(View::Events.next(), View::Chart);
        assert_eq!(View::Chart.prev(), View::Events);
        assert_eq!(View::Targets.index(), 1);
    }

    #[test]
    fn toggle_starts_and_stops() {
        let runtime = Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&runtime, "80, 443", dir.path());

        app.toggle_session();
        assert!(app.is_monitoring());
        assert_eq!(app.snapshot.len(), 2);
        assert!(app.get_status_message().unwrap().contains("2 port(s)"));

        std::thread::sleep(Duration::from_millis(100));
        app.toggle_session();
        assert!(!app.is_monitoring());
        assert_eq!(app.snapshot.run_state, RunState::Stopped);
        assert!(app.snapshot.by_port(80).unwrap().up_samples() > 0);
        assert_eq!(app.snapshot.by_port(443).unwrap().up_samples(), 0);
    }

    #[test]
    fn rejected_ports_show_in_status() {
        let runtime = Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&runtime, "80, abc", dir.path());

        app.start_session();
        assert!(app.get_status_message().unwrap().contains("skipped: abc"));
        app.shutdown();
        assert!(!app.running);
        assert!(!app.is_monitoring());
    }

    #[test]
    fn exports_write_files() {
        let runtime = Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&runtime, "80", dir.path());

        app.start_session();
        std::thread::sleep(Duration::from_millis(60));
        app.stop_session();

        app.export_summary();
        app.export_json();

        let summary = std::fs::read_to_string(dir.path().join("port-summary.txt")).unwrap();
        assert!(summary.trim_end().ends_with("Port 80 on 127.0.0.1 went UP"));
        assert!(dir.path().join("session.json").exists());
    }

    #[test]
    fn selection_is_clamped() {
        let runtime = Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&runtime, "80, 443, 22", dir.path());
        app.start_session();

        app.set_view(View::Targets);
        app.select_next_n(10);
        assert_eq!(app.selected_target, 2);
        app.select_prev_n(10);
        assert_eq!(app.selected_target, 0);

        app.shutdown();
    }
}

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Windows reports releases too
    if key.kind == KeyEventKind::Release {
        return;
    }

    if app.editor.is_some() {
        handle_editor_key(app, key);
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit (raw mode swallows SIGINT, so Ctrl-C arrives as a key)
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::Char('1') => app.set_view(View::Chart),
        KeyCode::Char('2') => app.set_view(View::Targets),
        KeyCode::Char('3') => app.set_view(View::Events),

        // Selection / scrolling
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),

        // Session control
        KeyCode::Char(' ') => app.toggle_session(),
        KeyCode::Char('r') => app.restart_session(),
        KeyCode::Char('i') => app.begin_edit(),

        // Export
        KeyCode::Char('e') => app.export_summary(),
        KeyCode::Char('x') => app.export_json(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Keys while the host/ports editor is open.
fn handle_editor_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.apply_edit(),
        KeyCode::Tab | KeyCode::BackTab => {
            if let Some(editor) = app.editor.as_mut() {
                editor.switch_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(editor) = app.editor.as_mut() {
                editor.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(editor) = app.editor.as_mut() {
                editor.push(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ExportPaths;
    use crate::ui::Theme;
    use portwatch_core::{FnProbe, SessionController, Target};
    use std::sync::Arc;
    use tokio::runtime::Runtime;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app(runtime: &Runtime) -> App {
        let session = SessionController::builder()
            .prober(Arc::new(FnProbe::new(|_: &Target| true)))
            .build();
        App::new(
            session,
            runtime.handle().clone(),
            "127.0.0.1",
            "80",
            ExportPaths {
                summary: "port-summary.txt".into(),
                json: "portwatch-session.json".into(),
            },
            Theme::dark(),
        )
    }

    #[test]
    fn keys_switch_views() {
        let runtime = Runtime::new().unwrap();
        let mut app = app(&runtime);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_view, View::Events);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_view, View::Chart);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_view, View::Events);
    }

    #[test]
    fn help_swallows_next_key() {
        let runtime = Runtime::new().unwrap();
        let mut app = app(&runtime);

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn space_toggles_monitoring() {
        let runtime = Runtime::new().unwrap();
        let mut app = app(&runtime);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.is_monitoring());
        press(&mut app, KeyCode::Char('r'));
        assert!(app.is_monitoring());
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.is_monitoring());
    }

    #[test]
    fn ctrl_c_quits() {
        let runtime = Runtime::new().unwrap();
        let mut app = app(&runtime);

        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(!app.running);
    }

    #[test]
    fn edited_ports_apply_on_restart() {
        let runtime = Runtime::new().unwrap();
        let mut app = app(&runtime);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.snapshot.by_port(80).unwrap().rank, 1);

        press(&mut app, KeyCode::Char('i'));
        assert!(app.editor.is_some());
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        // Keys that normally act on the session are plain text here
        type_text(&mut app, "443, 80, q");
        assert!(app.running);
        press(&mut app, KeyCode::Enter);

        assert!(app.editor.is_none());
        assert_eq!(app.port_spec, "443, 80, q");
        assert!(app.is_monitoring());
        assert_eq!(app.snapshot.len(), 2);
        assert_eq!(app.snapshot.by_port(443).unwrap().rank, 1);
        assert_eq!(app.snapshot.by_port(80).unwrap().rank, 2);
        assert!(app.get_status_message().unwrap().contains("skipped: q"));

        app.shutdown();
    }

    #[test]
    fn editor_switches_to_host_and_cancels() {
        let runtime = Runtime::new().unwrap();
        let mut app = app(&runtime);

        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Tab);
        for _ in 0.."127.0.0.1".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "localhost");
        assert_eq!(app.editor.as_ref().unwrap().host, "localhost");

        press(&mut app, KeyCode::Esc);
        assert!(app.editor.is_none());
        assert_eq!(app.host, "127.0.0.1");
        assert!(!app.is_monitoring());

        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Tab);
        for _ in 0.."127.0.0.1".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "localhost");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.host, "localhost");
        assert_eq!(app.snapshot.host(), Some("localhost"));

        app.shutdown();
    }

    #[test]
    fn empty_host_keeps_editor_open() {
        let runtime = Runtime::new().unwrap();
        let mut app = app(&runtime);

        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Tab);
        for _ in 0.."127.0.0.1".len() {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Enter);

        assert!(app.editor.is_some());
        assert!(!app.is_monitoring());
        assert_eq!(app.host, "127.0.0.1");
    }
}

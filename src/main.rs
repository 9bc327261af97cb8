use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use portwatch::data::duration::parse_duration;
use portwatch::{events, headless, ui};
use portwatch::{App, ExportPaths, HeadlessOptions, Overrides, Settings, Theme, Timings, View};
use portwatch_core::SessionController;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PORTWATCH_LOG";

/// How often the UI pulls a fresh snapshot.
const REFRESH_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "portwatch")]
#[command(about = "Watch TCP port liveness on a host")]
#[command(version)]
struct Args {
    /// Host to probe
    #[arg(long)]
    host: Option<String>,

    /// Comma-separated ports, e.g. "22, 80, 443"
    #[arg(short, long)]
    ports: Option<String>,

    /// Time between probes (e.g. "1s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Connect timeout per probe
    #[arg(short, long)]
    timeout: Option<String>,

    /// How long stop waits for monitors before aborting them
    #[arg(long)]
    stop_timeout: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file used while the terminal UI is active
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print events to stdout instead of running the terminal UI
    #[arg(long)]
    headless: bool,

    /// Stop a headless run after this long (default: until Ctrl-C)
    #[arg(short, long, requires = "headless")]
    duration: Option<String>,

    /// Path for the event log export
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Path for the JSON snapshot export
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            ports: self.ports.clone(),
            interval: self.interval.clone(),
            connect_timeout: self.timeout.clone(),
            stop_timeout: self.stop_timeout.clone(),
            summary_path: self.summary.clone(),
            export_path: self.export.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    let timings = settings.timings()?;

    init_logging(&settings, args.headless)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let session = build_session(&timings);

    if args.headless {
        let duration = args
            .duration
            .as_deref()
            .map(parse_duration)
            .transpose()
            .context("invalid --duration")?;
        let options = HeadlessOptions {
            duration,
            summary: args.summary.clone(),
            export: args.export.clone(),
        };
        return runtime.block_on(async {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "failed to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            };
            let mut stdout = io::stdout();
            headless::run(
                session,
                &settings.host,
                &settings.ports,
                &options,
                &mut stdout,
                shutdown,
            )
            .await
            .map(|_| ())
        });
    }

    let exports = ExportPaths {
        summary: settings.summary_path.clone(),
        json: settings.export_path.clone(),
    };
    let app = App::new(
        session,
        runtime.handle().clone(),
        settings.host.clone(),
        settings.ports.clone(),
        exports,
        Theme::auto_detect(),
    );
    run_tui(app)
}

fn build_session(timings: &Timings) -> SessionController {
    SessionController::builder()
        .interval(timings.interval)
        .connect_timeout(timings.connect_timeout)
        .stop_timeout(timings.stop_timeout)
        .build()
}

/// Log to stderr in headless mode, to the log file under the terminal UI.
fn init_logging(settings: &Settings, headless: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if headless {
        builder.with_writer(io::stderr).init();
    } else {
        let file = File::create(&settings.log_file)
            .with_context(|| format!("failed to open log file {}", settings.log_file.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

/// Run the TUI around an app whose session has not started yet
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    app.start_session();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Monitors must be joined before the runtime goes away
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Chart => ui::chart::render(frame, app, chunks[2]),
                View::Targets => ui::targets::render(frame, app, chunks[2]),
                View::Events => ui::event_log::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }

            if app.editor.is_some() {
                ui::common::render_editor(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            if let Event::Key(key) = event {
                events::handle_key_event(app, key);
            }
        }

        if last_refresh.elapsed() >= REFRESH_INTERVAL {
            app.refresh();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

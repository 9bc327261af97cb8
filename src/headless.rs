//! Headless mode: monitor without the terminal UI.
//!
//! Event lines are printed as they are observed. When the duration elapses
//! (or the shutdown future resolves) the session is stopped, a per-target
//! summary is printed and the requested exports are written.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use portwatch_core::output::{event_log_text, format_event, summary_text};
use portwatch_core::{Aggregator, Output, SessionController, SessionSnapshot, TargetSeries};

/// How often new events are polled from the aggregator.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// What to do around a headless run.
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// Stop after this long; `None` runs until shutdown.
    pub duration: Option<Duration>,
    /// Write the event log here after stopping.
    pub summary: Option<PathBuf>,
    /// Write the JSON snapshot here after stopping.
    pub export: Option<PathBuf>,
}

/// Run a session until the duration elapses or `shutdown` resolves.
pub async fn run<W, F>(
    mut session: SessionController,
    host: &str,
    ports: &str,
    options: &HeadlessOptions,
    out: &mut W,
    shutdown: F,
) -> Result<SessionSnapshot>
where
    W: Write,
    F: Future<Output = ()>,
{
    let report = session.start(host, ports)?;
    for rejected in &report.rejected {
        writeln!(out, "Skipping {}", rejected)?;
    }
    if report.targets.is_empty() {
        bail!("no valid ports to monitor in {:?}", ports);
    }
    writeln!(
        out,
        "Monitoring {} port(s) on {} (Ctrl-C to stop)",
        report.targets.len(),
        host.trim()
    )?;

    let aggregator = session.aggregator();
    let mut printed = 0;

    let deadline = async {
        match options.duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            biased;

            _ = &mut deadline => break,
            _ = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                printed = print_new_events(&aggregator, printed, out)?;
            }
        }
    }

    session.stop().await;
    print_new_events(&aggregator, printed, out)?;

    let snapshot = session.snapshot();
    writeln!(out)?;
    write!(out, "{}", summary_text(&snapshot))?;
    writeln!(out)?;
    write_summary(&snapshot, out)?;

    let mut failed = 0;
    for output in exports(options) {
        match output.emit(&snapshot) {
            Ok(()) => writeln!(out, "Wrote {}", output.path().display())?,
            Err(e) => {
                tracing::error!(path = %output.path().display(), error = %e, "export failed");
                writeln!(out, "Export failed: {}", e)?;
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} export(s) failed", failed);
    }

    Ok(snapshot)
}

fn exports(options: &HeadlessOptions) -> Vec<Output> {
    let mut outputs = Vec::new();
    if let Some(path) = &options.summary {
        outputs.push(Output::summary(path.clone()));
    }
    if let Some(path) = &options.export {
        outputs.push(Output::json(path.clone()));
    }
    outputs
}

/// Print events past `printed`; returns the new count.
fn print_new_events<W: Write>(aggregator: &Aggregator, printed: usize, out: &mut W) -> Result<usize> {
    let events = aggregator.snapshot_events();
    for event in events.iter().skip(printed) {
        writeln!(out, "{}", format_event(event))?;
    }
    out.flush()?;
    Ok(events.len())
}

/// Print the end-of-session table.
pub fn write_summary<W: Write>(snapshot: &SessionSnapshot, out: &mut W) -> Result<()> {
    writeln!(out, "Session summary for {}:", snapshot.host().unwrap_or("-"))?;
    for series in snapshot.iter() {
        let transitions = snapshot.events_for(&series.target).count();
        writeln!(out, "  {}", target_line(series, transitions))?;
    }
    Ok(())
}

fn target_line(series: &TargetSeries, transitions: usize) -> String {
    let state = series.current_state().map(|s| s.label()).unwrap_or("-");
    let uptime = series
        .uptime_ratio()
        .map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "port {:>5}  {:<4}  {}/{} samples up ({})  {} transition(s)",
        series.target.port,
        state,
        series.up_samples(),
        series.len(),
        uptime,
        transitions
    )
}

//! The session controller: starts and stops a set of monitors for one host.

use std::sync::Arc;
use std::time::Duration;

use portwatch_types::{RunState, SessionSnapshot, Target};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::aggregator::Aggregator;
use crate::error::{PortSpecError, SessionError};
use crate::monitor::{MonitorHandle, TargetMonitor, DEFAULT_CONNECT_TIMEOUT, DEFAULT_INTERVAL};
use crate::ports::PortSpec;
use crate::prober::{Probe, TcpProber};

/// How long `stop` waits for monitors to wind down before aborting them.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(3);

/// Owns the lifecycle of a monitoring session.
///
/// A controller is either stopped (no live monitors) or running (one monitor
/// per requested target). Observations accumulate in a shared
/// [`Aggregator`], which is cleared on every start.
///
/// # Example
///
/// ```rust,no_run
/// use portwatch_core::SessionController;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let mut session = SessionController::builder()
///         .interval(Duration::from_secs(1))
///         .connect_timeout(Duration::from_millis(500))
///         .build();
///
///     let report = session.start("127.0.0.1", "22, 80, 443").unwrap();
///     println!("monitoring {} ports", report.targets.len());
///
///     tokio::time::sleep(Duration::from_secs(10)).await;
///     session.stop().await;
///
///     let snapshot = session.snapshot();
///     println!("{} transitions", snapshot.events.len());
/// }
/// ```
#[derive(Debug)]
pub struct SessionController {
    aggregator: Arc<Aggregator>,
    prober: Arc<dyn Probe>,
    interval: Duration,
    connect_timeout: Duration,
    stop_timeout: Duration,
    active: Option<ActiveSession>,
}

/// Monitors spawned by one `start`.
#[derive(Debug)]
struct ActiveSession {
    host: String,
    stop_tx: watch::Sender<bool>,
    monitors: Vec<MonitorHandle>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        // No-op for monitors that already finished
        self.stop_tx.send_replace(true);
        for monitor in &self.monitors {
            monitor.abort();
        }
    }
}

/// What a successful `start` launched.
#[derive(Debug, Clone, Default)]
pub struct StartReport {
    /// Targets with their ranks, in rank order.
    pub targets: Vec<(Target, u16)>,
    /// Port-spec entries that were skipped.
    pub rejected: Vec<PortSpecError>,
}

/// How the monitors of a session ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopReport {
    /// Monitors that exited on their own after the stop signal.
    pub stopped: usize,
    /// Monitors that had to be aborted after the stop timeout.
    pub aborted: usize,
}

impl StopReport {
    pub fn total(&self) -> usize {
        self.stopped + self.aborted
    }
}

impl SessionController {
    /// Create a controller with default timings and a TCP prober.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SessionControllerBuilder {
        SessionControllerBuilder::new()
    }

    /// Start monitoring every port in `port_spec` on `host`.
    ///
    /// Clears the aggregator, then spawns one monitor per accepted port on
    /// the current tokio runtime. Rejected entries are logged and returned
    /// in the report. A spec with no valid ports starts nothing and leaves
    /// the controller stopped.
    pub fn start(&mut self, host: &str, port_spec: &str) -> Result<StartReport, SessionError> {
        if let Some(active) = &self.active {
            return Err(SessionError::AlreadyRunning {
                host: active.host.clone(),
            });
        }
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;

        let host = host.trim();
        let spec = PortSpec::parse(port_spec);
        for rejected in &spec.rejected {
            tracing::warn!(error = %rejected, "skipping port entry");
        }

        let targets = spec.targets(host);
        self.aggregator.reset(targets.iter().cloned());

        if targets.is_empty() {
            tracing::warn!(host, "no valid ports to monitor");
            return Ok(StartReport {
                targets,
                rejected: spec.rejected,
            });
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let monitors = targets
            .iter()
            .map(|(target, rank)| {
                TargetMonitor::new(
                    target.clone(),
                    *rank,
                    self.prober.clone(),
                    self.aggregator.clone(),
                )
                .interval(self.interval)
                .timeout(self.connect_timeout)
                .spawn_on(&runtime, stop_rx.clone())
            })
            .collect();

        self.active = Some(ActiveSession {
            host: host.to_string(),
            stop_tx,
            monitors,
        });
        self.aggregator.set_run_state(RunState::Running);

        tracing::info!(
            host,
            ports = targets.len(),
            interval = ?self.interval,
            "monitoring session started"
        );

        Ok(StartReport {
            targets,
            rejected: spec.rejected,
        })
    }

    /// Signal every monitor to stop and wait for them.
    ///
    /// Monitors that have not exited within the stop timeout are aborted.
    /// Once this returns, no monitor of the session records anything. Calling
    /// it while stopped does nothing.
    pub async fn stop(&mut self) -> StopReport {
        let Some(mut session) = self.active.take() else {
            return StopReport::default();
        };

        session.stop_tx.send_replace(true);

        let deadline = tokio::time::Instant::now() + self.stop_timeout;
        let mut report = StopReport::default();
        for monitor in &mut session.monitors {
            let joined = tokio::time::timeout_at(deadline, monitor.join()).await;
            match joined {
                Ok(_) => report.stopped += 1,
                Err(_) => {
                    tracing::warn!(
                        target_addr = %monitor.target(),
                        "monitor did not stop in time, aborting"
                    );
                    monitor.abort();
                    // Resolves once an in-progress poll has finished
                    monitor.join().await;
                    report.aborted += 1;
                }
            }
        }

        self.aggregator.set_run_state(RunState::Stopped);
        tracing::info!(
            host = %session.host,
            stopped = report.stopped,
            aborted = report.aborted,
            "monitoring session stopped"
        );

        report
    }

    /// Stop the current session (if any) and start a new one.
    pub async fn restart(
        &mut self,
        host: &str,
        port_spec: &str,
    ) -> Result<StartReport, SessionError> {
        self.stop().await;
        self.start(host, port_spec)
    }

    pub fn run_state(&self) -> RunState {
        if self.active.is_some() {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Host of the running session.
    pub fn host(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.host.as_str())
    }

    /// Handles of the running monitors, in rank order.
    pub fn monitors(&self) -> &[MonitorHandle] {
        self.active
            .as_ref()
            .map(|s| s.monitors.as_slice())
            .unwrap_or(&[])
    }

    /// The shared aggregator. Stays valid across restarts.
    pub fn aggregator(&self) -> Arc<Aggregator> {
        self.aggregator.clone()
    }

    /// Collect the current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.aggregator.collect()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring a [`SessionController`].
#[derive(Debug, Default)]
pub struct SessionControllerBuilder {
    prober: Option<Arc<dyn Probe>>,
    aggregator: Option<Arc<Aggregator>>,
    interval: Option<Duration>,
    connect_timeout: Option<Duration>,
    stop_timeout: Option<Duration>,
}

impl SessionControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time between probes of one target. Default is 1 second.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Per-probe connect timeout. Default is 1 second.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// How long `stop` waits before aborting monitors. Default is 3 seconds.
    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = Some(timeout);
        self
    }

    /// Replace the TCP prober.
    pub fn prober(mut self, prober: Arc<dyn Probe>) -> Self {
        self.prober = Some(prober);
        self
    }

    /// Share an existing aggregator instead of creating one.
    pub fn aggregator(mut self, aggregator: Arc<Aggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    pub fn build(self) -> SessionController {
        SessionController {
            aggregator: self.aggregator.unwrap_or_default(),
            prober: self.prober.unwrap_or_else(|| Arc::new(TcpProber)),
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            stop_timeout: self.stop_timeout.unwrap_or(DEFAULT_STOP_TIMEOUT),
            active: None,
        }
    }
}

//! Per-target monitors.
//!
//! A monitor probes one target on a fixed cadence, records a [`Sample`] for
//! every probe and a [`TransitionEvent`] whenever reachability changes. It
//! runs until the session's stop signal is raised.

use std::sync::Arc;
use std::time::Duration;

use portwatch_types::{current_timestamp_ms, PortState, Sample, Target, TransitionEvent};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::aggregator::Aggregator;
use crate::prober::Probe;

/// Time between the start of consecutive probes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// How long a single connection attempt may take.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Lifecycle of a monitor. A stopped monitor is never restarted; the
/// controller spawns a fresh one instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

/// Edge detector over successive probe results.
///
/// Starts from an assumed down state, so a target that is up on the first
/// probe produces an `Up` transition and one that never comes up produces
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionTracker {
    was_up: bool,
}

impl TransitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one probe result; returns the new state if it changed.
    pub fn observe(&mut self, is_up: bool) -> Option<PortState> {
        if is_up == self.was_up {
            return None;
        }
        self.was_up = is_up;
        Some(PortState::from_reachable(is_up))
    }

    pub fn was_up(&self) -> bool {
        self.was_up
    }
}

/// Probes one target until stopped.
#[derive(Debug)]
pub struct TargetMonitor {
    target: Target,
    rank: u16,
    prober: Arc<dyn Probe>,
    aggregator: Arc<Aggregator>,
    interval: Duration,
    timeout: Duration,
    state: watch::Sender<MonitorState>,
}

impl TargetMonitor {
    pub fn new(
        target: Target,
        rank: u16,
        prober: Arc<dyn Probe>,
        aggregator: Arc<Aggregator>,
    ) -> Self {
        let (state, _) = watch::channel(MonitorState::Idle);
        Self {
            target,
            rank,
            prober,
            aggregator,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_CONNECT_TIMEOUT,
            state,
        }
    }

    /// Set the probe cadence.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the per-probe connect timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawn the monitor on `runtime`.
    pub fn spawn_on(self, runtime: &Handle, stop: watch::Receiver<bool>) -> MonitorHandle {
        let target = self.target.clone();
        let rank = self.rank;
        let state = self.state.subscribe();
        let task = runtime.spawn(self.run(stop));

        MonitorHandle {
            target,
            rank,
            state,
            task,
        }
    }

    /// Run the probe loop until `stop` becomes `true` or its sender is
    /// dropped.
    ///
    /// The first probe starts immediately. A probe in flight when the stop
    /// signal arrives is abandoned and its result discarded, so nothing is
    /// recorded once the signal has been observed.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        self.state.send_replace(MonitorState::Running);
        tracing::debug!(
            host = %self.target.host,
            port = self.target.port,
            rank = self.rank,
            "monitor started"
        );

        let mut tracker = TransitionTracker::new();
        // A zero period would make the interval panic
        let mut ticker = tokio::time::interval(self.interval.max(MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stopped(&mut stop) => break,
                _ = ticker.tick() => {}
            }

            let is_up = tokio::select! {
                biased;
                _ = stopped(&mut stop) => break,
                is_up = self.prober.probe(&self.target, self.timeout) => is_up,
            };

            self.record(&mut tracker, is_up);
        }

        self.state.send_replace(MonitorState::Stopped);
        tracing::debug!(
            host = %self.target.host,
            port = self.target.port,
            "monitor stopped"
        );
    }

    fn record(&self, tracker: &mut TransitionTracker, is_up: bool) {
        let now = current_timestamp_ms();
        self.aggregator.record_sample(Sample::observed(
            self.target.clone(),
            now,
            self.rank,
            is_up,
        ));

        if let Some(state) = tracker.observe(is_up) {
            tracing::debug!(
                host = %self.target.host,
                port = self.target.port,
                %state,
                "port state changed"
            );
            self.aggregator
                .record_event(TransitionEvent::new(now, self.target.clone(), state));
        }
    }
}

/// Resolves once the stop flag is raised. A dropped sender counts as stop.
async fn stopped(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|flag| *flag).await;
}

/// Handle to a spawned monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    target: Target,
    rank: u16,
    state: watch::Receiver<MonitorState>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn rank(&self) -> u16 {
        self.rank
    }

    /// Current lifecycle state. An aborted or panicked task reads as
    /// stopped.
    pub fn state(&self) -> MonitorState {
        let state = *self.state.borrow();
        if state != MonitorState::Stopped && self.task.is_finished() {
            MonitorState::Stopped
        } else {
            state
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the monitor task to finish.
    ///
    /// Returns `false` if the task panicked or was aborted. Must not be
    /// called again after it has returned.
    pub async fn join(&mut self) -> bool {
        (&mut self.task).await.is_ok()
    }

    /// Cancel the task at its next await point.
    pub fn abort(&self) {
        self.task.abort();
    }
}

//! Snapshot - a point-in-time view of a monitoring session.

use alloc::vec::Vec;

use crate::{PortState, Sample, SchemaVersion, Target, TransitionEvent};

/// Whether a session currently has live monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub enum RunState {
    #[default]
    #[cfg_attr(feature = "minicbor", n(0))]
    Stopped,
    #[cfg_attr(feature = "minicbor", n(1))]
    Running,
}

impl RunState {
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }

    pub fn label(self) -> &'static str {
        match self {
            RunState::Stopped => "STOPPED",
            RunState::Running => "RUNNING",
        }
    }
}

/// The ordered samples recorded for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct TargetSeries {
    #[cfg_attr(feature = "minicbor", n(0))]
    pub target: Target,

    /// 1-based position of the target in the requested port list.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub rank: u16,

    /// Samples in the order the target's monitor emitted them.
    #[cfg_attr(feature = "minicbor", n(2))]
    pub samples: Vec<Sample>,
}

impl TargetSeries {
    /// Create an empty series.
    pub fn new(target: Target, rank: u16) -> Self {
        Self {
            target,
            rank,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recent sample, if any.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// State according to the most recent sample.
    pub fn current_state(&self) -> Option<PortState> {
        self.latest().map(Sample::state)
    }

    /// Number of samples where the target was reachable.
    pub fn up_samples(&self) -> usize {
        self.samples.iter().filter(|s| s.is_up()).count()
    }

    /// Fraction of samples where the target was reachable.
    ///
    /// Returns `None` for an empty series.
    pub fn uptime_ratio(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.up_samples() as f64 / self.samples.len() as f64)
    }
}

/// A point-in-time snapshot of a monitoring session.
///
/// Series are ordered by rank. Events are in the order they reached the
/// session's event log, which interleaves targets.
///
/// # Example
///
/// ```rust
/// use portwatch_types::{RunState, SessionSnapshot, Target};
///
/// let snapshot = SessionSnapshot::builder()
///     .run_state(RunState::Running)
///     .target(Target::new("db.internal", 5432), 1, |s| s.up(1_000))
///     .build();
///
/// assert!(snapshot.run_state.is_running());
/// assert_eq!(snapshot.up_count(), 1);
///
/// // Serialize with serde (requires "serde" feature)
/// // let json = serde_json::to_string(&snapshot)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct SessionSnapshot {
    /// Schema version for forward compatibility.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds when this snapshot was taken.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub timestamp_ms: u64,

    #[cfg_attr(feature = "minicbor", n(2))]
    pub run_state: RunState,

    /// Per-target series, ordered by rank.
    #[cfg_attr(feature = "minicbor", n(3))]
    pub series: Vec<TargetSeries>,

    /// Session-wide transition log in arrival order.
    #[cfg_attr(feature = "minicbor", n(4))]
    pub events: Vec<TransitionEvent>,
}

impl SessionSnapshot {
    /// Create a new empty snapshot with the current timestamp.
    #[cfg(feature = "std")]
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_ms())
    }

    /// Create a new empty snapshot with a specific timestamp.
    pub fn with_timestamp(timestamp_ms: u64) -> Self {
        Self {
            version: SchemaVersion::current(),
            timestamp_ms,
            run_state: RunState::Stopped,
            series: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Check if the snapshot has no targets.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of targets in the snapshot.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// The host being monitored, taken from the first target.
    pub fn host(&self) -> Option<&str> {
        self.series.first().map(|s| s.target.host.as_str())
    }

    /// Get the series for a specific target.
    pub fn get(&self, target: &Target) -> Option<&TargetSeries> {
        self.series.iter().find(|s| &s.target == target)
    }

    /// Get the first series monitoring `port`.
    pub fn by_port(&self, port: u16) -> Option<&TargetSeries> {
        self.series.iter().find(|s| s.target.port == port)
    }

    /// Iterate over all series in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &TargetSeries> {
        self.series.iter()
    }

    /// Events that concern one target, in log order.
    pub fn events_for<'a>(&'a self, target: &'a Target) -> impl Iterator<Item = &'a TransitionEvent> {
        self.events.iter().filter(move |e| &e.target == target)
    }

    /// The most recent transition of a target.
    pub fn last_change<'a>(&'a self, target: &Target) -> Option<&'a TransitionEvent> {
        self.events.iter().rev().find(|e| &e.target == target)
    }

    /// Total samples across all targets.
    pub fn total_samples(&self) -> usize {
        self.series.iter().map(TargetSeries::len).sum()
    }

    /// Targets whose latest sample is up.
    pub fn up_count(&self) -> usize {
        self.series
            .iter()
            .filter(|s| s.current_state() == Some(PortState::Up))
            .count()
    }

    /// Targets whose latest sample is down.
    pub fn down_count(&self) -> usize {
        self.series
            .iter()
            .filter(|s| s.current_state() == Some(PortState::Down))
            .count()
    }

    /// Timestamp of the earliest sample in the session.
    pub fn started_at_ms(&self) -> Option<u64> {
        self.series
            .iter()
            .filter_map(|s| s.samples.first())
            .map(|s| s.timestamp_ms)
            .min()
    }
}

#[cfg(feature = "std")]
impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing `SessionSnapshot` instances.
#[derive(Debug)]
pub struct SnapshotBuilder {
    timestamp_ms: Option<u64>,
    run_state: RunState,
    series: Vec<TargetSeries>,
    events: Vec<TransitionEvent>,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            timestamp_ms: None,
            run_state: RunState::Stopped,
            series: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    pub fn run_state(mut self, state: RunState) -> Self {
        self.run_state = state;
        self
    }

    /// Add a target whose samples are built using a closure.
    ///
    /// Transition events are derived from the samples the same way a live
    /// monitor derives them: starting from an assumed down state.
    pub fn target<F>(mut self, target: Target, rank: u16, f: F) -> Self
    where
        F: FnOnce(SeriesBuilder) -> SeriesBuilder,
    {
        let built = f(SeriesBuilder::new(target.clone(), rank));
        let mut was_up = false;
        for sample in &built.series.samples {
            if sample.is_up() != was_up {
                was_up = sample.is_up();
                self.events.push(TransitionEvent::new(
                    sample.timestamp_ms,
                    target.clone(),
                    sample.state(),
                ));
            }
        }
        self.series.push(built.series);
        self
    }

    /// Add a pre-built series.
    pub fn series(mut self, series: TargetSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Append an event to the log.
    pub fn event(mut self, event: TransitionEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Build the snapshot.
    #[cfg(feature = "std")]
    pub fn build(self) -> SessionSnapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or_else(current_timestamp_ms);
        self.finish(timestamp_ms)
    }

    /// Build the snapshot with a specific timestamp (for no_std).
    #[cfg(not(feature = "std"))]
    pub fn build(self) -> SessionSnapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or(0);
        self.finish(timestamp_ms)
    }

    fn finish(mut self, timestamp_ms: u64) -> SessionSnapshot {
        self.series.sort_by_key(|s| s.rank);
        SessionSnapshot {
            version: SchemaVersion::current(),
            timestamp_ms,
            run_state: self.run_state,
            series: self.series,
            events: self.events,
        }
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the samples of one target.
#[derive(Debug)]
pub struct SeriesBuilder {
    series: TargetSeries,
}

impl SeriesBuilder {
    fn new(target: Target, rank: u16) -> Self {
        Self {
            series: TargetSeries::new(target, rank),
        }
    }

    /// Record a reachable observation.
    pub fn up(self, timestamp_ms: u64) -> Self {
        self.observe(timestamp_ms, true)
    }

    /// Record an unreachable observation.
    pub fn down(self, timestamp_ms: u64) -> Self {
        self.observe(timestamp_ms, false)
    }

    fn observe(mut self, timestamp_ms: u64, is_up: bool) -> Self {
        let sample = Sample::observed(
            self.series.target.clone(),
            timestamp_ms,
            self.series.rank,
            is_up,
        );
        self.series.samples.push(sample);
        self
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localhost(port: u16) -> Target {
        Target::new("127.0.0.1", port)
    }

    #[test]
    fn test_snapshot_builder() {
        let snapshot = SessionSnapshot::builder()
            .timestamp_ms(1703160000000)
            .target(localhost(443), 2, |s| s.down(1).down(2))
            .target(localhost(80), 1, |s| s.up(1).down(2).up(3))
            .build();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.timestamp_ms, 1703160000000);
        assert_eq!(snapshot.total_samples(), 5);
        // sorted by rank regardless of insertion order
        assert_eq!(snapshot.series[0].target.port, 80);
        assert_eq!(snapshot.series[1].target.port, 443);
    }

    #[test]
    fn builder_derives_events_from_assumed_down_start() {
        let snapshot = SessionSnapshot::builder()
            .target(localhost(80), 1, |s| s.up(1).down(2).up(3))
            .target(localhost(9999), 2, |s| s.down(1).down(2).down(3))
            .build();

        let states: Vec<PortState> = snapshot.events.iter().map(|e| e.state).collect();
        assert_eq!(states, vec![PortState::Up, PortState::Down, PortState::Up]);
        assert!(snapshot.events.iter().all(|e| e.target.port == 80));
        assert_eq!(snapshot.events_for(&localhost(9999)).count(), 0);
    }

    #[test]
    fn uptime_and_counts() {
        let snapshot = SessionSnapshot::builder()
            .target(localhost(80), 1, |s| s.up(1).up(2).down(3).up(4))
            .target(localhost(81), 2, |s| s.up(1).down(2))
            .target(localhost(82), 3, |s| s)
            .build();

        let http = snapshot.by_port(80).unwrap();
        assert_eq!(http.up_samples(), 3);
        assert_eq!(http.uptime_ratio(), Some(0.75));
        assert_eq!(snapshot.by_port(82).unwrap().uptime_ratio(), None);

        assert_eq!(snapshot.up_count(), 1);
        assert_eq!(snapshot.down_count(), 1);
        assert_eq!(snapshot.started_at_ms(), Some(1));
        assert_eq!(snapshot.host(), Some("127.0.0.1"));
        assert_eq!(snapshot.last_change(&localhost(80)).unwrap().timestamp_ms, 4);
    }

    #[test]
    fn last_change_outlives_the_lookup_key() {
        let snapshot = SessionSnapshot::builder()
            .target(localhost(80), 1, |s| s.up(1).down(2).up(3))
            .target(localhost(81), 2, |s| s.down(1))
            .build();

        let latest = {
            let key = localhost(80);
            snapshot.last_change(&key)
        };
        assert_eq!(latest.map(|e| e.state), Some(PortState::Up));
        assert_eq!(latest.map(|e| e.timestamp_ms), Some(3));

        let key = localhost(81);
        assert!(snapshot.last_change(&key).is_none());
    }

    #[test]
    fn test_snapshot_version() {
        let snapshot = SessionSnapshot::builder().build();
        assert!(snapshot.version.is_compatible());
        assert_eq!(snapshot.run_state, RunState::Stopped);
        assert!(snapshot.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let snapshot = SessionSnapshot::builder()
            .timestamp_ms(1703160000000)
            .run_state(RunState::Running)
            .target(localhost(22), 1, |s| s.up(10).down(20))
            .build();

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot, parsed);
        assert!(json.contains("\"run_state\":\"running\""));
    }

    #[cfg(feature = "minicbor")]
    #[test]
    fn test_minicbor_roundtrip() {
        let snapshot = SessionSnapshot::builder()
            .timestamp_ms(1703160000000)
            .target(localhost(22), 1, |s| s.up(10).down(20))
            .build();

        let bytes = minicbor::to_vec(&snapshot).unwrap();
        let parsed: SessionSnapshot = minicbor::decode(&bytes).unwrap();

        assert_eq!(snapshot, parsed);
    }
}

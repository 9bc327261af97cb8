//! Shared session state: per-target sample series and the transition log.
//!
//! Monitors write into the aggregator concurrently while the UI, the
//! exporters and the controller read snapshots from it. Each target's series
//! sits behind its own lock so monitors never contend with each other; the
//! map of series is only write-locked when a session is reset.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use portwatch_types::{
    current_timestamp_ms, RunState, Sample, SessionSnapshot, Target, TargetSeries,
    TransitionEvent,
};

/// Samples recorded for one target.
#[derive(Debug)]
struct SeriesState {
    rank: u16,
    samples: Mutex<Vec<Sample>>,
}

impl SeriesState {
    fn new(rank: u16) -> Self {
        Self {
            rank,
            samples: Mutex::new(Vec::new()),
        }
    }
}

/// Thread-safe store for everything a monitoring session observes.
#[derive(Debug, Default)]
pub struct Aggregator {
    series: RwLock<BTreeMap<Target, Arc<SeriesState>>>,
    events: Mutex<Vec<TransitionEvent>>,
    running: AtomicBool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all series and events and register a fresh set of targets.
    ///
    /// Called by the controller before a new session's monitors are spawned.
    pub fn reset<I>(&self, targets: I)
    where
        I: IntoIterator<Item = (Target, u16)>,
    {
        let fresh: BTreeMap<_, _> = targets
            .into_iter()
            .map(|(target, rank)| (target, Arc::new(SeriesState::new(rank))))
            .collect();

        *self.series.write() = fresh;
        self.events.lock().clear();
    }

    /// Register a target or get the existing series for it.
    fn get_or_register(&self, target: &Target, rank: u16) -> Arc<SeriesState> {
        // Fast path: check if it exists
        {
            let series = self.series.read();
            if let Some(state) = series.get(target) {
                return state.clone();
            }
        }

        // Slow path: another writer may have registered it in between
        let mut series = self.series.write();
        series
            .entry(target.clone())
            .or_insert_with(|| Arc::new(SeriesState::new(rank)))
            .clone()
    }

    /// Append a sample to its target's series.
    ///
    /// A sample for an unregistered target registers it, taking the rank from
    /// the sample's level (0 if the sample is down).
    pub fn record_sample(&self, sample: Sample) {
        let state = self.get_or_register(&sample.target, sample.level);
        state.samples.lock().push(sample);
    }

    /// Append an event to the session log.
    pub fn record_event(&self, event: TransitionEvent) {
        self.events.lock().push(event);
    }

    /// Copy of one target's samples in emission order.
    ///
    /// Unknown targets yield an empty series.
    pub fn snapshot_series(&self, target: &Target) -> Vec<Sample> {
        let state = self.series.read().get(target).cloned();
        state
            .map(|s| s.samples.lock().clone())
            .unwrap_or_default()
    }

    /// Copy of the transition log in arrival order.
    pub fn snapshot_events(&self) -> Vec<TransitionEvent> {
        self.events.lock().clone()
    }

    /// Registered targets with their ranks, in rank order.
    pub fn targets(&self) -> Vec<(Target, u16)> {
        let mut targets: Vec<_> = self
            .series
            .read()
            .iter()
            .map(|(target, state)| (target.clone(), state.rank))
            .collect();
        targets.sort_by_key(|(_, rank)| *rank);
        targets
    }

    /// Number of samples recorded for `target`.
    pub fn sample_count(&self, target: &Target) -> usize {
        self.series
            .read()
            .get(target)
            .map(|s| s.samples.lock().len())
            .unwrap_or(0)
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn set_run_state(&self, state: RunState) {
        self.running.store(state.is_running(), Ordering::Release);
    }

    pub fn run_state(&self) -> RunState {
        if self.running.load(Ordering::Acquire) {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }

    /// Collect everything into a snapshot.
    ///
    /// Each series is a consistent prefix of what its monitor emitted; series
    /// are copied one after another, so a running session may show targets at
    /// slightly different points in time.
    pub fn collect(&self) -> SessionSnapshot {
        let mut series: Vec<TargetSeries> = self
            .series
            .read()
            .iter()
            .map(|(target, state)| TargetSeries {
                target: target.clone(),
                rank: state.rank,
                samples: state.samples.lock().clone(),
            })
            .collect();
        series.sort_by_key(|s| s.rank);

        let mut snapshot = SessionSnapshot::with_timestamp(current_timestamp_ms());
        snapshot.run_state = self.run_state();
        snapshot.series = series;
        snapshot.events = self.snapshot_events();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwatch_types::PortState;
    use std::thread;

    fn localhost(port: u16) -> Target {
        Target::new("127.0.0.1", port)
    }

    #[test]
    fn samples_keep_emission_order() {
        let agg = Aggregator::new();
        agg.reset([(localhost(80), 1)]);

        for ts in [10, 20, 30] {
            agg.record_sample(Sample::observed(localhost(80), ts, 1, ts != 20));
        }

        let samples = agg.snapshot_series(&localhost(80));
        let levels: Vec<u16> = samples.iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![1, 0, 1]);
        assert_eq!(samples[2].timestamp_ms, 30);
    }

    #[test]
    fn unknown_target_has_empty_series() {
        let agg = Aggregator::new();
        assert!(agg.snapshot_series(&localhost(1)).is_empty());
        assert_eq!(agg.sample_count(&localhost(1)), 0);
    }

    #[test]
    fn unregistered_sample_registers_target() {
        let agg = Aggregator::new();
        agg.record_sample(Sample::observed(localhost(8080), 1, 3, true));

        assert_eq!(agg.targets(), vec![(localhost(8080), 3)]);
        assert_eq!(agg.sample_count(&localhost(8080)), 1);
    }

    #[test]
    fn reset_clears_previous_session() {
        let agg = Aggregator::new();
        agg.reset([(localhost(80), 1)]);
        agg.record_sample(Sample::observed(localhost(80), 1, 1, true));
        agg.record_event(TransitionEvent::new(1, localhost(80), PortState::Up));

        agg.reset([(localhost(22), 1), (localhost(443), 2)]);

        assert!(agg.snapshot_events().is_empty());
        assert!(agg.snapshot_series(&localhost(80)).is_empty());
        assert_eq!(
            agg.targets(),
            vec![(localhost(22), 1), (localhost(443), 2)]
        );
    }

    #[test]
    fn collect_orders_series_by_rank() {
        let agg = Aggregator::new();
        // BTreeMap order would put "a" first; rank must win
        agg.reset([
            (Target::new("a", 443), 2),
            (Target::new("a", 8080), 1),
        ]);
        agg.set_run_state(RunState::Running);

        let snapshot = agg.collect();
        assert_eq!(snapshot.run_state, RunState::Running);
        assert_eq!(snapshot.series[0].target.port, 8080);
        assert_eq!(snapshot.series[1].target.port, 443);
    }

    #[test]
    fn run_state_defaults_to_stopped() {
        let agg = Aggregator::new();
        assert_eq!(agg.run_state(), RunState::Stopped);
        agg.set_run_state(RunState::Running);
        agg.set_run_state(RunState::Stopped);
        assert_eq!(agg.collect().run_state, RunState::Stopped);
    }

    #[test]
    fn concurrent_writers_lose_nothing() {
        const WRITERS: u16 = 8;
        const SAMPLES: u64 = 500;

        let agg = Arc::new(Aggregator::new());
        agg.reset((1..=WRITERS).map(|rank| (localhost(9000 + rank), rank)));

        let handles: Vec<_> = (1..=WRITERS)
            .map(|rank| {
                let agg = agg.clone();
                thread::spawn(move || {
                    let target = localhost(9000 + rank);
                    for seq in 0..SAMPLES {
                        agg.record_sample(Sample::observed(target.clone(), seq, rank, seq % 2 == 0));
                        if seq % 50 == 0 {
                            agg.record_event(TransitionEvent::new(seq, target.clone(), PortState::Up));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = agg.collect();
        assert_eq!(snapshot.total_samples(), (WRITERS as usize) * SAMPLES as usize);
        for series in snapshot.iter() {
            assert_eq!(series.len(), SAMPLES as usize);
            let in_order = series
                .samples
                .windows(2)
                .all(|w| w[0].timestamp_ms < w[1].timestamp_ms);
            assert!(in_order, "series {} reordered", series.target);
        }
        assert_eq!(snapshot.events.len(), WRITERS as usize * 10);
    }

    #[test]
    fn readers_see_growing_prefixes() {
        let agg = Arc::new(Aggregator::new());
        agg.reset([(localhost(80), 1)]);

        let writer = {
            let agg = agg.clone();
            thread::spawn(move || {
                for seq in 0..2_000 {
                    agg.record_sample(Sample::observed(localhost(80), seq, 1, true));
                }
            })
        };

        let mut last_len = 0;
        while !writer.is_finished() {
            let samples = agg.snapshot_series(&localhost(80));
            assert!(samples.len() >= last_len);
            assert!(samples
                .iter()
                .enumerate()
                .all(|(i, s)| s.timestamp_ms == i as u64));
            last_len = samples.len();
        }
        writer.join().unwrap();
        assert_eq!(agg.sample_count(&localhost(80)), 2_000);
    }
}

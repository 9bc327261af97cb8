//! Recent reachability per target, for sparklines.

use std::collections::{HashMap, VecDeque};

use portwatch_types::{SessionSnapshot, Target};

/// Maximum number of samples kept per target.
pub const MAX_HISTORY_SIZE: usize = 60;

/// Bounded window of the most recent probe results of each target.
///
/// Fed from successive snapshots; only samples not seen before are appended,
/// so refreshing faster than the probe interval does not duplicate entries.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Recent results per target, oldest first (`true` = up).
    pub targets: HashMap<Target, VecDeque<bool>>,
    /// Samples already consumed per target.
    seen: HashMap<Target, usize>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, e.g. when a new session starts.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.seen.clear();
    }

    /// Append samples that arrived since the last call.
    pub fn record(&mut self, snapshot: &SessionSnapshot) {
        for series in snapshot.iter() {
            let seen = self.seen.entry(series.target.clone()).or_default();
            let recent = self.targets.entry(series.target.clone()).or_default();

            // Series shrank: the aggregator was reset under us
            if series.len() < *seen {
                *seen = 0;
                recent.clear();
            }

            let start = (*seen).max(series.len().saturating_sub(MAX_HISTORY_SIZE));
            for sample in &series.samples[start..] {
                recent.push_back(sample.is_up());
                if recent.len() > MAX_HISTORY_SIZE {
                    recent.pop_front();
                }
            }
            *seen = series.len();
        }
    }

    /// Sparkline bar heights (0-7) for a target, oldest first.
    pub fn sparkline(&self, target: &Target) -> Vec<u8> {
        self.targets
            .get(target)
            .map(|recent| recent.iter().map(|&up| if up { 7 } else { 0 }).collect())
            .unwrap_or_default()
    }

    /// Fraction of the recent window where the target was up.
    pub fn recent_uptime(&self, target: &Target) -> Option<f64> {
        let recent = self.targets.get(target)?;
        if recent.is_empty() {
            return None;
        }
        let up = recent.iter().filter(|&&up| up).count();
        Some(up as f64 / recent.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new("127.0.0.1", 80)
    }

    #[test]
    fn repeated_snapshots_do_not_duplicate() {
        let snapshot = SessionSnapshot::builder()
            .target(target(), 1, |s| s.up(1).down(2))
            .build();

        let mut history = History::new();
        history.record(&snapshot);
        history.record(&snapshot);

        assert_eq!(history.sparkline(&target()), vec![7, 0]);
        assert_eq!(history.recent_uptime(&target()), Some(0.5));
    }

    #[test]
    fn window_is_bounded() {
        let snapshot = SessionSnapshot::builder()
            .target(target(), 1, |mut s| {
                for ts in 0..(MAX_HISTORY_SIZE as u64 + 15) {
                    s = s.up(ts);
                }
                s.down(1_000)
            })
            .build();

        let mut history = History::new();
        history.record(&snapshot);

        let line = history.sparkline(&target());
        assert_eq!(line.len(), MAX_HISTORY_SIZE);
        assert_eq!(line.last(), Some(&0));
    }

    #[test]
    fn reset_session_starts_over() {
        let mut history = History::new();
        history.record(
            &SessionSnapshot::builder()
                .target(target(), 1, |s| s.up(1).up(2).up(3))
                .build(),
        );
        history.record(
            &SessionSnapshot::builder()
                .target(target(), 1, |s| s.down(10))
                .build(),
        );

        assert_eq!(history.sparkline(&target()), vec![0]);
    }

    #[test]
    fn unknown_target_is_empty() {
        let history = History::new();
        assert!(history.sparkline(&target()).is_empty());
        assert_eq!(history.recent_uptime(&target()), None);
    }
}

//! Targets and the records produced by probing them.

use alloc::format;
use alloc::string::String;
use core::fmt;

/// A monitored TCP endpoint.
///
/// Targets are immutable once a monitoring session starts. Ordering is by
/// host, then port, so targets can key sorted maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct Target {
    /// Host name or IP literal. Not resolved up front.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub host: String,

    /// TCP port (1-65535).
    #[cfg_attr(feature = "minicbor", n(1))]
    pub port: u16,
}

impl Target {
    /// Create a new target.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Socket address string suitable for a connect call.
    ///
    /// Bare IPv6 literals are wrapped in brackets.
    ///
    /// ```rust
    /// use portwatch_types::Target;
    ///
    /// assert_eq!(Target::new("localhost", 8080).address(), "localhost:8080");
    /// assert_eq!(Target::new("::1", 22).address(), "[::1]:22");
    /// ```
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

/// Reachability of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub enum PortState {
    /// A TCP connection could be established.
    #[cfg_attr(feature = "minicbor", n(0))]
    Up,
    /// Connection refused, timed out, or the host could not be resolved.
    #[cfg_attr(feature = "minicbor", n(1))]
    Down,
}

impl PortState {
    /// Map a probe result to a state.
    pub fn from_reachable(is_up: bool) -> Self {
        if is_up {
            PortState::Up
        } else {
            PortState::Down
        }
    }

    pub fn is_up(self) -> bool {
        self == PortState::Up
    }

    /// Upper-case label used in event summaries.
    pub fn label(self) -> &'static str {
        match self {
            PortState::Up => "UP",
            PortState::Down => "DOWN",
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One observation of a target.
///
/// `level` is 0 when the target was unreachable and the target's 1-based
/// rank when it was reachable, so several targets can share one chart with
/// distinct "up" baselines and a common "down" floor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct Sample {
    #[cfg_attr(feature = "minicbor", n(0))]
    pub target: Target,

    /// Unix timestamp in milliseconds when the probe completed.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub timestamp_ms: u64,

    #[cfg_attr(feature = "minicbor", n(2))]
    pub level: u16,
}

impl Sample {
    /// Build a sample from a probe result and the target's rank.
    pub fn observed(target: Target, timestamp_ms: u64, rank: u16, is_up: bool) -> Self {
        Self {
            target,
            timestamp_ms,
            level: if is_up { rank } else { 0 },
        }
    }

    pub fn is_up(&self) -> bool {
        self.level > 0
    }

    pub fn state(&self) -> PortState {
        PortState::from_reachable(self.is_up())
    }
}

/// A change in reachability of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct TransitionEvent {
    /// Unix timestamp in milliseconds of the observation that changed state.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub timestamp_ms: u64,

    #[cfg_attr(feature = "minicbor", n(1))]
    pub target: Target,

    /// The state the target moved into.
    #[cfg_attr(feature = "minicbor", n(2))]
    pub state: PortState,
}

impl TransitionEvent {
    pub fn new(timestamp_ms: u64, target: Target, state: PortState) -> Self {
        Self {
            timestamp_ms,
            target,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_display_uses_address() {
        let target = Target::new("example.com", 443);
        assert_eq!(format!("{}", target), "example.com:443");
    }

    #[test]
    fn bracketed_ipv6_is_left_alone() {
        let target = Target::new("[fe80::1]", 80);
        assert_eq!(target.address(), "[fe80::1]:80");
    }

    #[test]
    fn targets_order_by_host_then_port() {
        let a = Target::new("a", 443);
        let b = Target::new("a", 80);
        let c = Target::new("b", 1);
        let mut targets = alloc::vec![c.clone(), a.clone(), b.clone()];
        targets.sort();
        assert_eq!(targets, alloc::vec![b, a, c]);
    }

    #[test]
    fn sample_level_follows_reachability() {
        let target = Target::new("localhost", 22);

        let up = Sample::observed(target.clone(), 10, 3, true);
        assert_eq!(up.level, 3);
        assert!(up.is_up());
        assert_eq!(up.state(), PortState::Up);

        let down = Sample::observed(target, 20, 3, false);
        assert_eq!(down.level, 0);
        assert_eq!(down.state(), PortState::Down);
    }

    #[test]
    fn port_state_labels() {
        assert_eq!(PortState::Up.to_string(), "UP");
        assert_eq!(PortState::Down.to_string(), "DOWN");
        assert_eq!(PortState::from_reachable(true), PortState::Up);
        assert!(!PortState::from_reachable(false).is_up());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn port_state_serializes_upper_case() {
        let json = serde_json::to_string(&PortState::Down).unwrap();
        assert_eq!(json, "\"DOWN\"");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn event_json_shape() {
        let event = TransitionEvent::new(1_700_000_000_000, Target::new("10.0.0.1", 5432), PortState::Up);
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["target"]["port"], 5432);
        assert_eq!(value["state"], "UP");
        assert_eq!(value["timestamp_ms"], 1_700_000_000_000u64);
    }
}

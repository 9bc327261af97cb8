//! # portwatch-core
//!
//! Engine for watching TCP port liveness on a host.
//!
//! A [`SessionController`] parses a comma-separated port list, spawns one
//! monitor task per port and collects what they observe in a shared
//! [`Aggregator`]. Each monitor probes its target once per interval by
//! opening a TCP connection, records a sample (`level` = rank when up, 0 when
//! down) and logs a transition event whenever reachability flips.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portwatch_core::{output, SessionController};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut session = SessionController::new();
//!     session.start("localhost", "22, 80, 443").unwrap();
//!
//!     tokio::time::sleep(Duration::from_secs(30)).await;
//!     session.stop().await;
//!
//!     print!("{}", output::summary_text(&session.snapshot()));
//! }
//! ```
//!
//! ## Features
//!
//! - **Concurrent**: one task per port, no cross-target blocking
//! - **Bounded probes**: each connect attempt has its own timeout
//! - **Clean shutdown**: `stop` returns only after every monitor has exited
//! - **Pluggable probes**: swap the TCP prober via the [`Probe`] trait

mod aggregator;
mod error;
pub mod output;
mod ports;

#[cfg(feature = "tokio")]
mod monitor;
#[cfg(feature = "tokio")]
mod prober;
#[cfg(feature = "tokio")]
mod session;

pub use aggregator::Aggregator;
pub use error::{ExportError, PortSpecError, SessionError};
pub use output::Output;
pub use ports::{PortSpec, RankedPort};

#[cfg(feature = "tokio")]
pub use monitor::{
    MonitorHandle, MonitorState, TargetMonitor, TransitionTracker, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_INTERVAL,
};
#[cfg(feature = "tokio")]
pub use prober::{probe, FnProbe, Probe, TcpProber};
#[cfg(feature = "tokio")]
pub use session::{
    SessionController, SessionControllerBuilder, StartReport, StopReport, DEFAULT_STOP_TIMEOUT,
};

// Re-export types for convenience
pub use portwatch_types::{
    PortState, RunState, Sample, SessionSnapshot, Target, TargetSeries, TransitionEvent,
};

//! Data helpers for the terminal UI.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "500ms")
//! - [`history`]: Recent reachability per target for sparklines
//!
//! ## Data Flow
//!
//! ```text
//! Aggregator::collect()
//!        │
//!        ▼
//! SessionSnapshot ──▶ History::record() (for sparklines)
//!        │
//!        └──▶ ui::{chart, targets, event_log}
//! ```

pub mod duration;
pub mod history;

pub use history::History;

// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # portwatch
//!
//! A terminal UI and headless runner for watching TCP port liveness.
//!
//! The monitoring engine lives in `portwatch-core`; this crate wraps a
//! [`SessionController`](portwatch_core::SessionController) with an
//! interactive ratatui front end, layered configuration and a plain-text
//! headless mode.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (history)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌──────────────────┐                                       │
//! │  │ SessionController│◀── one monitor task per port          │
//! │  │  (portwatch-core)│                                       │
//! │  └──────────────────┘                                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, session control
//! - **[`data`]**: Duration parsing and sparkline history
//! - **[`ui`]**: Chart, targets table and event log views
//! - **[`settings`]**: File, environment and flag configuration
//! - **[`headless`]**: Run a session and print events without a terminal UI
//!
//! ## Usage
//!
//! ```bash
//! # Interactive
//! portwatch --host localhost --ports "22, 80, 443"
//!
//! # Headless for 30 seconds, then write both exports
//! portwatch --host localhost --ports 80 --headless --duration 30s \
//!     --summary port-summary.txt --export session.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use portwatch::{App, ExportPaths, Theme};
//! use portwatch_core::SessionController;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let app = App::new(
//!     SessionController::new(),
//!     runtime.handle().clone(),
//!     "localhost",
//!     "22, 80",
//!     ExportPaths {
//!         summary: "port-summary.txt".into(),
//!         json: "portwatch-session.json".into(),
//!     },
//!     Theme::dark(),
//! );
//! assert!(!app.is_monitoring());
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod headless;
pub mod settings;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, EditField, ExportPaths, TargetEditor, View};
pub use headless::HeadlessOptions;
pub use settings::{Overrides, Settings, Timings};
pub use ui::Theme;

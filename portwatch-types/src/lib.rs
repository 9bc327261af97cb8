//! # portwatch-types
//!
//! Core types for TCP port liveness monitoring. This crate defines the data
//! model shared by the monitoring engine (`portwatch-core`) and anything that
//! consumes its output: terminal dashboards, exporters, test harnesses.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable `serde` and/or `minicbor` features as needed
//! - **Append-only records**: [`Sample`] and [`TransitionEvent`] are plain values,
//!   never mutated once recorded
//! - **Versioned schema**: Snapshots include version info for forward compatibility
//! - **Ergonomic builders**: Fluent API for constructing snapshots in tests and tools
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//! - `minicbor`: Compact binary serialization via CBOR
//! - `all`: Enable all serialization formats
//!
//! ## Example
//!
//! ```rust
//! use portwatch_types::{PortState, SessionSnapshot, Target};
//!
//! let snapshot = SessionSnapshot::builder()
//!     .target(Target::new("127.0.0.1", 80), 1, |s| s.up(1_000).up(2_000).down(3_000))
//!     .target(Target::new("127.0.0.1", 443), 2, |s| s.down(1_000).down(2_000))
//!     .build();
//!
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot.total_samples(), 5);
//!
//! let http = snapshot.by_port(80).unwrap();
//! assert_eq!(http.current_state(), Some(PortState::Down));
//! assert_eq!(http.samples[0].level, 1);
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is **1**. The version is included in serialized
//! snapshots to allow consumers to handle format evolution gracefully.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod record;
mod snapshot;
mod version;

pub use record::*;
pub use snapshot::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the snapshot format.
/// Consumers should check this version and handle older formats appropriately.
pub const SCHEMA_VERSION: u32 = 1;

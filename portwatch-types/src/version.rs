//! Schema versioning for exported session snapshots.

use core::fmt;

use crate::SCHEMA_VERSION;

/// Schema version embedded in every [`SessionSnapshot`](crate::SessionSnapshot).
///
/// Exported JSON files outlive the process that wrote them, so readers check
/// this before interpreting the series and event fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct SchemaVersion {
    /// Bumped on breaking layout changes.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub major: u32,

    /// Bumped on additive changes.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub minor: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The version written by this build.
    pub const fn current() -> Self {
        Self::new(SCHEMA_VERSION, 0)
    }

    /// Readable by this build: same major version.
    pub fn is_compatible(&self) -> bool {
        self.major == SCHEMA_VERSION
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

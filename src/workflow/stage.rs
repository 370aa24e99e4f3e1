//! Pipeline stage machine.

use std::fmt;

/// States of one processing run.
///
/// Progression is strictly forward; `Failed` is terminal and reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Request accepted, nothing checked yet
    Received,

    /// Image and map text passed type/size checks
    Validated,

    /// Regions extracted from the map markup
    Parsed,

    /// Slices cropped from the source image
    Sliced,

    /// Slices persisted with fetchable URLs
    Published,

    /// Responsive markup generated
    Rendered,

    /// Output archive written
    Packaged,

    /// All outputs available
    Completed,

    /// Terminal failure state
    Failed,
}

impl Stage {
    /// Stable lowercase name, used in logs and error responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Parsed => "parsed",
            Stage::Sliced => "sliced",
            Stage::Published => "published",
            Stage::Rendered => "rendered",
            Stage::Packaged => "packaged",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Lifecycle of a frame.

use std::fmt;

/// Where a generator or task is in its life.
///
/// `Created → Suspended* → (Completed | Failed)`. The two terminal states
/// are final: no further values are produced once either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameState {
    /// Built but never resumed.
    #[default]
    Created,
    /// Parked at a suspension point.
    Suspended,
    /// Body ran to its end.
    Completed,
    /// Body raised an error or panicked.
    Failed,
}

impl FrameState {
    /// `true` for [`Completed`](Self::Completed) and [`Failed`](Self::Failed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Suspended => "suspended",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

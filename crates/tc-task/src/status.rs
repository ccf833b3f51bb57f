//! Task outcomes.
//!
//! Failures here are ordinary results, not errors: every one leaves the
//! cover table consistent and the scheduler simply tries again later.

use std::fmt;

/// Result of one task step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Still working; call `update` again next tick.
    Continue,
    /// The agent is in cover.
    Done,
    Failed(FailReason),
}

impl TaskStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Continue)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FailReason {
    /// Stunned, asleep, or jumping out of water.
    Impaired,
    NoTarget,
    /// The self and target distance discs do not intersect.
    RangesDoNotOverlap,
    /// Already inside a minimum distance; cover would mean backing off.
    TooCloseToTarget,
    SearchExhausted,
    /// The reserved slot could not be pathed to; it was removed.
    Unreachable,
    /// The initial rough path could not be computed.
    PathFailed,
    TooCloseToThreat,
    /// The path the cover was found along disappeared.
    LostCoverPath,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailReason::Impaired => "agent impaired",
            FailReason::NoTarget => "no target",
            FailReason::RangesDoNotOverlap => "distance ranges do not overlap",
            FailReason::TooCloseToTarget => "too close to target",
            FailReason::SearchExhausted => "no cover found",
            FailReason::Unreachable => "cover unreachable",
            FailReason::PathFailed => "path failed",
            FailReason::TooCloseToThreat => "too close to threat",
            FailReason::LostCoverPath => "cover path lost",
        };
        f.write_str(s)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Continue => f.write_str("continue"),
            TaskStatus::Done => f.write_str("done"),
            TaskStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

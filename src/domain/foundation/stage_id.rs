//! StageId enum representing the 12 reflective coaching stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The coaching stages, in the only order a conversation may traverse them.
///
/// Derived `Ord` follows declaration order, so `a < b` means `a` comes
/// earlier in the sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Topic,
    Event,
    Emotions,
    Thought,
    Action,
    Gap,
    Pattern,
    Stance,
    Forces,
    Choice,
    Vision,
    Commitment,
}

impl StageId {
    /// Returns all stages in canonical order.
    pub fn all() -> &'static [StageId] {
        &[
            StageId::Topic,
            StageId::Event,
            StageId::Emotions,
            StageId::Thought,
            StageId::Action,
            StageId::Gap,
            StageId::Pattern,
            StageId::Stance,
            StageId::Forces,
            StageId::Choice,
            StageId::Vision,
            StageId::Commitment,
        ]
    }

    /// The stage every conversation starts in.
    pub fn first() -> StageId {
        StageId::Topic
    }

    /// The stage after which the engine has no further transitions.
    pub fn terminal() -> StageId {
        StageId::Commitment
    }

    /// Returns the 0-based index of this stage in the canonical order.
    pub fn order_index(&self) -> usize {
        *self as usize
    }

    /// Returns the next stage in order, if any.
    pub fn next(&self) -> Option<StageId> {
        Self::all().get(self.order_index() + 1).copied()
    }

    /// Returns the previous stage in order, if any.
    pub fn previous(&self) -> Option<StageId> {
        let idx = self.order_index();
        if idx == 0 {
            None
        } else {
            Self::all().get(idx - 1).copied()
        }
    }

    /// Returns true if this stage comes before another in order.
    pub fn is_before(&self, other: &StageId) -> bool {
        self.order_index() < other.order_index()
    }

    /// Returns true if this stage comes after another in order.
    pub fn is_after(&self, other: &StageId) -> bool {
        self.order_index() > other.order_index()
    }

    pub fn is_terminal(&self) -> bool {
        *self == Self::terminal()
    }

    /// Returns the display name.
    pub fn label(&self) -> &'static str {
        match self {
            StageId::Topic => "Topic",
            StageId::Event => "Event",
            StageId::Emotions => "Emotions",
            StageId::Thought => "Thought",
            StageId::Action => "Action",
            StageId::Gap => "Gap",
            StageId::Pattern => "Pattern",
            StageId::Stance => "Stance",
            StageId::Forces => "Forces",
            StageId::Choice => "Choice",
            StageId::Vision => "Vision",
            StageId::Commitment => "Commitment",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

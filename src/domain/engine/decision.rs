//! Decision types passed between gate, guard and composer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StageId;
use crate::domain::session::FieldUpdates;

/// Raw or effective outcome of evaluating one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Advance,
    Loop,
    /// Guard veto on a backward move. Never leaves the guard.
    Blocked,
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateOutcome::Advance => "advance",
            GateOutcome::Loop => "loop",
            GateOutcome::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

/// Gate verdict for one utterance together with the values it extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub outcome: GateOutcome,
    pub rationale: String,
    pub updates: FieldUpdates,
    /// Units still needed after merging, for count-based predicates.
    pub missing_count: Option<usize>,
    /// Stage the decision would move to.
    pub target_stage: StageId,
    /// True when the semantic judge was bypassed or unavailable.
    pub degraded: bool,
}

/// Which gate strategy applies on semantic stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrictnessProfile {
    /// Ask the semantic judge, falling back on failure.
    #[default]
    Semantic,
    /// Always use the deterministic fallback.
    Deterministic,
}

/// Why the composer switched to adaptive explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveTrigger {
    StuckLoop,
    Confusion,
}

/// What the composer should produce for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Composition {
    /// Enter `to` with its canonical script.
    Advance { to: StageId },
    /// Re-ask the current stage briefly.
    Loop { missing: Option<usize> },
    /// Acknowledge, explain, illustrate and re-ask in new words.
    AdaptiveLoop { trigger: AdaptiveTrigger },
    /// Decline a backward move and continue at the current stage.
    Redirect,
    /// The final stage is complete.
    Concluded,
}

impl Composition {
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            Composition::Loop { .. } | Composition::AdaptiveLoop { .. } | Composition::Redirect
        )
    }
}

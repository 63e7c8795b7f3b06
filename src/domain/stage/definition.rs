//! Stage definitions.
//!
//! A definition says which fields a stage collects, how its gate decides
//! completion, and what the system says when entering or looping on it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StageId;
use crate::domain::session::CollectedData;
use crate::domain::text::word_count;

use super::template::ScriptTemplate;

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    List,
}

/// A field collected by a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// When a stage counts as complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionPredicate {
    /// A list field holds at least `min` distinct entries.
    MinItems { field: String, min: usize },
    /// A text field holds at least `min_words` words.
    NonEmpty { field: String, min_words: usize },
    /// A number field holds a value within `min..=max`.
    Scored { field: String, min: i64, max: i64 },
    /// A text field is present and its confirmation flag is set. The flag
    /// is raised either by the human affirming, or by the semantic gate.
    Confirmed { field: String, flag: String },
}

impl CompletionPredicate {
    pub fn is_satisfied(&self, data: &CollectedData) -> bool {
        match self {
            CompletionPredicate::MinItems { field, min } => data.list_len(field) >= *min,
            CompletionPredicate::NonEmpty { field, min_words } => data
                .text(field)
                .is_some_and(|t| !t.trim().is_empty() && word_count(t) >= *min_words),
            CompletionPredicate::Scored { field, min, max } => data
                .number(field)
                .is_some_and(|n| (*min..=*max).contains(&n)),
            CompletionPredicate::Confirmed { field, flag } => {
                data.contains(field) && data.flag(flag)
            }
        }
    }

    /// How many more units are required, for count-based predicates.
    pub fn missing_count(&self, data: &CollectedData) -> Option<usize> {
        match self {
            CompletionPredicate::MinItems { field, min } => {
                Some(min.saturating_sub(data.list_len(field)))
            }
            _ => None,
        }
    }

    /// True when the stage already holds a non-trivial amount of data.
    ///
    /// Used to honor explicit closure signals from the human.
    pub fn is_substantial(&self, data: &CollectedData) -> bool {
        match self {
            CompletionPredicate::MinItems { field, min } => {
                data.list_len(field) >= (min / 2).max(1)
            }
            CompletionPredicate::NonEmpty { field, .. } => data.contains(field),
            CompletionPredicate::Scored { field, .. } => data.number(field).is_some(),
            CompletionPredicate::Confirmed { field, .. } => {
                data.text(field).is_some_and(|t| word_count(t) >= 3)
            }
        }
    }

    /// Fields the predicate reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            CompletionPredicate::MinItems { field, .. }
            | CompletionPredicate::NonEmpty { field, .. }
            | CompletionPredicate::Scored { field, .. } => vec![field.as_str()],
            CompletionPredicate::Confirmed { field, flag } => vec![field.as_str(), flag.as_str()],
        }
    }

    pub fn primary_field(&self) -> &str {
        match self {
            CompletionPredicate::MinItems { field, .. }
            | CompletionPredicate::NonEmpty { field, .. }
            | CompletionPredicate::Scored { field, .. }
            | CompletionPredicate::Confirmed { field, .. } => field,
        }
    }
}

/// Conservative surface check used when semantic judgment is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCheck {
    pub min_words: usize,
    pub keywords: Vec<String>,
}

/// Yes/no question posed to the semantic-judgment collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticCheck {
    pub question: String,
    pub fallback: FallbackCheck,
}

/// How a stage's gate classifies an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateStrategy {
    /// Surface features decide: token counts, scores, affirmations.
    Deterministic,
    /// A semantic judgment decides, with a deterministic fallback.
    Semantic(SemanticCheck),
}

/// Shape a reflection opener must take for this stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenerFormat {
    /// Short free-text echo.
    FreeText,
    /// Exactly `I hear: X, Y.` with items taken from the utterance.
    ListEcho,
}

/// Immutable description of one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDefinition {
    pub id: StageId,
    pub fields: Vec<FieldSpec>,
    pub predicate: CompletionPredicate,
    pub strategy: GateStrategy,
    /// Spoken when the conversation enters this stage.
    pub advance_script: ScriptTemplate,
    /// Short re-ask while looping; may use `{missing}`.
    pub loop_script: ScriptTemplate,
    /// One sentence on why the stage asks what it asks.
    pub rationale: String,
    /// Illustration grounded in earlier answers where possible.
    pub example: ScriptTemplate,
    /// Alternative phrasings of the stage question.
    pub rephrasings: Vec<String>,
    pub opener_format: OpenerFormat,
    /// Phrases meaning "I'm done with this stage".
    pub completion_signals: Vec<String>,
    /// Loop count at which the adaptive explanation takes over.
    pub stuck_threshold: u32,
}

impl StageDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// First text field other than the predicate's primary field.
    pub fn label_field(&self) -> Option<&FieldSpec> {
        let primary = self.predicate.primary_field();
        self.fields
            .iter()
            .find(|f| f.kind == FieldKind::Text && f.name != primary)
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self.strategy, GateStrategy::Semantic(_))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

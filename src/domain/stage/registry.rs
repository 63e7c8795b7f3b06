//! Stage Registry
//!
//! Read-only table of stage definitions, validated once at construction.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

use crate::domain::foundation::StageId;

use super::catalog;
use super::definition::{CompletionPredicate, FieldKind, GateStrategy, StageDefinition};
use super::template::ScriptTemplate;

/// Lowest stuck-loop threshold a stage may declare.
pub const MIN_STUCK_THRESHOLD: u32 = 3;

/// Placeholder filled by the composer on loop scripts, not from collected data.
const MISSING_PLACEHOLDER: &str = "missing";

/// Configuration problems found while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no definition for stage {0}")]
    MissingStage(StageId),

    #[error("stage {0} is defined more than once")]
    DuplicateStage(StageId),

    #[error("stage {stage} has stuck threshold {threshold}, minimum is {}", MIN_STUCK_THRESHOLD)]
    StuckThresholdTooLow { stage: StageId, threshold: u32 },

    #[error("stage {stage} has invalid minimum for field '{field}'")]
    InvalidMinimum { stage: StageId, field: String },

    #[error("stage {stage} has an empty {script} script")]
    EmptyScript { stage: StageId, script: &'static str },

    #[error("stage {stage} has {count} rephrasings, at least 2 are required")]
    TooFewRephrasings { stage: StageId, count: usize },

    #[error("stage {stage} predicate reads undeclared field '{field}'")]
    UndeclaredField { stage: StageId, field: String },

    #[error("stage {stage} predicate does not fit field '{field}'")]
    StrategyMismatch { stage: StageId, field: String },

    #[error("stage {stage} has score range {min}..={max}")]
    InvalidScoreRange { stage: StageId, min: i64, max: i64 },

    #[error("closing script is empty")]
    EmptyClosingScript,

    #[error("{script} script of {owner} uses unknown placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder {
        owner: String,
        script: &'static str,
        placeholder: String,
    },
}

/// Per-stage threshold overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StageTuning {
    /// Replaces `min` on a `MinItems` predicate.
    pub min_items: Option<usize>,
    /// Replaces `min_words` on a `NonEmpty` predicate.
    pub min_words: Option<usize>,
    pub stuck_threshold: Option<u32>,
    /// Appended to the stage's completion signals.
    pub completion_signals: Vec<String>,
}

impl StageTuning {
    pub fn apply(&self, definition: &mut StageDefinition) {
        match &mut definition.predicate {
            CompletionPredicate::MinItems { min, .. } => {
                if let Some(value) = self.min_items {
                    *min = value;
                }
            }
            CompletionPredicate::NonEmpty { min_words, .. } => {
                if let Some(value) = self.min_words {
                    *min_words = value;
                }
            }
            _ => {}
        }
        if let Some(threshold) = self.stuck_threshold {
            definition.stuck_threshold = threshold;
        }
        for signal in &self.completion_signals {
            if !definition.completion_signals.contains(signal) {
                definition.completion_signals.push(signal.clone());
            }
        }
    }
}

/// Total, validated map from stage id to definition.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: BTreeMap<StageId, StageDefinition>,
    closing: ScriptTemplate,
}

impl StageRegistry {
    /// Builds a registry from explicit definitions.
    pub fn from_definitions(
        definitions: Vec<StageDefinition>,
        closing: ScriptTemplate,
    ) -> Result<Self, RegistryError> {
        let mut stages = BTreeMap::new();
        for definition in definitions {
            let id = definition.id;
            validate(&definition)?;
            if stages.insert(id, definition).is_some() {
                return Err(RegistryError::DuplicateStage(id));
            }
        }
        if let Some(missing) = StageId::all().iter().find(|id| !stages.contains_key(id)) {
            return Err(RegistryError::MissingStage(*missing));
        }
        if closing.is_blank() {
            return Err(RegistryError::EmptyClosingScript);
        }
        check_placeholders(&stages, &closing)?;
        Ok(Self { stages, closing })
    }

    /// The built-in twelve-stage catalog with overrides applied.
    pub fn standard(
        overrides: &HashMap<StageId, StageTuning>,
        default_stuck_threshold: u32,
    ) -> Result<Self, RegistryError> {
        let definitions = catalog::definitions()
            .into_iter()
            .map(|mut definition| {
                definition.stuck_threshold = default_stuck_threshold;
                if let Some(tuning) = overrides.get(&definition.id) {
                    tuning.apply(&mut definition);
                }
                definition
            })
            .collect();
        Self::from_definitions(definitions, catalog::closing_script())
    }

    pub fn get(&self, stage: StageId) -> &StageDefinition {
        // Totality is checked in `from_definitions`.
        &self.stages[&stage]
    }

    pub fn closing_script(&self) -> &ScriptTemplate {
        &self.closing
    }

    /// Definitions in stage order.
    pub fn iter(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.values()
    }
}

fn validate(definition: &StageDefinition) -> Result<(), RegistryError> {
    let stage = definition.id;

    if definition.stuck_threshold < MIN_STUCK_THRESHOLD {
        return Err(RegistryError::StuckThresholdTooLow {
            stage,
            threshold: definition.stuck_threshold,
        });
    }
    if definition.advance_script.is_blank() {
        return Err(RegistryError::EmptyScript {
            stage,
            script: "advance",
        });
    }
    if definition.loop_script.is_blank() {
        return Err(RegistryError::EmptyScript {
            stage,
            script: "loop",
        });
    }
    if definition.rephrasings.iter().filter(|r| !r.trim().is_empty()).count() < 2 {
        return Err(RegistryError::TooFewRephrasings {
            stage,
            count: definition.rephrasings.len(),
        });
    }

    for field in definition.predicate.fields() {
        if !definition.declares(field) {
            return Err(RegistryError::UndeclaredField {
                stage,
                field: field.to_string(),
            });
        }
    }

    let expect_kind = |field: &str, kind: FieldKind| -> Result<(), RegistryError> {
        match definition.field(field) {
            Some(spec) if spec.kind == kind => Ok(()),
            _ => Err(RegistryError::StrategyMismatch {
                stage,
                field: field.to_string(),
            }),
        }
    };

    match &definition.predicate {
        CompletionPredicate::MinItems { field, min } => {
            if *min < 1 {
                return Err(RegistryError::InvalidMinimum {
                    stage,
                    field: field.clone(),
                });
            }
            expect_kind(field, FieldKind::List)?;
        }
        CompletionPredicate::NonEmpty { field, min_words } => {
            if *min_words < 1 {
                return Err(RegistryError::InvalidMinimum {
                    stage,
                    field: field.clone(),
                });
            }
            expect_kind(field, FieldKind::Text)?;
        }
        CompletionPredicate::Scored { field, min, max } => {
            if min > max {
                return Err(RegistryError::InvalidScoreRange {
                    stage,
                    min: *min,
                    max: *max,
                });
            }
            expect_kind(field, FieldKind::Number)?;
        }
        CompletionPredicate::Confirmed { field, flag } => {
            expect_kind(field, FieldKind::Text)?;
            expect_kind(flag, FieldKind::Flag)?;
        }
    }

    // Semantic judgment only makes sense for free-text confirmations.
    if let GateStrategy::Semantic(_) = definition.strategy {
        if !matches!(definition.predicate, CompletionPredicate::Confirmed { .. }) {
            return Err(RegistryError::StrategyMismatch {
                stage,
                field: definition.predicate.primary_field().to_string(),
            });
        }
    }

    Ok(())
}

/// Main texts may only name fields some stage declares; fallbacks are
/// rendered without collected data and may only use composer extras.
fn check_placeholders(
    stages: &BTreeMap<StageId, StageDefinition>,
    closing: &ScriptTemplate,
) -> Result<(), RegistryError> {
    let declared: HashSet<&str> = stages
        .values()
        .flat_map(|d| d.fields.iter().map(|f| f.name.as_str()))
        .collect();

    for definition in stages.values() {
        let owner = format!("stage {}", definition.id);
        unknown_placeholder(&declared, &owner, "advance", &definition.advance_script, &[])?;
        unknown_placeholder(
            &declared,
            &owner,
            "loop",
            &definition.loop_script,
            &[MISSING_PLACEHOLDER],
        )?;
        unknown_placeholder(&declared, &owner, "example", &definition.example, &[])?;
    }
    unknown_placeholder(&declared, "the conversation", "closing", closing, &[])
}

fn unknown_placeholder(
    declared: &HashSet<&str>,
    owner: &str,
    script: &'static str,
    template: &ScriptTemplate,
    extras: &[&str],
) -> Result<(), RegistryError> {
    let in_text = template
        .placeholders()
        .into_iter()
        .find(|name| !declared.contains(name) && !extras.contains(name));
    let in_fallback = template
        .fallback_placeholders()
        .into_iter()
        .find(|name| !extras.contains(name));
    match in_text.or(in_fallback) {
        Some(name) => Err(RegistryError::UnknownPlaceholder {
            owner: owner.to_string(),
            script,
            placeholder: name.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> StageRegistry {
        StageRegistry::standard(&HashMap::new(), MIN_STUCK_THRESHOLD).unwrap()
    }

    #[test]
    fn standard_registry_is_total() {
        let registry = standard();
        let ids: Vec<StageId> = registry.iter().map(|d| d.id).collect();
        assert_eq!(ids, StageId::all().to_vec());
    }

    #[test]
    fn missing_stage_is_rejected() {
        let mut definitions = catalog::definitions();
        definitions.retain(|d| d.id != StageId::Gap);
        let err = StageRegistry::from_definitions(definitions, catalog::closing_script())
            .unwrap_err();
        assert_eq!(err, RegistryError::MissingStage(StageId::Gap));
    }

    #[test]
    fn duplicate_stage_is_rejected() {
        let mut definitions = catalog::definitions();
        definitions.push(definitions[0].clone());
        let err = StageRegistry::from_definitions(definitions, catalog::closing_script())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateStage(StageId::Topic));
    }

    mod placeholders {
        use super::*;

        fn with_advance(stage: StageId, advance: ScriptTemplate) -> Result<StageRegistry, RegistryError> {
            let mut definitions = catalog::definitions();
            for definition in &mut definitions {
                if definition.id == stage {
                    definition.advance_script = advance.clone();
                }
            }
            StageRegistry::from_definitions(definitions, catalog::closing_script())
        }

        #[test]
        fn fields_from_earlier_stages_are_allowed() {
            let advance = ScriptTemplate::new("Back to {topic} and {emotions}.");
            assert!(with_advance(StageId::Vision, advance).is_ok());
        }

        #[test]
        fn unknown_field_is_rejected() {
            let err = with_advance(StageId::Thought, ScriptTemplate::new("About {mood}?")).unwrap_err();
            assert_eq!(
                err,
                RegistryError::UnknownPlaceholder {
                    owner: format!("stage {}", StageId::Thought),
                    script: "advance",
                    placeholder: "mood".to_string(),
                }
            );
        }

        #[test]
        fn missing_count_outside_loop_scripts_is_rejected() {
            let err = with_advance(StageId::Emotions, ScriptTemplate::new("{missing} more?")).unwrap_err();
            assert!(matches!(err, RegistryError::UnknownPlaceholder { script: "advance", .. }));
        }

        #[test]
        fn fallback_may_not_read_collected_data() {
            let advance = ScriptTemplate::with_fallback("About {topic}?", "About {topic} again?");
            let err = with_advance(StageId::Thought, advance).unwrap_err();
            assert!(matches!(err, RegistryError::UnknownPlaceholder { .. }));
        }

        #[test]
        fn closing_script_is_checked() {
            let closing = ScriptTemplate::new("Thanks for {feedback}.");
            let err = StageRegistry::from_definitions(catalog::definitions(), closing).unwrap_err();
            assert!(matches!(
                err,
                RegistryError::UnknownPlaceholder { script: "closing", .. }
            ));
        }
    }

    #[test]
    fn low_stuck_threshold_is_rejected() {
        let err = StageRegistry::standard(&HashMap::new(), 2).unwrap_err();
        assert!(matches!(err, RegistryError::StuckThresholdTooLow { threshold: 2, .. }));
    }

    #[test]
    fn zero_min_items_is_rejected() {
        let mut overrides = HashMap::new();
        overrides.insert(
            StageId::Emotions,
            StageTuning {
                min_items: Some(0),
                ..Default::default()
            },
        );
        let err = StageRegistry::standard(&overrides, 3).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidMinimum { stage: StageId::Emotions, .. }
        ));
    }

    #[test]
    fn single_rephrasing_is_rejected() {
        let mut definitions = catalog::definitions();
        definitions[2].rephrasings.truncate(1);
        let err = StageRegistry::from_definitions(definitions, catalog::closing_script())
            .unwrap_err();
        assert!(matches!(err, RegistryError::TooFewRephrasings { .. }));
    }

    #[test]
    fn undeclared_predicate_field_is_rejected() {
        let mut definitions = catalog::definitions();
        definitions[0].fields.clear();
        let err = StageRegistry::from_definitions(definitions, catalog::closing_script())
            .unwrap_err();
        assert!(matches!(err, RegistryError::UndeclaredField { .. }));
    }

    #[test]
    fn empty_loop_script_is_rejected() {
        let mut definitions = catalog::definitions();
        definitions[4].loop_script = ScriptTemplate::new("  ");
        let err = StageRegistry::from_definitions(definitions, catalog::closing_script())
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::EmptyScript {
                stage: StageId::Action,
                script: "loop"
            }
        );
    }

    #[test]
    fn overrides_are_applied() {
        let mut overrides = HashMap::new();
        overrides.insert(
            StageId::Emotions,
            StageTuning {
                min_items: Some(2),
                stuck_threshold: Some(5),
                completion_signals: vec!["enough".into()],
                ..Default::default()
            },
        );
        let registry = StageRegistry::standard(&overrides, 3).unwrap();
        let emotions = registry.get(StageId::Emotions);
        assert_eq!(
            emotions.predicate,
            CompletionPredicate::MinItems {
                field: "emotions".into(),
                min: 2
            }
        );
        assert_eq!(emotions.stuck_threshold, 5);
        assert!(emotions.completion_signals.iter().any(|s| s == "enough"));
        assert_eq!(registry.get(StageId::Forces).stuck_threshold, 3);
    }
}

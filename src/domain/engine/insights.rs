//! Read-only view of what a conversation has collected so far.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::StageId;
use crate::domain::session::{FieldValue, SessionState};
use crate::domain::stage::StageRegistry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageInsight {
    pub stage: StageId,
    pub label: &'static str,
    pub complete: bool,
    pub fields: BTreeMap<String, FieldValue>,
}

/// Per-stage snapshot of collected data, up to and including the current stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSnapshot {
    pub current_stage: StageId,
    pub concluded: bool,
    pub stages: Vec<StageInsight>,
}

impl InsightSnapshot {
    pub fn build(registry: &StageRegistry, state: &SessionState) -> Self {
        let collected = state.collected();
        let current = state.current_stage();
        let stages = StageId::all()
            .iter()
            .copied()
            .filter(|stage| *stage <= current)
            .map(|stage| {
                let definition = registry.get(stage);
                let fields = definition
                    .field_names()
                    .filter_map(|name| {
                        collected
                            .get(name)
                            .filter(|value| !value.is_empty())
                            .map(|value| (name.to_string(), value.clone()))
                    })
                    .collect();
                StageInsight {
                    stage,
                    label: stage.label(),
                    complete: definition.predicate.is_satisfied(collected),
                    fields,
                }
            })
            .collect();

        Self {
            current_stage: current,
            concluded: state.is_concluded(),
            stages,
        }
    }

    pub fn stage(&self, stage: StageId) -> Option<&StageInsight> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}

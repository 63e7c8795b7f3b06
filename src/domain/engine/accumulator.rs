//! Accumulator
//!
//! Merges extracted values into collected data. Lists are unioned across
//! turns so that the gate always compares against everything said so far
//! in the stage, never just the latest utterance.

use crate::domain::session::{CollectedData, FieldUpdates, FieldValue};

/// What a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// New list entries and newly set scalar fields.
    pub added: usize,
    /// List entries that were already present.
    pub duplicates: usize,
    /// Scalar fields whose value was overwritten.
    pub replaced: Vec<String>,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.added > 0 || !self.replaced.is_empty()
    }
}

pub struct Accumulator;

impl Accumulator {
    /// Merges `updates` into `data` in order.
    pub fn merge(data: &mut CollectedData, updates: &FieldUpdates) -> MergeReport {
        let mut report = MergeReport::default();
        for update in updates.iter() {
            match &update.value {
                FieldValue::List(items) => merge_list(data, &update.field, items, &mut report),
                scalar => merge_scalar(data, &update.field, scalar, &mut report),
            }
        }
        report
    }

    /// Result of merging without touching `data`.
    pub fn preview(data: &CollectedData, updates: &FieldUpdates) -> CollectedData {
        let mut merged = data.clone();
        Self::merge(&mut merged, updates);
        merged
    }
}

fn merge_list(data: &mut CollectedData, field: &str, items: &[String], report: &mut MergeReport) {
    if !matches!(data.get(field), Some(FieldValue::List(_))) {
        data.insert(field, FieldValue::List(Vec::new()));
    }
    let Some(FieldValue::List(existing)) = data.field_mut(field) else {
        return;
    };
    for item in items {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        // Entries differing only in case are the same entry.
        let key = item.to_lowercase();
        if existing.iter().any(|e| e.to_lowercase() == key) {
            report.duplicates += 1;
        } else {
            existing.push(item.to_string());
            report.added += 1;
        }
    }
}

fn merge_scalar(data: &mut CollectedData, field: &str, value: &FieldValue, report: &mut MergeReport) {
    let value = match value {
        FieldValue::Text(text) if text.trim().is_empty() => return,
        FieldValue::Text(text) => FieldValue::Text(text.trim().to_string()),
        other => other.clone(),
    };
    match data.insert(field, value.clone()) {
        None => report.added += 1,
        Some(previous) if previous != value => report.replaced.push(field.to_string()),
        Some(_) => {}
    }
}

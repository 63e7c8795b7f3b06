//! Collected data - the structured answers gathered across a conversation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single collected value.
///
/// Lists are ordered-unique: each entry appears once, in order of first
/// appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Flag(bool),
    List(Vec<String>),
}

impl FieldValue {
    /// Renders the value for interpolation into a script.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Flag(true) => "yes".to_string(),
            FieldValue::Flag(false) => "no".to_string(),
            FieldValue::List(items) => items.join(", "),
        }
    }

    /// True when the value carries no information.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Number(_) | FieldValue::Flag(_) => false,
        }
    }
}

/// Mapping from field name to value for one conversation.
///
/// Only the accumulator writes to this; everything else reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedData {
    fields: BTreeMap<String, FieldValue>,
}

impl CollectedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|v| !v.is_empty())
    }

    /// Returns the text value of a field, if it is a text field.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn number(&self, field: &str) -> Option<i64> {
        match self.fields.get(field) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Flags default to false when absent.
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(FieldValue::Flag(true)))
    }

    /// Returns list entries, or an empty slice if the field is absent or not a list.
    pub fn list(&self, field: &str) -> &[String] {
        match self.fields.get(field) {
            Some(FieldValue::List(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn list_len(&self, field: &str) -> usize {
        self.list(field).len()
    }

    /// Display form of a field for script interpolation.
    pub fn display(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .filter(|v| !v.is_empty())
            .map(FieldValue::display)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn field_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(field)
    }

    pub(crate) fn insert(&mut self, field: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(field.into(), value)
    }

    pub(crate) fn clear(&mut self) {
        self.fields.clear();
    }
}

/// A single extracted value waiting to be merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    pub value: FieldValue,
}

/// The set of extracted values produced by one gate evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldUpdates {
    updates: Vec<FieldUpdate>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(field, FieldValue::Text(value.into()));
        self
    }

    pub fn number(mut self, field: impl Into<String>, value: i64) -> Self {
        self.push(field, FieldValue::Number(value));
        self
    }

    pub fn flag(mut self, field: impl Into<String>, value: bool) -> Self {
        self.push(field, FieldValue::Flag(value));
        self
    }

    pub fn list<I, S>(mut self, field: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(Into::into).collect();
        self.push(field, FieldValue::List(items));
        self
    }

    pub fn push(&mut self, field: impl Into<String>, value: FieldValue) {
        self.updates.push(FieldUpdate {
            field: field.into(),
            value,
        });
    }

    /// Appends all updates from another set, preserving order.
    pub fn extend(&mut self, other: FieldUpdates) {
        self.updates.extend(other.updates);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldUpdate> {
        self.updates.iter()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

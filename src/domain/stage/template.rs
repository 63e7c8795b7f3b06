//! Script templates with `{field}` placeholders.

use crate::domain::session::CollectedData;

/// A script with named placeholders and a placeholder-free fallback.
///
/// Placeholders resolve first against caller-supplied extras (such as
/// `missing`), then against collected data. If any placeholder in the main
/// text cannot be resolved, the fallback is rendered instead, so a script
/// never shows a raw `{field}` or an invented value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    text: String,
    fallback: String,
}

impl ScriptTemplate {
    /// A template whose text is also its own fallback.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            fallback: text.clone(),
            text,
        }
    }

    pub fn with_fallback(text: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fallback: fallback.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() || self.fallback.trim().is_empty()
    }

    /// Placeholder names used by the main text.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholders(&self.text)
    }

    /// Placeholder names used by the fallback.
    pub fn fallback_placeholders(&self) -> Vec<&str> {
        placeholders(&self.fallback)
    }

    pub fn render(&self, data: &CollectedData) -> String {
        self.render_with(data, &[])
    }

    pub fn render_with(&self, data: &CollectedData, extras: &[(&str, String)]) -> String {
        let resolve = |name: &str| {
            extras
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.clone())
                .or_else(|| data.display(name))
        };

        if let Some(rendered) = fill(&self.text, resolve) {
            return rendered;
        }

        let extras_only = |name: &str| {
            extras
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.clone())
        };
        fill(&self.fallback, extras_only).unwrap_or_else(|| self.fallback.clone())
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn placeholders(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                if is_placeholder_name(name) {
                    names.push(name);
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}

/// Substitutes every placeholder, or returns `None` if one is unresolved.
fn fill<F>(text: &str, resolve: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder_name(&after[..close]) => {
                out.push_str(&resolve(&after[..close])?);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Some(out)
}

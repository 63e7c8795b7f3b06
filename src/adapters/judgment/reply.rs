//! Helpers for pulling structured data out of free-form model replies.

/// Extracts the first JSON object from a reply that may wrap it in a
/// markdown code block or surrounding prose.
pub(crate) fn extract_json_object(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();
    if let Some(block) = extract_from_code_block(trimmed) {
        return Some(block);
    }
    let start = trimmed.find('{')?;
    extract_balanced(trimmed, start)
}

fn extract_from_code_block(s: &str) -> Option<&str> {
    for pattern in ["```json", "```"] {
        if let Some(start) = s.find(pattern) {
            let body_start = start + pattern.len();
            if let Some(end) = s[body_start..].find("```") {
                let body = s[body_start..body_start + end].trim();
                if body.starts_with('{') {
                    return Some(body);
                }
            }
        }
    }
    None
}

fn extract_balanced(s: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strips wrapping quotes and whitespace from a one-line generated reply.
pub(crate) fn clean_line(reply: &str) -> String {
    reply
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim()
        .to_string()
}

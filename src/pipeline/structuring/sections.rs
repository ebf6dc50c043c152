//! Label-introduced narrative blocks (diagnosis, investigations, advice,
//! chief complaints, adverse reactions).
//!
//! A label pattern marks where the body begins. The body then absorbs any
//! number of lines until the earliest terminator for that section, or the
//! end of the text. Bodies are never empty: a label with nothing after it
//! is skipped and the next occurrence is tried.

use super::patterns::{FieldId, PatternKind, PatternRegistry};
use super::FieldError;

/// Fields extracted by [`extract_section`].
pub const SECTION_FIELDS: [FieldId; 5] = [
    FieldId::ChiefComplaints,
    FieldId::AdverseReactions,
    FieldId::Diagnosis,
    FieldId::Investigations,
    FieldId::Advice,
];

/// Extract one section as its non-empty, trimmed lines. An absent label
/// yields an empty list.
pub fn extract_section(
    registry: &PatternRegistry,
    field: FieldId,
    text: &str,
) -> Result<Vec<String>, FieldError> {
    let labels = registry.values(field);
    if labels.is_empty() {
        return Err(FieldError::MissingPattern {
            field,
            kind: PatternKind::Value,
        });
    }
    let terminators = registry.terminators(field);

    for label in labels {
        for m in label.regex().find_iter(text) {
            let body_start = m.end();
            let Some(first) = text[body_start..].chars().next() else {
                continue;
            };
            // The body holds at least one character, so a terminator can
            // only begin after it.
            let search_from = body_start + first.len_utf8();
            let body_end = terminators
                .iter()
                .filter_map(|t| t.regex().find_at(text, search_from).map(|tm| tm.start()))
                .min()
                .unwrap_or(text.len());

            tracing::debug!(
                field = %field,
                priority = label.priority(),
                body_len = body_end - body_start,
                "Section label matched"
            );
            return Ok(split_lines(&text[body_start..body_end]));
        }
    }

    Ok(Vec::new())
}

/// Split on newlines, trim, drop blanks.
pub fn split_lines(body: &str) -> Vec<String> {
    body.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

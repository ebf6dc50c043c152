use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{FieldId, PatternKind, PatternRegistry};
use super::FieldError;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Numbered list items (`1)`, `2)`, ...) anywhere in the text.
///
/// Each item runs from its marker to the next marker or the end of the
/// text, so an entry wrapped over several OCR lines is rejoined into one
/// single-spaced line. Entries empty after trimming are dropped. The first
/// marker pattern (by priority) that finds any item is used.
pub fn extract_medications(registry: &PatternRegistry, text: &str) -> Result<Vec<String>, FieldError> {
    let markers = registry.values(FieldId::Medications);
    if markers.is_empty() {
        return Err(FieldError::MissingPattern {
            field: FieldId::Medications,
            kind: PatternKind::Value,
        });
    }

    for marker in markers {
        let spans: Vec<(usize, usize)> = marker
            .regex()
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();
        if spans.is_empty() {
            continue;
        }

        let entries: Vec<String> = spans
            .iter()
            .enumerate()
            .filter_map(|(i, &(_, body_start))| {
                let body_end = spans.get(i + 1).map_or(text.len(), |&(next, _)| next);
                let entry = collapse_whitespace(&text[body_start..body_end]);
                (!entry.is_empty()).then_some(entry)
            })
            .collect();

        tracing::debug!(
            markers = spans.len(),
            entries = entries.len(),
            "Medication list scanned"
        );
        return Ok(entries);
    }

    Ok(Vec::new())
}

fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::patterns::RawPattern;

    fn meds(text: &str) -> Vec<String> {
        extract_medications(&PatternRegistry::builtin().unwrap(), text).unwrap()
    }

    #[test]
    fn two_items_in_source_order() {
        let text = "1) Paracetamol 500mg twice daily\n2) Ibuprofen 200mg";
        assert_eq!(
            meds(text),
            vec!["Paracetamol 500mg twice daily", "Ibuprofen 200mg"]
        );
    }

    #[test]
    fn wrapped_entry_rejoined() {
        let text = "1) Amoxicillin 500mg\n   three times a day\n   for 5 days\n2) Cetirizine 10mg";
        assert_eq!(
            meds(text),
            vec![
                "Amoxicillin 500mg three times a day for 5 days",
                "Cetirizine 10mg"
            ]
        );
    }

    #[test]
    fn items_found_anywhere_in_text() {
        let text = "Rx\nMedicine Name Dosage\n  1) Pantoprazole 40 mg\n  2) Domperidone 10 mg";
        assert_eq!(meds(text), vec!["Pantoprazole 40 mg", "Domperidone 10 mg"]);
    }

    #[test]
    fn last_item_runs_to_end_of_text() {
        let text = "1) ORS sachet\nmix in 1 litre water";
        assert_eq!(meds(text), vec!["ORS sachet mix in 1 litre water"]);
    }

    #[test]
    fn blank_line_between_items() {
        let text = "1) Metformin 500mg\n\n2) Glimepiride 1mg";
        assert_eq!(meds(text), vec!["Metformin 500mg", "Glimepiride 1mg"]);
    }

    #[test]
    fn empty_items_dropped() {
        let text = "1)\n2) Vitamin D3 60000 IU weekly\n3)   ";
        assert_eq!(meds(text), vec!["Vitamin D3 60000 IU weekly"]);
    }

    #[test]
    fn marker_must_start_a_line() {
        assert!(meds("Take 2) tablets after food").is_empty());
    }

    #[test]
    fn multi_digit_numbers() {
        let text = "9) Zinc 20mg\n10) Folic acid 5mg";
        assert_eq!(meds(text), vec!["Zinc 20mg", "Folic acid 5mg"]);
    }

    #[test]
    fn no_list_is_empty() {
        assert!(meds("Diagnosis: fever").is_empty());
    }

    #[test]
    fn fallback_marker_used_when_first_finds_nothing() {
        let registry = PatternRegistry::from_raw(vec![
            RawPattern::value(FieldId::Medications, 0, r"(?m)^\s*\d+\)", &[]),
            RawPattern::value(FieldId::Medications, 1, r"(?m)^\s*\d+\.", &[]),
        ])
        .unwrap();
        let entries = extract_medications(&registry, "1. Aspirin 75mg\n2. Atorvastatin 10mg").unwrap();
        assert_eq!(entries, vec!["Aspirin 75mg", "Atorvastatin 10mg"]);
    }

    #[test]
    fn missing_family_is_field_error() {
        let registry = PatternRegistry::from_raw(Vec::new()).unwrap();
        assert!(extract_medications(&registry, "1) x").is_err());
    }
}

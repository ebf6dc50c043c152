use std::sync::LazyLock;

use regex::Regex;

static HORIZONTAL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Collapse OCR whitespace noise before matching.
///
/// Runs of spaces/tabs become one space; runs of two or more newlines
/// (with any whitespace between them) become exactly one blank line.
/// Single newlines are left alone: several extractors end a capture at
/// the next line break. Idempotent and total.
pub fn normalize(raw: &str) -> String {
    let spaced = HORIZONTAL_RUN.replace_all(raw, " ");
    BLANK_LINE_RUN.replace_all(&spaced, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn collapses_spaces_and_tabs() {
        assert_eq!(normalize("BP:  \t 120 /\t\t80"), "BP: 120 / 80");
    }

    #[test]
    fn collapses_blank_line_runs() {
        assert_eq!(normalize("Diagnosis\n\n\n\nFever"), "Diagnosis\n\nFever");
        assert_eq!(normalize("a\n \t \n  \nb"), "a\n\nb");
    }

    #[test]
    fn preserves_single_newlines() {
        let text = "Line one\nLine two\nLine three";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn idempotent() {
        let samples = [
            "PATIENT (M)   /45Y\n\n\n  Diagnosis:\tViral fever\n \nAdvice - rest",
            "  leading\t\ttabs\n\n",
            "\n\n\n",
            "plain",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn keeps_non_ascii_text() {
        assert_eq!(normalize("Temp:  37.5 °C"), "Temp: 37.5 °C");
    }
}

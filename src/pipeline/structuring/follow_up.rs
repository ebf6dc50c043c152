use super::patterns::{first_capture, FieldId, PatternKind, PatternRegistry, GROUP_DATE};
use super::types::FollowUp;
use super::{FieldError, FieldResult};

/// `Follow Up` date as the literal matched string. No calendar checks:
/// interpretation is left to the consumer.
pub fn extract_follow_up(registry: &PatternRegistry, text: &str) -> FieldResult<FollowUp> {
    let patterns = registry.values(FieldId::FollowUp);
    if patterns.is_empty() {
        return Err(FieldError::MissingPattern {
            field: FieldId::FollowUp,
            kind: PatternKind::Value,
        });
    }

    Ok(first_capture(patterns, text, GROUP_DATE).map(|(date, _)| FollowUp {
        date: Some(date.trim().to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn follow_up(text: &str) -> Option<String> {
        extract_follow_up(&PatternRegistry::builtin().unwrap(), text)
            .unwrap()
            .and_then(|f| f.date)
    }

    #[test]
    fn slash_date_four_digit_year() {
        assert_eq!(follow_up("Follow Up: 12/05/2024").as_deref(), Some("12/05/2024"));
    }

    #[test]
    fn dash_date_two_digit_year() {
        assert_eq!(follow_up("follow up - 03-11-24").as_deref(), Some("03-11-24"));
    }

    #[test]
    fn date_not_validated() {
        assert_eq!(follow_up("FollowUp: 45/13/99").as_deref(), Some("45/13/99"));
    }

    #[test]
    fn label_without_date_is_absent() {
        assert_eq!(follow_up("Follow Up after one week"), None);
    }

    #[test]
    fn no_label_is_absent() {
        assert_eq!(follow_up("12/05/2024"), None);
    }
}

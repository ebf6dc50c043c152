//! Patient identity: age/gender, weight, health-card expiry.

use chrono::NaiveDate;

use super::patterns::{
    first_capture, FieldId, PatternKind, PatternRegistry, GROUP_AGE, GROUP_DATE, GROUP_GENDER,
    GROUP_VALUE,
};
use super::types::{Demographics, Gender, Weight};
use super::{FieldError, FieldResult};

/// Age and gender from the prescription header.
///
/// Pattern families are tried in priority order and the first family that
/// matches anywhere in the text wins; a later family is never consulted
/// once an earlier one has matched. A match missing either group counts
/// as no match.
pub fn extract_age_gender(registry: &PatternRegistry, text: &str) -> FieldResult<Demographics> {
    let patterns = registry.values(FieldId::AgeGender);
    if patterns.is_empty() {
        return Err(FieldError::MissingPattern {
            field: FieldId::AgeGender,
            kind: PatternKind::Value,
        });
    }

    for pattern in patterns {
        for caps in pattern.regex().captures_iter(text) {
            let (Some(age), Some(gender)) = (caps.name(GROUP_AGE), caps.name(GROUP_GENDER)) else {
                continue;
            };
            let Some(gender) = Gender::from_token(gender.as_str()) else {
                continue;
            };
            tracing::debug!(priority = pattern.priority(), "Age/gender matched");
            return Ok(Some(Demographics {
                age: age.as_str().trim().to_string(),
                gender,
            }));
        }
    }

    Ok(None)
}

/// `Weight (Kg): N` → whole kilograms.
pub fn extract_weight(registry: &PatternRegistry, text: &str) -> FieldResult<Weight> {
    let patterns = registry.values(FieldId::Weight);
    if patterns.is_empty() {
        return Err(FieldError::MissingPattern {
            field: FieldId::Weight,
            kind: PatternKind::Value,
        });
    }

    let Some((raw, _)) = first_capture(patterns, text, GROUP_VALUE) else {
        return Ok(None);
    };
    // Whole kilograms: "072" reads as 72.
    let raw = raw.trim();
    raw.parse::<u32>()
        .map(|kg| Some(Weight::from_kilograms(kg)))
        .map_err(|e| FieldError::InvalidValue {
            field: FieldId::Weight,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Health-card expiry (`YYYY/MM/DD` or `YYYY-MM-DD`), calendar-checked.
pub fn extract_health_card_expiry(registry: &PatternRegistry, text: &str) -> FieldResult<NaiveDate> {
    let patterns = registry.values(FieldId::HealthCardExpiry);
    if patterns.is_empty() {
        return Err(FieldError::MissingPattern {
            field: FieldId::HealthCardExpiry,
            kind: PatternKind::Value,
        });
    }

    let Some((raw, _)) = first_capture(patterns, text, GROUP_DATE) else {
        return Ok(None);
    };
    let raw = raw.trim();
    NaiveDate::parse_from_str(&raw.replace('/', "-"), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| FieldError::InvalidValue {
            field: FieldId::HealthCardExpiry,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

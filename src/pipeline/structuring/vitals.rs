use super::patterns::{first_capture, FieldId, PatternKind, PatternRegistry, GROUP_VALUE};
use super::types::{VitalKind, Vitals};
use super::FieldError;

/// Clean a raw vital reading according to its policy.
///
/// - `bp`: every whitespace character removed (`120 / 80` → `120/80`)
/// - `temp`, `spo2`: spaces removed
/// - `pulse`, `rr`: trimmed only
pub fn clean_vital(kind: VitalKind, raw: &str) -> String {
    let raw = raw.trim();
    match kind {
        VitalKind::Bp => raw.chars().filter(|c| !c.is_whitespace()).collect(),
        VitalKind::Temp | VitalKind::Spo2 => raw.replace(' ', ""),
        VitalKind::Pulse | VitalKind::Rr => raw.to_string(),
    }
}

/// Scan for each known vital independently.
///
/// A vital with no match has no key. A vital whose pattern family is not
/// registered is reported in the returned error list and also has no key;
/// it never prevents the other vitals from being read.
pub fn extract_vitals(registry: &PatternRegistry, text: &str) -> (Vitals, Vec<FieldError>) {
    let mut vitals = Vitals::default();
    let mut errors = Vec::new();

    for kind in VitalKind::ALL {
        let field = FieldId::Vital(kind);
        let patterns = registry.values(field);
        if patterns.is_empty() {
            errors.push(FieldError::MissingPattern {
                field,
                kind: PatternKind::Value,
            });
            continue;
        }

        if let Some((raw, _)) = first_capture(patterns, text, GROUP_VALUE) {
            let value = clean_vital(kind, raw);
            if !value.is_empty() {
                vitals.insert(kind, value);
            }
        }
    }

    (vitals, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::patterns::builtin_patterns;

    fn registry() -> PatternRegistry {
        PatternRegistry::builtin().unwrap()
    }

    #[test]
    fn blood_pressure_whitespace_removed() {
        let (vitals, errors) = extract_vitals(&registry(), "BP: 120 / 80 mmHg");
        assert!(errors.is_empty());
        assert_eq!(vitals.get(VitalKind::Bp), Some("120/80"));
        assert_eq!(vitals.len(), 1);
    }

    #[test]
    fn all_five_vitals() {
        let text = "Blood Pressure 130/85\nPulse: 78 bpm\nTemp: 98.6 F\nRR: 18 /min\nSpO2: 97%";
        let (vitals, _) = extract_vitals(&registry(), text);
        assert_eq!(vitals.get(VitalKind::Bp), Some("130/85"));
        assert_eq!(vitals.get(VitalKind::Pulse), Some("78"));
        assert_eq!(vitals.get(VitalKind::Temp), Some("98.6"));
        assert_eq!(vitals.get(VitalKind::Rr), Some("18"));
        assert_eq!(vitals.get(VitalKind::Spo2), Some("97"));
    }

    #[test]
    fn long_labels_and_case() {
        let text = "heart rate 92\ntemperature: 37.2°C\nrespiratory rate: 20\noxygen saturation 95 %";
        let (vitals, _) = extract_vitals(&registry(), text);
        assert_eq!(vitals.get(VitalKind::Pulse), Some("92"));
        assert_eq!(vitals.get(VitalKind::Temp), Some("37.2"));
        assert_eq!(vitals.get(VitalKind::Rr), Some("20"));
        assert_eq!(vitals.get(VitalKind::Spo2), Some("95"));
    }

    #[test]
    fn missing_vitals_have_no_key() {
        let (vitals, errors) = extract_vitals(&registry(), "Pulse 72");
        assert!(errors.is_empty());
        assert_eq!(vitals.len(), 1);
        assert_eq!(vitals.get(VitalKind::Bp), None);
    }

    #[test]
    fn no_vitals_in_plain_text() {
        let (vitals, _) = extract_vitals(&registry(), "Take rest and drink fluids");
        assert!(vitals.is_empty());
    }

    #[test]
    fn unregistered_vital_reported_others_still_read() {
        let registry = PatternRegistry::from_raw(
            builtin_patterns()
                .into_iter()
                .filter(|p| p.field != FieldId::Vital(VitalKind::Temp)),
        )
        .unwrap();
        let (vitals, errors) = extract_vitals(&registry, "BP 110/70 Temp 99.1");
        assert_eq!(vitals.get(VitalKind::Bp), Some("110/70"));
        assert_eq!(vitals.get(VitalKind::Temp), None);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            FieldError::MissingPattern { field: FieldId::Vital(VitalKind::Temp), .. }
        ));
    }

    #[test]
    fn cleanup_policies() {
        assert_eq!(clean_vital(VitalKind::Bp, " 120 /\n80 "), "120/80");
        assert_eq!(clean_vital(VitalKind::Temp, "98. 6"), "98.6");
        assert_eq!(clean_vital(VitalKind::Spo2, "9 7"), "97");
        assert_eq!(clean_vital(VitalKind::Pulse, " 7 2 "), "7 2");
    }
}

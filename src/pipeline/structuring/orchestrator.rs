use std::sync::{Arc, LazyLock};

use super::follow_up::extract_follow_up;
use super::medications::extract_medications;
use super::normalize::normalize;
use super::patient::{extract_age_gender, extract_health_card_expiry, extract_weight};
use super::patterns::{FieldId, PatternRegistry};
use super::sections::{extract_section, SECTION_FIELDS};
use super::types::ExtractedDocument;
use super::vitals::extract_vitals;
use super::{FieldError, FieldResult, PatternError, StructuringError};

/// Assembles an [`ExtractedDocument`] from a raw OCR transcript.
///
/// Stateless per call and `Send + Sync`: one instance can serve any number
/// of concurrent extractions.
#[derive(Debug, Clone)]
pub struct MedicalDataExtractor {
    registry: Arc<PatternRegistry>,
}

impl MedicalDataExtractor {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    pub fn with_builtin_patterns() -> Result<Self, PatternError> {
        Ok(Self::new(Arc::new(PatternRegistry::builtin()?)))
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Extract a document from any transcript.
    ///
    /// A transcript with nothing recognizable still yields a document
    /// (with every field empty). Once the registry exists nothing can fail
    /// as a whole, so this is always `Some`; `None` only comes from
    /// [`extract_medical_data`] when the built-in registry is unavailable.
    pub fn extract_medical_data(&self, raw_text: &str) -> Option<ExtractedDocument> {
        Some(self.extract(raw_text))
    }

    /// Run every field extractor over the normalized text. Field-level
    /// failures are logged and the field is left empty.
    pub fn extract(&self, raw_text: &str) -> ExtractedDocument {
        let text = normalize(raw_text);
        let registry = &*self.registry;
        let mut doc = ExtractedDocument::default();

        doc.patient.demographics = settle(FieldId::AgeGender, extract_age_gender(registry, &text));
        doc.patient.weight = settle(FieldId::Weight, extract_weight(registry, &text));
        doc.patient.health_card_expiry = settle(
            FieldId::HealthCardExpiry,
            extract_health_card_expiry(registry, &text),
        );

        let (vitals, vital_errors) = extract_vitals(registry, &text);
        for e in &vital_errors {
            tracing::warn!(error = %e, "Vital extraction failed, omitting");
        }
        doc.vitals = vitals;

        for field in SECTION_FIELDS {
            let lines = settle_list(field, extract_section(registry, field, &text));
            match field {
                FieldId::ChiefComplaints => doc.chief_complaints = lines,
                FieldId::AdverseReactions => doc.adverse_reactions = lines,
                FieldId::Diagnosis => doc.diagnosis = lines,
                FieldId::Investigations => doc.investigations = lines,
                FieldId::Advice => doc.advice = lines,
                _ => {}
            }
        }

        doc.medications = settle_list(FieldId::Medications, extract_medications(registry, &text));
        doc.follow_up = settle(FieldId::FollowUp, extract_follow_up(registry, &text)).unwrap_or_default();

        tracing::debug!(
            input_bytes = raw_text.len(),
            populated = doc.populated_fields(),
            medications = doc.medications.len(),
            vitals = doc.vitals.len(),
            "Structured extraction complete"
        );

        doc
    }
}

/// Downgrade a field failure to an omission.
fn settle<T>(field: FieldId, outcome: FieldResult<T>) -> Option<T> {
    match outcome {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(field = %field, error = %e, "Field extraction failed, omitting");
            None
        }
    }
}

fn settle_list(field: FieldId, outcome: Result<Vec<String>, FieldError>) -> Vec<String> {
    settle(field, outcome.map(Some)).unwrap_or_default()
}

static BUILTIN_EXTRACTOR: LazyLock<Result<MedicalDataExtractor, PatternError>> =
    LazyLock::new(MedicalDataExtractor::with_builtin_patterns);

/// Extract with the built-in pattern set, shared process-wide.
///
/// Callers that need their own rules construct a [`MedicalDataExtractor`]
/// around a custom [`PatternRegistry`] instead.
pub fn extract_medical_data(raw_text: &str) -> Option<ExtractedDocument> {
    match &*BUILTIN_EXTRACTOR {
        Ok(extractor) => extractor.extract_medical_data(raw_text),
        Err(e) => {
            tracing::error!(
                error = %StructuringError::from(e.clone()),
                "Built-in pattern registry unavailable"
            );
            None
        }
    }
}

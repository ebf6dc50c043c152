//! Structured medical-data extraction from OCR transcripts.
//!
//! Normalised text flows through independent field extractors (patient,
//! vitals, narrative sections, medications, follow-up). Each extractor
//! consults the [`PatternRegistry`] in priority order and reports
//! present / absent / failed; the orchestrator downgrades failures to
//! omissions so one bad field never costs the whole record.

pub mod types;
pub mod patterns;
pub mod normalize;
pub mod patient;
pub mod vitals;
pub mod sections;
pub mod medications;
pub mod follow_up;
pub mod orchestrator;

pub use types::*;
pub use patterns::*;
pub use normalize::normalize;
pub use orchestrator::*;

use thiserror::Error;

/// Registry construction failures. Fatal for the registry being built.
#[derive(Error, Debug, Clone)]
pub enum PatternError {
    #[error("Invalid regex for {field}: {source}")]
    InvalidRegex {
        field: FieldId,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern for {field} declares capture group '{group}' that the regex does not define")]
    UndeclaredGroup { field: FieldId, group: String },

    #[error("Duplicate {kind:?} pattern for {field} at priority {priority}")]
    DuplicatePriority {
        field: FieldId,
        kind: PatternKind,
        priority: u8,
    },
}

/// Recoverable, per-field failure. Never surfaced to callers: the
/// orchestrator logs it and leaves the field empty.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("No {kind:?} patterns registered for {field}")]
    MissingPattern { field: FieldId, kind: PatternKind },

    #[error("Rejected value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: FieldId,
        value: String,
        reason: String,
    },
}

/// Outcome of a single field extractor: `Ok(Some)` present, `Ok(None)`
/// absent, `Err` failed.
pub type FieldResult<T> = Result<Option<T>, FieldError>;

/// Systemic failure: no extraction can run, so no document is produced.
#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Pattern registry unavailable: {0}")]
    Registry(#[from] PatternError),
}

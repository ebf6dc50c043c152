//! Pattern registry: the named extraction rules for every field family.
//!
//! Built once, immutable afterwards, shared by reference (or `Arc`) across
//! any number of concurrent extractions. Tests substitute their own rule
//! sets through [`PatternRegistry::from_raw`].

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use super::types::VitalKind;
use super::PatternError;

pub const GROUP_AGE: &str = "age";
pub const GROUP_GENDER: &str = "gender";
pub const GROUP_VALUE: &str = "value";
pub const GROUP_DATE: &str = "date";

/// Field family a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FieldId {
    AgeGender,
    Weight,
    HealthCardExpiry,
    Vital(VitalKind),
    ChiefComplaints,
    AdverseReactions,
    Diagnosis,
    Investigations,
    Advice,
    Medications,
    FollowUp,
}

impl FieldId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgeGender => "patient.age_gender",
            Self::Weight => "patient.weight",
            Self::HealthCardExpiry => "patient.health_card_expiry",
            Self::Vital(VitalKind::Bp) => "vitals.bp",
            Self::Vital(VitalKind::Pulse) => "vitals.pulse",
            Self::Vital(VitalKind::Temp) => "vitals.temp",
            Self::Vital(VitalKind::Rr) => "vitals.rr",
            Self::Vital(VitalKind::Spo2) => "vitals.spo2",
            Self::ChiefComplaints => "chief_complaints",
            Self::AdverseReactions => "adverse_reactions",
            Self::Diagnosis => "diagnosis",
            Self::Investigations => "investigations",
            Self::Advice => "advice",
            Self::Medications => "medications",
            Self::FollowUp => "follow_up",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a pattern within its field family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PatternKind {
    /// Locates the value (or the label that introduces a section body).
    Value,
    /// Marks where a section body stops.
    Terminator,
}

/// One uncompiled extraction rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPattern {
    pub field: FieldId,
    pub kind: PatternKind,
    /// Lower runs first among siblings of the same field and kind.
    pub priority: u8,
    pub pattern: String,
    /// Named capture groups the extractor will read.
    pub groups: Vec<String>,
}

impl RawPattern {
    pub fn value(field: FieldId, priority: u8, pattern: &str, groups: &[&str]) -> Self {
        Self {
            field,
            kind: PatternKind::Value,
            priority,
            pattern: pattern.to_string(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub fn terminator(field: FieldId, priority: u8, pattern: &str) -> Self {
        Self {
            field,
            kind: PatternKind::Terminator,
            priority,
            pattern: pattern.to_string(),
            groups: Vec::new(),
        }
    }
}

/// A validated, compiled rule.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    field: FieldId,
    kind: PatternKind,
    priority: u8,
    regex: Regex,
}

impl CompiledPattern {
    pub fn field(&self) -> FieldId {
        self.field
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Immutable catalogue of compiled patterns, grouped by field and kind,
/// each group sorted by ascending priority.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    groups: BTreeMap<(FieldId, PatternKind), Vec<CompiledPattern>>,
}

impl PatternRegistry {
    /// Registry holding the built-in prescription rules.
    pub fn builtin() -> Result<Self, PatternError> {
        Self::from_raw(builtin_patterns())
    }

    /// Compile and validate an arbitrary rule set.
    pub fn from_raw<I>(raw: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = RawPattern>,
    {
        let mut groups: BTreeMap<(FieldId, PatternKind), Vec<CompiledPattern>> = BTreeMap::new();

        for rp in raw {
            let regex = Regex::new(&rp.pattern).map_err(|source| PatternError::InvalidRegex {
                field: rp.field,
                source,
            })?;

            if let Some(group) = rp
                .groups
                .iter()
                .find(|g| !regex.capture_names().flatten().any(|name| name == g.as_str()))
            {
                return Err(PatternError::UndeclaredGroup {
                    field: rp.field,
                    group: group.clone(),
                });
            }

            let siblings = groups.entry((rp.field, rp.kind)).or_default();
            if siblings.iter().any(|p| p.priority == rp.priority) {
                return Err(PatternError::DuplicatePriority {
                    field: rp.field,
                    kind: rp.kind,
                    priority: rp.priority,
                });
            }
            siblings.push(CompiledPattern {
                field: rp.field,
                kind: rp.kind,
                priority: rp.priority,
                regex,
            });
        }

        for siblings in groups.values_mut() {
            siblings.sort_by_key(|p| p.priority);
        }

        Ok(Self { groups })
    }

    /// Patterns for `field` of the given kind, in priority order.
    /// Empty when the family is not registered.
    pub fn patterns(&self, field: FieldId, kind: PatternKind) -> &[CompiledPattern] {
        self.groups
            .get(&(field, kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn values(&self, field: FieldId) -> &[CompiledPattern] {
        self.patterns(field, PatternKind::Value)
    }

    pub fn terminators(&self, field: FieldId) -> &[CompiledPattern] {
        self.patterns(field, PatternKind::Terminator)
    }

    /// Total number of compiled patterns.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// First capture of `group` across `patterns`, trying them in priority
/// order. The first pattern to match anywhere wins for the whole text.
pub fn first_capture<'t>(
    patterns: &[CompiledPattern],
    text: &'t str,
    group: &str,
) -> Option<(&'t str, u8)> {
    patterns.iter().find_map(|p| {
        p.regex()
            .captures_iter(text)
            .find_map(|caps| caps.name(group))
            .map(|m| (m.as_str(), p.priority()))
    })
}

/// The built-in rule set for prescription transcripts.
pub fn builtin_patterns() -> Vec<RawPattern> {
    use FieldId::*;

    vec![
        // ── Patient identity ──
        // Bracketed header form claims the text before the looser comma form is tried.
        RawPattern::value(
            AgeGender,
            0,
            r"PATIENT\s*\(\s*(?P<gender>M|F|Male|Female)\s*\)\s*/\s*(?P<age>\d{1,3})Y\b",
            &[GROUP_AGE, GROUP_GENDER],
        ),
        RawPattern::value(
            AgeGender,
            1,
            r",\s*(?P<age>\d{1,3})\s*/\s*(?P<gender>M|F|Male|Female)\b",
            &[GROUP_AGE, GROUP_GENDER],
        ),
        RawPattern::value(Weight, 0, r"(?i)Weight\s*\(Kg\)\s*:\s*(?P<value>\d+)", &[GROUP_VALUE]),
        RawPattern::value(
            HealthCardExpiry,
            0,
            r"(?i)Health\s*Card[:\s]*Exp[:\s]*(?P<date>\d{4}[/\-]\d{2}[/\-]\d{2})",
            &[GROUP_DATE],
        ),
        // ── Vitals ──
        RawPattern::value(
            Vital(VitalKind::Bp),
            0,
            r"(?i)(?:BP|Blood\s*Pressure)[\s:]*(?P<value>\d{2,3}\s*/\s*\d{2,3})\s*(?:mmHg)?",
            &[GROUP_VALUE],
        ),
        RawPattern::value(
            Vital(VitalKind::Pulse),
            0,
            r"(?i)(?:Pulse|Heart\s*Rate)[\s:]*(?P<value>\d{2,3})\s*(?:bpm)?",
            &[GROUP_VALUE],
        ),
        RawPattern::value(
            Vital(VitalKind::Temp),
            0,
            r"(?i)(?:Temp|Temperature)[\s:]*(?P<value>\d{2}\.?\d*)\s*°?[CF]?",
            &[GROUP_VALUE],
        ),
        RawPattern::value(
            Vital(VitalKind::Rr),
            0,
            r"(?i)(?:RR|Respiratory\s*Rate)[\s:]*(?P<value>\d{2})\s*(?:/min)?",
            &[GROUP_VALUE],
        ),
        RawPattern::value(
            Vital(VitalKind::Spo2),
            0,
            r"(?i)(?:SpO2|Oxygen\s*Saturation)[\s:]*(?P<value>\d{2,3})\s*%?",
            &[GROUP_VALUE],
        ),
        // ── Narrative sections: label, then where the body stops ──
        RawPattern::value(ChiefComplaints, 0, r"(?i)Chief\s*Complaints[:\s-]+", &[]),
        RawPattern::terminator(ChiefComplaints, 0, r"\n"),
        RawPattern::value(AdverseReactions, 0, r"(?i)Adverse\s*Reactions[\s:]+", &[]),
        RawPattern::terminator(AdverseReactions, 0, r"\n"),
        RawPattern::value(Diagnosis, 0, r"(?i)Diagnosis[:\s-]+", &[]),
        RawPattern::terminator(Diagnosis, 0, r"\n\s*\n"),
        RawPattern::terminator(Diagnosis, 1, r"(?i)Medicine Name"),
        RawPattern::value(Investigations, 0, r"(?i)(?:Investigations|Tests)[:\s-]+", &[]),
        RawPattern::terminator(Investigations, 0, r"\n\s*\n"),
        RawPattern::terminator(Investigations, 1, r"(?i)Medicine|Advice"),
        RawPattern::value(Advice, 0, r"(?i)Advice[:\s-]+", &[]),
        RawPattern::terminator(Advice, 0, r"\n\s*\n"),
        RawPattern::terminator(Advice, 1, r"(?i)\n\s*(?:Follow\s*Up|Next\s*Visit)"),
        // ── Medications: numbered list items anywhere in the text ──
        RawPattern::value(Medications, 0, r"(?m)^\s*\d+\)", &[]),
        // ── Follow-up ──
        RawPattern::value(
            FollowUp,
            0,
            r"(?i)Follow\s*Up[:\s-]+(?P<date>\d{2}[/\-]\d{2}[/\-]\d{2,4})",
            &[GROUP_DATE],
        ),
    ]
}

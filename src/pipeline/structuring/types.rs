use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Structured clinical record assembled from one OCR transcript.
///
/// Every constituent is independently present or absent. `patient`,
/// `vitals` and `follow_up` always serialize as (possibly empty) objects,
/// and every sequence always serializes as a (possibly empty) array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub patient: PatientInfo,
    pub vitals: Vitals,
    pub chief_complaints: Vec<String>,
    pub adverse_reactions: Vec<String>,
    pub diagnosis: Vec<String>,
    pub medications: Vec<String>,
    pub investigations: Vec<String>,
    pub advice: Vec<String>,
    pub follow_up: FollowUp,
}

impl ExtractedDocument {
    /// Number of top-level fields carrying at least one value.
    pub fn populated_fields(&self) -> usize {
        let sequences = [
            &self.chief_complaints,
            &self.adverse_reactions,
            &self.diagnosis,
            &self.medications,
            &self.investigations,
            &self.advice,
        ];
        usize::from(!self.patient.is_empty())
            + usize::from(!self.vitals.is_empty())
            + usize::from(self.follow_up.date.is_some())
            + sequences.iter().filter(|s| !s.is_empty()).count()
    }

    /// True when no extractor contributed anything.
    pub fn is_empty(&self) -> bool {
        self.populated_fields() == 0
    }
}

/// Patient identity block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    /// Age and gender are captured together or not at all.
    #[serde(flatten)]
    pub demographics: Option<Demographics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_card_expiry: Option<NaiveDate>,
}

impl PatientInfo {
    pub fn is_empty(&self) -> bool {
        self.demographics.is_none() && self.weight.is_none() && self.health_card_expiry.is_none()
    }

    pub fn age(&self) -> Option<&str> {
        self.demographics.as_ref().map(|d| d.age.as_str())
    }

    pub fn gender(&self) -> Option<Gender> {
        self.demographics.as_ref().map(|d| d.gender)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    /// Map a prescription-header token (`M`, `F`, `Male`, `Female`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "M" | "Male" => Some(Self::M),
            "F" | "Female" => Some(Self::F),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
        }
    }
}

/// Body weight in whole kilograms. Serialized as `"N kg"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weight(u32);

impl Weight {
    pub fn from_kilograms(kg: u32) -> Self {
        Self(kg)
    }

    pub fn kilograms(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .trim_end_matches("kg")
            .trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|e| serde::de::Error::custom(format!("invalid weight '{raw}': {e}")))
    }
}

/// The five vitals a prescription header may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalKind {
    Bp,
    Pulse,
    Temp,
    Rr,
    Spo2,
}

impl VitalKind {
    pub const ALL: [VitalKind; 5] = [
        VitalKind::Bp,
        VitalKind::Pulse,
        VitalKind::Temp,
        VitalKind::Rr,
        VitalKind::Spo2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bp => "bp",
            Self::Pulse => "pulse",
            Self::Temp => "temp",
            Self::Rr => "rr",
            Self::Spo2 => "spo2",
        }
    }
}

impl fmt::Display for VitalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vital name → cleaned reading. Absent vitals have no key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vitals(BTreeMap<VitalKind, String>);

impl Vitals {
    pub fn get(&self, kind: VitalKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    pub fn insert(&mut self, kind: VitalKind, value: String) {
        self.0.insert(kind, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VitalKind, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Next appointment. The date is the literal matched string, unparsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

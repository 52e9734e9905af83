//! Local risk classification
//!
//! Risk is a fixed sum of threshold points per condition, compared against a
//! per-condition cut-off. There is no model involved. The scores read the same
//! [`InputRecord`] that later grounds the explanation prompt, so the prompt and
//! the classification always agree on the inputs.

mod profile;

pub use profile::{BmiCategory, HealthProfile};

use crate::prompt::InputRecord;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while scoring an input record
#[derive(Debug, Error, PartialEq)]
pub enum AssessmentError {
    #[error("missing required field '{field}' for {condition} assessment")]
    MissingField { condition: Condition, field: String },

    #[error("field '{field}' must be numeric, got '{value}'")]
    NotNumeric { field: String, value: String },

    #[error("unknown condition '{0}' (expected diabetes, heart or parkinsons)")]
    UnknownCondition(String),
}

/// Conditions the tool can assess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Diabetes,
    HeartDisease,
    Parkinsons,
}

impl Condition {
    pub const ALL: [Condition; 3] = [
        Condition::Diabetes,
        Condition::HeartDisease,
        Condition::Parkinsons,
    ];

    /// Human-readable name used in prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Condition::Diabetes => "Diabetes",
            Condition::HeartDisease => "Heart Disease",
            Condition::Parkinsons => "Parkinsons Disease",
        }
    }

    /// Short identifier
    pub fn key(&self) -> &'static str {
        match self {
            Condition::Diabetes => "diabetes",
            Condition::HeartDisease => "heart",
            Condition::Parkinsons => "parkinsons",
        }
    }

    /// Total score at which the assessment is classified high risk
    pub fn high_risk_threshold(&self) -> u32 {
        match self {
            Condition::Diabetes => 4,
            Condition::HeartDisease => 5,
            Condition::Parkinsons => 4,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Condition {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diabetes" => Ok(Condition::Diabetes),
            "heart" | "heart-disease" | "heart_disease" => Ok(Condition::HeartDisease),
            "parkinsons" | "parkinson" => Ok(Condition::Parkinsons),
            _ => Err(AssessmentError::UnknownCondition(s.to_string())),
        }
    }
}

/// Outcome of scoring one record
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub condition: Condition,
    pub score: u32,
    pub threshold: u32,
    pub high_risk: bool,
    /// Points contributed by each scored field, in scoring order
    pub contributions: Vec<(&'static str, u32)>,
}

impl RiskAssessment {
    /// `HIGH RISK` or `LOW RISK`
    pub fn label(&self) -> &'static str {
        risk_label(self.high_risk)
    }
}

/// Prompt and display label for a classification
pub fn risk_label(high_risk: bool) -> &'static str {
    if high_risk {
        "HIGH RISK"
    } else {
        "LOW RISK"
    }
}

/// Score `record` for `condition`.
pub fn assess(condition: Condition, record: &InputRecord) -> Result<RiskAssessment, AssessmentError> {
    let field = |name: &'static str| numeric_field(condition, record, name);

    let contributions: Vec<(&'static str, u32)> = match condition {
        Condition::Diabetes => {
            let glucose = field("glucose")?;
            let bmi = field("bmi")?;
            let age = field("age")?;
            let pedigree = field("pedigree")?;
            let insulin = field("insulin")?;
            vec![
                ("glucose", tiered(glucose, 140.0, 100.0)),
                ("bmi", tiered(bmi, 30.0, 25.0)),
                ("age", points(age > 45.0, 1)),
                ("pedigree", points(pedigree > 0.5, 1)),
                ("insulin", points(!(16.0..=166.0).contains(&insulin), 1)),
            ]
        }
        Condition::HeartDisease => {
            let age = field("age")?;
            let chol = field("chol")?;
            let trestbps = field("trestbps")?;
            let cp = field("cp")?;
            let exang = field("exang")?;
            let oldpeak = field("oldpeak")?;
            vec![
                ("age", tiered(age, 55.0, 45.0)),
                ("chol", tiered(chol, 240.0, 200.0)),
                ("trestbps", tiered(trestbps, 140.0, 120.0)),
                ("cp", points(cp > 0.0, 1)),
                ("exang", points(exang == 1.0, 2)),
                ("oldpeak", tiered(oldpeak, 2.0, 1.0)),
            ]
        }
        Condition::Parkinsons => {
            let jitter = field("jitterPercent")?;
            let shimmer = field("shimmer")?;
            let hnr = field("hnr")?;
            let rpde = field("rpde")?;
            let ppe = field("ppe")?;
            vec![
                ("jitterPercent", points(jitter > 0.01, 2)),
                ("shimmer", points(shimmer > 0.05, 2)),
                ("hnr", points(hnr < 20.0, 2)),
                ("rpde", points(rpde > 0.6, 1)),
                ("ppe", points(ppe > 0.3, 2)),
            ]
        }
    };

    let score = contributions.iter().map(|(_, p)| p).sum();
    let threshold = condition.high_risk_threshold();

    Ok(RiskAssessment {
        condition,
        score,
        threshold,
        high_risk: score >= threshold,
        contributions,
    })
}

fn numeric_field(
    condition: Condition,
    record: &InputRecord,
    name: &'static str,
) -> Result<f64, AssessmentError> {
    let value = record.get(name).ok_or_else(|| AssessmentError::MissingField {
        condition,
        field: name.to_string(),
    })?;

    value.as_number().ok_or_else(|| AssessmentError::NotNumeric {
        field: name.to_string(),
        value: value.to_string(),
    })
}

/// 2 points above `high`, 1 above `elevated`, else 0
fn tiered(value: f64, high: f64, elevated: f64) -> u32 {
    if value > high {
        2
    } else if value > elevated {
        1
    } else {
        0
    }
}

fn points(condition: bool, weight: u32) -> u32 {
    if condition {
        weight
    } else {
        0
    }
}

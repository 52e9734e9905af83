//! Personal profile for the health planner

use crate::prompt::InputRecord;
use std::fmt;

/// BMI bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        };
        f.write_str(name)
    }
}

/// Lifestyle profile the planner works from
#[derive(Debug, Clone, PartialEq)]
pub struct HealthProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub sex: String,
    pub activity_level: String,
    pub dietary_preference: String,
    pub fitness_goal: String,
}

impl Default for HealthProfile {
    fn default() -> Self {
        Self {
            age: 50,
            weight_kg: 70.0,
            height_cm: 175.0,
            sex: "Male".to_string(),
            activity_level: "Moderately Active".to_string(),
            dietary_preference: "Balanced".to_string(),
            fitness_goal: "Stay Fit".to_string(),
        }
    }
}

impl HealthProfile {
    /// Body mass index, weight in kg over height in metres squared.
    /// `None` when the height is not positive.
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.height_cm / 100.0;
        if height_m <= 0.0 || !height_m.is_finite() {
            return None;
        }
        Some(self.weight_kg / (height_m * height_m))
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }

    /// The profile as planner input, including the derived BMI fields.
    pub fn to_record(&self) -> InputRecord {
        let mut record = InputRecord::new()
            .with("age", self.age)
            .with("weight", self.weight_kg)
            .with("height", self.height_cm)
            .with("sex", self.sex.as_str());

        if let Some(bmi) = self.bmi() {
            record.insert("bmi", (bmi * 10.0).round() / 10.0);
            record.insert("bmiCategory", BmiCategory::from_bmi(bmi).to_string());
        }

        record
            .with("activityLevel", self.activity_level.as_str())
            .with("dietaryPreferences", self.dietary_preference.as_str())
            .with("fitnessGoals", self.fitness_goal.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::FieldValue;

    #[test]
    fn test_bmi_and_category() {
        let profile = HealthProfile::default();
        let bmi = profile.bmi().unwrap();
        assert!((bmi - 22.857).abs() < 0.001);
        assert_eq!(profile.bmi_category(), Some(BmiCategory::Normal));

        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_zero_height_has_no_bmi() {
        let profile = HealthProfile {
            height_cm: 0.0,
            ..Default::default()
        };
        assert_eq!(profile.bmi(), None);
        assert!(!profile.to_record().contains("bmi"));
    }

    #[test]
    fn test_record_rounds_bmi() {
        let record = HealthProfile::default().to_record();
        assert_eq!(record.get("bmi"), Some(&FieldValue::Number(22.9)));
        assert_eq!(record.get("bmiCategory"), Some(&FieldValue::from("Normal")));
        assert_eq!(record.len(), 9);
    }
}

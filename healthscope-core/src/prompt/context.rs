//! Fixed grounding contexts
//!
//! Dataset descriptions, feature meanings and clinical thresholds for each
//! condition, plus the profile schema used by the health planner. These are
//! the only facts the prompts assert; everything else comes from the caller's
//! input record.

use crate::assessment::Condition;

/// A named band within a threshold table, e.g. `("normal", "<140")`
pub type Band = (&'static str, &'static str);

/// Description of a reference dataset
#[derive(Debug)]
pub struct DatasetContext {
    pub name: &'static str,
    pub description: &'static str,
    /// Feature key and description, in presentation order
    pub features: &'static [(&'static str, &'static str)],
    /// Measure name and its bands, in presentation order
    pub thresholds: &'static [(&'static str, &'static [Band])],
}

impl DatasetContext {
    /// The grounding context for `condition`
    pub fn for_condition(condition: Condition) -> &'static DatasetContext {
        match condition {
            Condition::Diabetes => &DIABETES,
            Condition::HeartDisease => &HEART_DISEASE,
            Condition::Parkinsons => &PARKINSONS,
        }
    }

    pub fn feature(&self, key: &str) -> Option<&'static str> {
        self.features
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, description)| *description)
    }
}

/// One field of the planner's profile schema
#[derive(Debug)]
pub struct ProfileField {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
}

/// Labels and units for the planner's profile fields
pub static PROFILE_SCHEMA: &[ProfileField] = &[
    ProfileField { key: "age", label: "Age", unit: Some("years") },
    ProfileField { key: "weight", label: "Weight", unit: Some("kg") },
    ProfileField { key: "height", label: "Height", unit: Some("cm") },
    ProfileField { key: "sex", label: "Sex", unit: None },
    ProfileField { key: "bmi", label: "BMI", unit: None },
    ProfileField { key: "bmiCategory", label: "BMI Category", unit: None },
    ProfileField { key: "activityLevel", label: "Activity Level", unit: None },
    ProfileField { key: "dietaryPreferences", label: "Dietary Preference", unit: None },
    ProfileField { key: "fitnessGoals", label: "Fitness Goal", unit: None },
];

pub fn profile_field(key: &str) -> Option<&'static ProfileField> {
    PROFILE_SCHEMA.iter().find(|field| field.key == key)
}

pub static DIABETES: DatasetContext = DatasetContext {
    name: "Pima Indians Diabetes Database",
    description: "Originally from the National Institute of Diabetes and Digestive and Kidney Diseases. Contains 768 records of female patients of Pima Indian heritage.",
    features: &[
        ("pregnancies", "Number of times pregnant (0-17)"),
        ("glucose", "Plasma glucose concentration after 2-hour oral glucose tolerance test (0-199 mg/dL)"),
        ("bloodPressure", "Diastolic blood pressure (0-122 mm Hg)"),
        ("skinThickness", "Triceps skin fold thickness (0-99 mm)"),
        ("insulin", "2-Hour serum insulin (0-846 mu U/ml)"),
        ("bmi", "Body mass index - weight in kg/(height in m)^2 (0-67.1)"),
        ("pedigree", "Diabetes pedigree function - genetic predisposition score (0.078-2.42)"),
        ("age", "Age in years (21-81)"),
    ],
    thresholds: &[
        ("glucose", &[("normal", "<140"), ("prediabetes", "140-199"), ("diabetes", ">=200")]),
        ("bmi", &[("underweight", "<18.5"), ("normal", "18.5-24.9"), ("overweight", "25-29.9"), ("obese", ">=30")]),
        ("bloodPressure", &[("normal", "<80"), ("elevated", "80-89"), ("high", ">=90")]),
    ],
};

pub static HEART_DISEASE: DatasetContext = DatasetContext {
    name: "Cleveland Heart Disease Dataset",
    description: "From the UCI Machine Learning Repository. Contains 303 records with 14 attributes for heart disease prediction.",
    features: &[
        ("age", "Age in years (29-77)"),
        ("sex", "Sex (0 = female, 1 = male)"),
        ("cp", "Chest pain type (0=typical angina, 1=atypical, 2=non-anginal, 3=asymptomatic)"),
        ("trestbps", "Resting blood pressure in mm Hg (94-200)"),
        ("chol", "Serum cholesterol in mg/dl (126-564)"),
        ("fbs", "Fasting blood sugar > 120 mg/dl (0 = false, 1 = true)"),
        ("restecg", "Resting ECG results (0=normal, 1=ST-T abnormality, 2=LV hypertrophy)"),
        ("thalach", "Maximum heart rate achieved (71-202 bpm)"),
        ("exang", "Exercise induced angina (0 = no, 1 = yes)"),
        ("oldpeak", "ST depression induced by exercise relative to rest (0-6.2)"),
        ("slope", "Slope of peak exercise ST segment (0=downsloping, 1=flat, 2=upsloping)"),
        ("ca", "Number of major vessels colored by fluoroscopy (0-4)"),
        ("thal", "Thalassemia (0=normal, 1=fixed defect, 2=reversible defect, 3=unknown)"),
    ],
    thresholds: &[
        ("cholesterol", &[("desirable", "<200"), ("borderline", "200-239"), ("high", ">=240")]),
        ("bloodPressure", &[("normal", "<120"), ("elevated", "120-129"), ("high", ">=130")]),
        ("heartRate", &[("low", "<60"), ("normal", "60-100"), ("high", ">100")]),
    ],
};

pub static PARKINSONS: DatasetContext = DatasetContext {
    name: "Parkinsons Voice Dataset",
    description: "From UCI ML Repository. Contains 195 voice recordings from 31 people, 23 with Parkinsons disease. Uses biomedical voice measurements.",
    features: &[
        ("fo", "MDVP:Fo(Hz) - Average vocal fundamental frequency"),
        ("fhi", "MDVP:Fhi(Hz) - Maximum vocal fundamental frequency"),
        ("flo", "MDVP:Flo(Hz) - Minimum vocal fundamental frequency"),
        ("jitterPercent", "MDVP:Jitter(%) - Frequency variation percentage"),
        ("jitterAbs", "MDVP:Jitter(Abs) - Absolute jitter in microseconds"),
        ("rap", "MDVP:RAP - Relative average perturbation"),
        ("ppq", "MDVP:PPQ - Five-point period perturbation quotient"),
        ("shimmer", "MDVP:Shimmer - Amplitude variation"),
        ("shimmerDb", "MDVP:Shimmer(dB) - Shimmer in decibels"),
        ("nhr", "NHR - Noise-to-harmonics ratio"),
        ("hnr", "HNR - Harmonics-to-noise ratio"),
        ("rpde", "RPDE - Recurrence period density entropy"),
        ("dfa", "DFA - Detrended fluctuation analysis"),
        ("spread1", "spread1 - Nonlinear dynamical complexity"),
        ("spread2", "spread2 - Nonlinear dynamical complexity"),
        ("d2", "D2 - Correlation dimension"),
        ("ppe", "PPE - Pitch period entropy"),
    ],
    thresholds: &[
        ("hnr", &[("healthy", ">20"), ("concerning", "15-20"), ("abnormal", "<15")]),
        ("jitter", &[("healthy", "<0.01"), ("concerning", "0.01-0.02"), ("abnormal", ">0.02")]),
        ("shimmer", &[("healthy", "<0.04"), ("concerning", "0.04-0.08"), ("abnormal", ">0.08")]),
    ],
};

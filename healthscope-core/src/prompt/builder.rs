//! Prompt assembly

use super::context::{profile_field, DatasetContext};
use super::record::InputRecord;
use crate::assessment::{risk_label, Condition};
use crate::config::{GenerationParams, HealthscopeConfig};
use crate::protocol::CompletionRequest;
use std::fmt::Write;

/// What the completion is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Explain a local risk classification for one condition
    RiskExplanation { condition: Condition, high_risk: bool },
    /// Produce a personalised diet and fitness plan
    HealthPlan,
}

/// Model and sampling parameters applied to every built request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model_id: String,
    pub streaming: bool,
    pub explanation: GenerationParams,
    pub health_plan: GenerationParams,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_config(&HealthscopeConfig::default())
    }
}

impl GenerationSettings {
    pub fn from_config(config: &HealthscopeConfig) -> Self {
        Self {
            model_id: config.model.id.clone(),
            streaming: config.model.streaming,
            explanation: config.generation.explanation,
            health_plan: config.generation.health_plan,
        }
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    fn params(&self, domain: &Domain) -> GenerationParams {
        match domain {
            Domain::RiskExplanation { .. } => self.explanation,
            Domain::HealthPlan => self.health_plan,
        }
    }
}

/// Builds grounded completion requests.
///
/// Output depends only on the settings, the domain and the record: no I/O,
/// no clock, no randomness. The user prompt lists exactly the fields present
/// in the record, in record order.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    settings: GenerationSettings,
}

impl RequestBuilder {
    pub fn new(settings: GenerationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn build(&self, domain: &Domain, record: &InputRecord) -> CompletionRequest {
        let (system_prompt, user_prompt) = match domain {
            Domain::RiskExplanation { condition, high_risk } => (
                explanation_system_prompt(DatasetContext::for_condition(*condition)),
                explanation_user_prompt(*condition, *high_risk, record),
            ),
            Domain::HealthPlan => (PLANNER_SYSTEM_PROMPT.to_string(), planner_user_prompt(record)),
        };

        let params = self.settings.params(domain);
        CompletionRequest::new(system_prompt, user_prompt, self.settings.model_id.clone())
            .with_temperature(params.temperature)
            .with_max_tokens(params.max_tokens)
            .with_streaming(self.settings.streaming)
    }
}

fn explanation_system_prompt(context: &DatasetContext) -> String {
    let mut prompt = String::from(
        "You are an expert medical AI assistant providing explanations for health risk assessments. \
         You MUST base your explanations ONLY on the dataset context and input values provided. \
         Do NOT hallucinate or make up information.\n\n",
    );

    let _ = writeln!(prompt, "DATASET CONTEXT:");
    let _ = writeln!(prompt, "- Name: {}", context.name);
    let _ = writeln!(prompt, "- Description: {}", context.description);

    let _ = writeln!(prompt, "\nFEATURES AND THEIR MEANINGS:");
    for (key, description) in context.features {
        let _ = writeln!(prompt, "- {}: {}", key, description);
    }

    let _ = writeln!(prompt, "\nCLINICAL THRESHOLDS:");
    for (measure, bands) in context.thresholds {
        let _ = writeln!(prompt, "- {}: {}", measure, bands_json(bands));
    }

    prompt.push('\n');
    prompt.push_str(EXPLANATION_GUIDELINES);
    prompt
}

/// Render bands as a compact JSON object, keeping band order.
fn bands_json(bands: &[(&str, &str)]) -> String {
    let fields: Vec<String> = bands
        .iter()
        .map(|(name, range)| {
            format!(
                "{}:{}",
                serde_json::Value::from(*name),
                serde_json::Value::from(*range)
            )
        })
        .collect();
    format!("{{{}}}", fields.join(","))
}

/// Render a record entry on a single list line
fn one_line(text: impl std::fmt::Display) -> String {
    text.to_string().replace(['\r', '\n'], " ")
}

fn explanation_user_prompt(condition: Condition, high_risk: bool, record: &InputRecord) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "The patient has been assessed for {} risk.\n",
        condition.display_name()
    );
    let _ = writeln!(prompt, "PREDICTION RESULT: {}\n", risk_label(high_risk));
    let _ = writeln!(prompt, "INPUT VALUES PROVIDED:");
    for (name, value) in record.iter() {
        let _ = writeln!(prompt, "- {}: {}", one_line(name), one_line(value));
    }
    prompt.push_str(
        "\nPlease provide a detailed explanation of this prediction based on the input values and \
         clinical thresholds. Use chain-of-thought reasoning to analyze each significant value.",
    );
    prompt
}

fn planner_user_prompt(record: &InputRecord) -> String {
    let mut prompt =
        String::from("Create a personalized health and fitness plan for the following profile:\n\n");
    for (name, value) in record.iter() {
        match profile_field(name) {
            Some(field) => match field.unit {
                Some(unit) => {
                    let _ = writeln!(prompt, "- {}: {} {}", field.label, one_line(value), unit);
                }
                None => {
                    let _ = writeln!(prompt, "- {}: {}", field.label, one_line(value));
                }
            },
            None => {
                let _ = writeln!(prompt, "- {}: {}", one_line(name), one_line(value));
            }
        }
    }
    prompt.push_str(
        "\nGenerate a comprehensive, personalized health plan that considers all these factors.",
    );
    prompt
}

const EXPLANATION_GUIDELINES: &str = "RESPONSE GUIDELINES:
1. Use chain-of-thought reasoning: First analyze each input value against clinical thresholds
2. Be concise but thorough - aim for 150-250 words
3. Structure your response with clear sections
4. Only reference features that were actually provided in the input
5. Compare values to the documented thresholds
6. Avoid medical jargon where possible
7. Include a clear conclusion with actionable recommendations
8. Always remind that this is for educational purposes, not medical advice

FORMAT YOUR RESPONSE AS:
**Analysis Summary**
[Brief overview of the assessment]

**Key Findings**
[Bullet points of significant values and their implications]

**Risk Factors Identified**
[List contributing risk factors based on the data]

**Recommendations**
[Practical next steps]

**Disclaimer**
This assessment is for educational purposes only. Consult a healthcare professional for medical advice.";

const PLANNER_SYSTEM_PROMPT: &str = "You are an expert health and fitness consultant. Create personalized, evidence-based health plans.

RESPONSE GUIDELINES:
1. Use chain-of-thought reasoning to tailor recommendations
2. Consider the user's specific profile and goals
3. Be practical and actionable
4. Keep recommendations safe and realistic
5. Structure your response clearly

FORMAT YOUR RESPONSE AS:

**Profile Analysis**
[Brief analysis of BMI, activity level, and goals]

**Personalized Dietary Plan**
- Daily caloric target based on profile
- Meal timing and structure
- Specific food recommendations for their dietary preference
- Hydration guidelines

**Weekly Fitness Schedule**
- Day-by-day workout plan
- Exercise types matched to goals
- Duration and intensity recommendations
- Rest and recovery guidance

**Key Success Factors**
- Top 3-5 actionable tips for success

**Medical Disclaimer**
Always consult a healthcare provider before starting any new diet or exercise program.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_render_in_order() {
        let bands = [("normal", "<140"), ("prediabetes", "140-199")];
        assert_eq!(bands_json(&bands), r#"{"normal":"<140","prediabetes":"140-199"}"#);
    }

    #[test]
    fn test_explanation_uses_explanation_params() {
        let builder = RequestBuilder::default();
        let domain = Domain::RiskExplanation {
            condition: Condition::Diabetes,
            high_risk: true,
        };
        let request = builder.build(&domain, &InputRecord::new().with("glucose", 150));

        assert_eq!(request.model_id(), "gpt-4o-mini");
        assert_eq!(request.temperature(), 0.3);
        assert_eq!(request.max_tokens(), 800);
        assert!(request.streaming());
        assert!(request.user_prompt().contains("PREDICTION RESULT: HIGH RISK"));
        assert!(request.user_prompt().contains("- glucose: 150\n"));
        assert!(request.system_prompt().contains("Pima Indians Diabetes Database"));
        assert!(request
            .system_prompt()
            .contains(r#"- glucose: {"normal":"<140","prediabetes":"140-199","diabetes":">=200"}"#));
    }

    #[test]
    fn test_multiline_value_stays_one_entry() {
        let record = InputRecord::new()
            .with("notes", "fine\n- glucose: 300")
            .with("age", 40);
        let explanation = RequestBuilder::default().build(
            &Domain::RiskExplanation {
                condition: Condition::Diabetes,
                high_risk: false,
            },
            &record,
        );
        let plan = RequestBuilder::default().build(&Domain::HealthPlan, &record);

        for prompt in [explanation.user_prompt(), plan.user_prompt()] {
            assert!(prompt.contains("- notes: fine - glucose: 300\n"));
            assert_eq!(prompt.lines().filter(|line| line.starts_with("- ")).count(), 2);
        }
    }

    #[test]
    fn test_planner_labels_fields() {
        let builder = RequestBuilder::new(GenerationSettings::default().with_streaming(false));
        let record = InputRecord::new()
            .with("weight", 82.5)
            .with("sex", "Female")
            .with("sleepHours", 7);
        let request = builder.build(&Domain::HealthPlan, &record);

        assert_eq!(request.temperature(), 0.5);
        assert_eq!(request.max_tokens(), 1500);
        assert!(!request.streaming());
        assert!(request.user_prompt().contains("- Weight: 82.5 kg\n"));
        assert!(request.user_prompt().contains("- Sex: Female\n"));
        assert!(request.user_prompt().contains("- sleepHours: 7\n"));
        assert!(!request.user_prompt().contains("Age"));
    }
}

//! Integration tests for grounded request construction

use healthscope_core::assessment::{assess, Condition, HealthProfile};
use healthscope_core::prompt::{Domain, FieldValue, GenerationSettings, InputRecord, RequestBuilder};
use proptest::prelude::*;

fn listed_fields(user_prompt: &str, header: &str) -> Vec<String> {
    user_prompt
        .split_once(header)
        .map(|(_, rest)| rest)
        .unwrap_or_default()
        .lines()
        .skip_while(|line| line.is_empty())
        .take_while(|line| line.starts_with("- "))
        .map(str::to_string)
        .collect()
}

/// A record value as it appears on its list line
fn rendered(value: &FieldValue) -> String {
    value.to_string().replace('\n', " ")
}

fn field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        (-1.0e6f64..1.0e6).prop_map(FieldValue::Number),
        "[A-Za-z][A-Za-z \n]{0,11}".prop_map(FieldValue::Text),
    ]
}

fn record() -> impl Strategy<Value = InputRecord> {
    prop::collection::vec(("[a-z][a-zA-Z]{0,10}", field_value()), 0..12)
        .prop_map(|fields| fields.into_iter().collect())
}

fn condition() -> impl Strategy<Value = Condition> {
    prop::sample::select(Condition::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_explanation_lists_exactly_the_record(
        record in record(),
        condition in condition(),
        high_risk in any::<bool>(),
    ) {
        let request = RequestBuilder::default()
            .build(&Domain::RiskExplanation { condition, high_risk }, &record);

        let expected: Vec<String> = record
            .iter()
            .map(|(name, value)| format!("- {}: {}", name, rendered(value)))
            .collect();
        prop_assert_eq!(listed_fields(request.user_prompt(), "INPUT VALUES PROVIDED:\n"), expected);

        let label = if high_risk { "HIGH RISK" } else { "LOW RISK" };
        prop_assert!(request.user_prompt().contains(label), "missing risk label {}", label);
    }

    #[test]
    fn prop_planner_lists_exactly_the_record(record in record()) {
        let request = RequestBuilder::default().build(&Domain::HealthPlan, &record);
        let listed = listed_fields(request.user_prompt(), "following profile:\n");

        prop_assert_eq!(listed.len(), record.len());
        for (line, (_, value)) in listed.iter().zip(record.iter()) {
            let shown = rendered(value);
            prop_assert!(line.contains(shown.as_str()), "{} does not show {}", line, shown);
        }
    }

    #[test]
    fn prop_build_is_deterministic(record in record(), condition in condition()) {
        let builder = RequestBuilder::new(GenerationSettings::default());
        let domain = Domain::RiskExplanation { condition, high_risk: false };
        prop_assert_eq!(builder.build(&domain, &record), builder.build(&domain, &record));
    }
}

#[test]
fn test_empty_record_lists_nothing() {
    let request = RequestBuilder::default().build(
        &Domain::RiskExplanation {
            condition: Condition::Parkinsons,
            high_risk: false,
        },
        &InputRecord::new(),
    );

    assert!(listed_fields(request.user_prompt(), "INPUT VALUES PROVIDED:\n").is_empty());
    assert!(request.user_prompt().contains("Parkinsons Disease risk"));
    assert!(request.system_prompt().contains("Parkinsons Voice Dataset"));
}

#[test]
fn test_messages_are_system_then_user() {
    let request = RequestBuilder::default().build(&Domain::HealthPlan, &InputRecord::new().with("age", 40));
    let messages = request.messages();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, request.system_prompt());
    assert_eq!(messages[1].content, request.user_prompt());
    assert!(request.user_prompt().contains("- Age: 40 years\n"));
}

#[test]
fn test_assessment_and_prompt_share_the_record() {
    let record = InputRecord::new()
        .with("glucose", 150)
        .with("bmi", 31.2)
        .with("age", 50)
        .with("pedigree", 0.3)
        .with("insulin", 80);

    let assessment = assess(Condition::Diabetes, &record).unwrap();
    assert_eq!(assessment.score, 5);
    assert!(assessment.high_risk);

    let request = RequestBuilder::default().build(
        &Domain::RiskExplanation {
            condition: assessment.condition,
            high_risk: assessment.high_risk,
        },
        &record,
    );
    assert_eq!(
        listed_fields(request.user_prompt(), "INPUT VALUES PROVIDED:\n"),
        vec!["- glucose: 150", "- bmi: 31.2", "- age: 50", "- pedigree: 0.3", "- insulin: 80"]
    );
}

#[test]
fn test_profile_record_feeds_planner() {
    let profile = HealthProfile {
        age: 34,
        weight_kg: 90.0,
        height_cm: 180.0,
        ..HealthProfile::default()
    };
    let request = RequestBuilder::default().build(&Domain::HealthPlan, &profile.to_record());
    let listed = listed_fields(request.user_prompt(), "following profile:\n");

    assert_eq!(listed.len(), 9);
    assert_eq!(listed[0], "- Age: 34 years");
    assert_eq!(listed[4], "- BMI: 27.8");
    assert_eq!(listed[5], "- BMI Category: Overweight");
}

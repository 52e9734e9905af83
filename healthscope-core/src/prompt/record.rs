//! Structured input records

use std::fmt;
use std::str::FromStr;

/// A single input value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value. Text is accepted when it parses as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for FieldValue {
    type Err = std::convert::Infallible;

    /// Numbers become `Number`, everything else stays `Text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::Number(n),
            _ => FieldValue::Text(s.to_string()),
        })
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Field name to value mapping that keeps the caller's insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputRecord {
    fields: Vec<(String, FieldValue)>,
}

impl InputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a field. Re-inserting an existing name replaces its value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for InputRecord
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = InputRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_replaces_in_place() {
        let mut record = InputRecord::new().with("glucose", 150).with("bmi", 31.2);
        record.insert("age", 50);
        record.insert("glucose", 95);

        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["glucose", "bmi", "age"]);
        assert_eq!(record.get("glucose"), Some(&FieldValue::Number(95.0)));
    }

    #[test]
    fn test_number_display_matches_input() {
        assert_eq!(FieldValue::Number(25.0).to_string(), "25");
        assert_eq!(FieldValue::Number(0.5).to_string(), "0.5");
        assert_eq!(FieldValue::from("Male").to_string(), "Male");
    }

    #[test]
    fn test_parse_field_value() {
        assert_eq!("140".parse::<FieldValue>().unwrap(), FieldValue::Number(140.0));
        assert_eq!(
            "Moderately Active".parse::<FieldValue>().unwrap(),
            FieldValue::Text("Moderately Active".to_string())
        );
        assert_eq!(FieldValue::from(" 2.5 ").as_number(), Some(2.5));
    }
}

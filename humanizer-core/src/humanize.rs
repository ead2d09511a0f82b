use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HumanizeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl HumanizeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(Temperature::Number(temperature));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Sampling temperature as sent by clients, either a JSON number or a
/// string holding one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Temperature {
    Number(f32),
    Text(String),
}

impl Temperature {
    /// The numeric value, `None` when the text does not parse to a finite number.
    pub fn value(&self) -> Option<f32> {
        let value = match self {
            Temperature::Number(n) => *n,
            Temperature::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HumanizeResponse {
    #[serde(rename = "humanizedText")]
    pub humanized_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_uses_camel_case_field() {
        let rsp = HumanizeResponse {
            humanized_text: "hello".into(),
        };
        assert_eq!(
            serde_json::to_value(&rsp).unwrap(),
            serde_json::json!({ "humanizedText": "hello" })
        );
    }

    #[test]
    fn optional_fields_default() {
        let req: HumanizeRequest = serde_json::from_str(r#"{"text":"short test"}"#).unwrap();
        assert_eq!(req.text.as_deref(), Some("short test"));
        assert!(req.temperature.is_none());
        assert!(req.model.is_none());

        let req: HumanizeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_none());
    }

    #[test]
    fn temperature_accepts_numbers_and_numeric_strings() {
        let temperature = |body: &str| {
            serde_json::from_str::<HumanizeRequest>(body)
                .unwrap()
                .temperature
                .unwrap()
        };
        assert_eq!(temperature(r#"{"temperature":0.8}"#).value(), Some(0.8));
        assert_eq!(temperature(r#"{"temperature":1}"#).value(), Some(1.0));
        assert_eq!(temperature(r#"{"temperature":" 0.6 "}"#).value(), Some(0.6));
        assert_eq!(temperature(r#"{"temperature":"warm"}"#).value(), None);
        assert_eq!(temperature(r#"{"temperature":"NaN"}"#).value(), None);

        assert!(serde_json::from_str::<HumanizeRequest>(r#"{"temperature":true}"#).is_err());
    }
}

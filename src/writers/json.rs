//! Write the [`Score`]s as JSON
//! It presents the scores in a JSON format and prints it on STDOUT.

use super::Writer;
use crate::models::{Metadata, Score};
use serde_json::value::Value;
use serde_json::Map;

/// A writer to print the scores as JSON.
pub struct JsonWriter {}

impl JsonWriter {
    /// Create a new JsonWriter
    pub fn new() -> Self {
        Self {}
    }
}

impl Writer for JsonWriter {
    /// Renders { model_version, score_date, scores: [...] }
    fn render(&self, metadata: Option<&Metadata>, scores: &[Score]) -> String {
        let mut map = Map::new();
        map.insert(
            "model_version".to_string(),
            metadata.map_or(Value::Null, |m| Value::String(m.model_version.clone())),
        );
        map.insert(
            "score_date".to_string(),
            metadata.map_or(Value::Null, |m| Value::String(m.score_date.to_rfc3339())),
        );

        let scores_value = scores
            .iter()
            .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
            .collect();
        map.insert("scores".to_string(), Value::Array(scores_value));
        format!("{:#}", Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::tests::sample;

    #[test]
    fn renders_json_document() {
        let (metadata, scores) = sample();
        let text = JsonWriter::new().render(Some(&metadata), &scores);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!("v2023.03.01", value["model_version"]);
        assert_eq!("2024-02-22T00:00:00+00:00", value["score_date"]);
        assert_eq!(2, value["scores"].as_array().unwrap().len());
        assert_eq!("CVE-1999-0002", value["scores"][1]["cve"]);
        assert_eq!(0.02091, value["scores"][1]["epss"]);
        assert_eq!(0.88751, value["scores"][1]["percentile"]);
    }

    #[test]
    fn renders_null_metadata() {
        let text = JsonWriter::new().render(None, &[]);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value["model_version"].is_null());
        assert!(value["scores"].as_array().unwrap().is_empty());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::output::OutputValues;
use super::state::InputState;

/// Snapshot of a calculation appended to a calculator's history.
///
/// Every field defaults when absent so older or foreign entries stored under
/// the same key still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedResult {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub inputs: InputState,
    #[serde(default)]
    pub outputs: OutputValues,
    /// Unix epoch when the entry carries no timestamp.
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_extra_keys_are_tolerated() {
        let json = r#"{"slug":"calcolatore-iva","extra":42}"#;

        let saved: SavedResult = serde_json::from_str(json).unwrap();

        assert_eq!(saved.slug, "calcolatore-iva");
        assert!(saved.inputs.is_empty());
        assert_eq!(saved.timestamp.timestamp(), 0);
    }
}

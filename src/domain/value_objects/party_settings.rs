use serde::{Deserialize, Serialize};

/// Party settings configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySettings {
    /// Round-robin turns across singers instead of strict submission order
    #[serde(default = "default_true")]
    pub fairness_enabled: bool,
    /// When true the clock is informational only; advancing is a manual host action
    #[serde(default)]
    pub playback_disabled: bool,
    /// Host-supplied permutation bypasses the scheduler while set
    #[serde(default)]
    pub manual_order: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PartySettings {
    fn default() -> Self {
        Self {
            fairness_enabled: true,
            playback_disabled: false,
            manual_order: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PartySettings::default();
        assert!(settings.fairness_enabled);
        assert!(!settings.playback_disabled);
        assert!(!settings.manual_order);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: PartySettings = serde_json::from_str("{}").unwrap();
        assert!(settings.fairness_enabled);
        assert!(!settings.manual_order);

        let settings: PartySettings =
            serde_json::from_str(r#"{"fairnessEnabled":false}"#).unwrap();
        assert!(!settings.fairness_enabled);
    }
}

// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional JSON file replacing the built-in keyword tables
    pub keywords_path: Option<PathBuf>,

    /// Rolling emotion window per user (default: 50)
    pub emotion_window: usize,

    /// Rolling audit window per classifier (default: 20)
    pub audit_window: usize,

    pub thresholds: Thresholds,

    pub negation: NegationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords_path: None,
            emotion_window: 50,
            audit_window: 20,
            thresholds: Thresholds::default(),
            negation: NegationConfig::default(),
        }
    }
}

impl Config {
    /// Reject settings that would break the escalation rules
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        for (key, value) in [
            ("thresholds.intensity_amplify", t.intensity_amplify),
            ("thresholds.intensity_critical", t.intensity_critical),
            ("thresholds.significant_event", t.significant_event),
            ("thresholds.trend_delta", t.trend_delta),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidSetting {
                    key,
                    reason: format!("{} is outside 0.0-1.0", value),
                });
            }
        }

        if t.intensity_critical < t.intensity_amplify {
            return Err(ConfigError::InvalidSetting {
                key: "thresholds.intensity_critical",
                reason: "must not be below intensity_amplify".to_string(),
            });
        }

        if self.emotion_window < 10 {
            // Trend summaries read the last 10 entries
            return Err(ConfigError::InvalidSetting {
                key: "emotion_window",
                reason: "must hold at least 10 snapshots".to_string(),
            });
        }

        if self.audit_window == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "audit_window",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Intensity cut-offs used by the tracker and the classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Intensity above which phase 3 adds score and escalates MEDIUM
    pub intensity_amplify: f64,
    /// Intensity above which phase 3 escalates HIGH to CRITICAL
    pub intensity_critical: f64,
    /// Intensity above which the latest snapshot counts as significant
    pub significant_event: f64,
    /// Mean-intensity shift that separates intensifying/calming from stable
    pub trend_delta: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            intensity_amplify: 0.8,
            intensity_critical: 0.9,
            significant_event: 0.7,
            trend_delta: 0.2,
        }
    }
}

/// Negation-aware suppression of direct keyword matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NegationConfig {
    pub enabled: bool,
    /// Word tokens inspected before each match
    pub lookback_tokens: usize,
    pub cues: Vec<String>,
}

impl Default for NegationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lookback_tokens: 4,
            cues: [
                "don't", "dont", "do not", "never", "not", "no longer", "used to", "wasn't",
                "isn't", "joking", "kidding",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

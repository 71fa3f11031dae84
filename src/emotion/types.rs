// Emotion data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::{json_kind, AssessmentError};

const NEUTRAL: &str = "neutral";

fn neutral() -> String {
    NEUTRAL.to_string()
}

/// Output of the upstream emotion-analysis step for one message
///
/// Every field is optional on the wire; missing values fall back to
/// neutral / zero / empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalAnalysis {
    #[serde(default = "neutral")]
    pub primary_emotion: String,
    #[serde(default)]
    pub emotional_intensity: f64,
    #[serde(default = "neutral")]
    pub emotional_state: String,
    #[serde(default)]
    pub detected_emotions: Vec<String>,
}

impl Default for EmotionalAnalysis {
    fn default() -> Self {
        Self {
            primary_emotion: neutral(),
            emotional_intensity: 0.0,
            emotional_state: neutral(),
            detected_emotions: Vec::new(),
        }
    }
}

impl EmotionalAnalysis {
    pub fn new(primary_emotion: &str, intensity: f64, state: &str) -> Self {
        Self {
            primary_emotion: primary_emotion.to_string(),
            emotional_intensity: intensity,
            emotional_state: state.to_string(),
            detected_emotions: Vec::new(),
        }
    }

    pub fn with_detected(mut self, detected: &[&str]) -> Self {
        self.detected_emotions = detected.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Build an analysis from arbitrary JSON; never fails
    ///
    /// Non-mapping input yields all defaults, and each field that has the
    /// wrong type is replaced by its default.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let label = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(neutral)
        };

        Self {
            primary_emotion: label("primary_emotion"),
            emotional_intensity: map
                .get("emotional_intensity")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            emotional_state: label("emotional_state"),
            detected_emotions: map
                .get("detected_emotions")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Clamp an intensity into [0, 1]; non-finite values become 0
pub fn normalize_intensity(intensity: f64) -> f64 {
    if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// One recorded emotional state, appended per message and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSnapshot {
    pub timestamp: DateTime<Utc>,
    pub primary_emotion: String,
    pub intensity: f64,
    pub state: String,
    pub detected_emotions: Vec<String>,
}

impl EmotionSnapshot {
    pub fn from_analysis(analysis: &EmotionalAnalysis) -> Self {
        let mut detected: Vec<String> = Vec::with_capacity(analysis.detected_emotions.len());
        for label in &analysis.detected_emotions {
            if !detected.contains(label) {
                detected.push(label.clone());
            }
        }

        Self {
            timestamp: Utc::now(),
            primary_emotion: analysis.primary_emotion.clone(),
            intensity: normalize_intensity(analysis.emotional_intensity),
            state: analysis.emotional_state.clone(),
            detected_emotions: detected,
        }
    }
}

/// The slice of the current emotional analysis the classifier reads
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionalContext {
    pub emotional_intensity: f64,
    pub emotional_state: String,
}

impl EmotionalContext {
    pub fn new(emotional_intensity: f64, emotional_state: &str) -> Self {
        Self {
            emotional_intensity,
            emotional_state: emotional_state.to_string(),
        }
    }

    /// Strict parse used at the classifier boundary
    ///
    /// Unlike [`EmotionalAnalysis::from_value`], shape errors are reported so
    /// the caller can fail safe.
    pub fn from_value(value: &Value) -> Result<Self, AssessmentError> {
        let map = value
            .as_object()
            .ok_or_else(|| AssessmentError::MalformedContext(json_kind(value)))?;

        let emotional_intensity = match map.get("emotional_intensity") {
            None | Some(Value::Null) => 0.0,
            Some(v) => v
                .as_f64()
                .ok_or_else(|| AssessmentError::MalformedIntensity(v.to_string()))?,
        };

        let emotional_state = map
            .get("emotional_state")
            .and_then(Value::as_str)
            .unwrap_or(NEUTRAL)
            .to_string();

        Ok(Self {
            emotional_intensity,
            emotional_state,
        })
    }
}

impl From<&EmotionalAnalysis> for EmotionalContext {
    fn from(analysis: &EmotionalAnalysis) -> Self {
        Self {
            emotional_intensity: analysis.emotional_intensity,
            emotional_state: analysis.emotional_state.clone(),
        }
    }
}

/// Direction of recent emotional intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Intensifying,
    Calming,
    Stable,
    /// Not enough points to compare
    Emerging,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Intensifying => "intensifying",
            Trend::Calming => "calming",
            Trend::Stable => "stable",
            Trend::Emerging => "emerging",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recent emotional direction over the last few snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub dominant_emotion: String,
    pub average_intensity: f64,
    pub trend: Trend,
    /// Snapshots the summary was computed over
    pub sample_size: usize,
}

impl TrendSummary {
    /// One-line description used to shape response tone
    pub fn describe(&self) -> String {
        format!(
            "Recent emotional pattern: {} (intensity: {:.1}/1.0, trend: {}). \
             Use this to inform response tone, not to label the user.",
            self.dominant_emotion, self.average_intensity, self.trend
        )
    }
}

/// Whole-session emotional journey, for end-of-session decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Distinct primary emotions, in first-seen order
    pub emotion_range: Vec<String>,
    pub avg_intensity: f64,
    pub max_intensity: f64,
    pub dominant_emotion: String,
    pub interaction_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analysis_defaults_from_json() {
        let analysis: EmotionalAnalysis = serde_json::from_value(json!({})).unwrap();
        assert_eq!(analysis, EmotionalAnalysis::default());
    }

    #[test]
    fn test_from_value_tolerates_bad_fields() {
        let analysis = EmotionalAnalysis::from_value(&json!({
            "primary_emotion": 42,
            "emotional_intensity": "very",
            "emotional_state": "anxious",
            "detected_emotions": ["fear", 7, "worry"]
        }));

        assert_eq!(analysis.primary_emotion, "neutral");
        assert_eq!(analysis.emotional_intensity, 0.0);
        assert_eq!(analysis.emotional_state, "anxious");
        assert_eq!(analysis.detected_emotions, vec!["fear", "worry"]);

        assert_eq!(
            EmotionalAnalysis::from_value(&json!("not a dict")),
            EmotionalAnalysis::default()
        );
    }

    #[test]
    fn test_snapshot_normalizes() {
        let analysis = EmotionalAnalysis::new("anger", 1.7, "agitated")
            .with_detected(&["anger", "frustration", "anger"]);
        let snapshot = EmotionSnapshot::from_analysis(&analysis);

        assert_eq!(snapshot.intensity, 1.0);
        assert_eq!(snapshot.detected_emotions, vec!["anger", "frustration"]);
        assert_eq!(normalize_intensity(f64::NAN), 0.0);
        assert_eq!(normalize_intensity(-0.3), 0.0);
    }

    #[test]
    fn test_context_strict_parse() {
        let ctx = EmotionalContext::from_value(&json!({"emotional_intensity": 0.85})).unwrap();
        assert_eq!(ctx.emotional_intensity, 0.85);
        assert_eq!(ctx.emotional_state, "neutral");

        assert_eq!(
            EmotionalContext::from_value(&json!("this is not a dict")),
            Err(AssessmentError::MalformedContext("a string"))
        );
        assert!(matches!(
            EmotionalContext::from_value(&json!({"emotional_intensity": "high"})),
            Err(AssessmentError::MalformedIntensity(_))
        ));
    }

    #[test]
    fn test_trend_description() {
        let summary = TrendSummary {
            dominant_emotion: "sadness".to_string(),
            average_intensity: 0.64,
            trend: Trend::Intensifying,
            sample_size: 6,
        };
        assert_eq!(
            summary.describe(),
            "Recent emotional pattern: sadness (intensity: 0.6/1.0, trend: intensifying). \
             Use this to inform response tone, not to label the user."
        );
    }
}

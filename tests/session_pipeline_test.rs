// Session pipeline tests
//
// Record-then-assess ordering, per-user isolation, configuration loading
// and custom keyword tables.

use anyhow::Result;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

use vigil::config::{load_config_from, load_keywords};
use vigil::crisis::RiskLevel;
use vigil::emotion::Trend;
use vigil::{EmotionalAnalysis, SafetyPipeline, SessionRegistry};

#[test]
fn test_trend_follows_recorded_messages() {
    let mut pipeline = SafetyPipeline::new("veteran_1");
    for intensity in [0.1, 0.15, 0.1, 0.6, 0.7, 0.8] {
        pipeline.process(
            "rough week",
            &EmotionalAnalysis::new("anxiety", intensity, "anxious"),
        );
    }

    let summary = pipeline.tracker().trend_summary().unwrap();
    assert_eq!(summary.trend, Trend::Intensifying);
    assert_eq!(summary.dominant_emotion, "anxiety");
    assert!(pipeline.tracker().has_significant_event());
    assert!(summary.describe().contains("trend: intensifying"));
}

#[test]
fn test_depression_history_escalates_through_pipeline() {
    let mut pipeline = SafetyPipeline::new("veteran_1");
    let low_mood = EmotionalAnalysis::new("sadness", 0.5, "depressed");

    let first = pipeline.process("not sleeping much", &low_mood);
    assert_eq!(first.risk_level, RiskLevel::None);

    pipeline.process("same as yesterday", &low_mood);
    let third = pipeline.process("I feel worthless", &low_mood);

    assert_eq!(third.risk_level, RiskLevel::High);
    assert_eq!(pipeline.classifier().audit_history().len(), 3);
}

#[test]
fn test_raw_input_paths() {
    let mut pipeline = SafetyPipeline::new("veteran_1");

    let outcome = pipeline.process_raw(
        &json!("I want to end my life"),
        &json!({"primary_emotion": "despair", "emotional_intensity": 0.9}),
    );
    assert!(!outcome.is_fail_safe());
    assert_eq!(outcome.assessment().risk_level, RiskLevel::Critical);

    let outcome = pipeline.process_raw(&json!("hello"), &json!("garbage"));
    assert!(outcome.is_fail_safe());
    assert_eq!(outcome.assessment().risk_level, RiskLevel::High);

    // The malformed analysis was still recorded, with defaults
    let history = pipeline.tracker().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].primary_emotion, "neutral");
    assert_eq!(history[1].intensity, 0.0);
}

#[test]
fn test_registry_end_sessions() {
    let registry = SessionRegistry::new(Default::default(), Default::default()).unwrap();

    registry.process("a", "hello", &EmotionalAnalysis::new("joy", 0.3, "neutral"));
    registry.process("b", "I hate myself", &EmotionalAnalysis::new("shame", 0.6, "depressed"));
    registry.process("a", "bye", &EmotionalAnalysis::new("calm", 0.1, "neutral"));

    let report = registry.end_session("a").unwrap();
    let summary = report.summary.unwrap();
    assert_eq!(summary.interaction_count, 2);
    assert_eq!(summary.emotion_range, vec!["joy", "calm"]);
    assert!(report.audit.iter().all(|r| r.risk_level == RiskLevel::None));

    let report = registry.end_session("b").unwrap();
    assert_eq!(report.audit[0].risk_level, RiskLevel::Medium);
    assert!(registry.active_users().is_empty());
}

#[test]
fn test_registry_serializes_concurrent_users() {
    let registry = SessionRegistry::new(Default::default(), Default::default()).unwrap();

    std::thread::scope(|scope| {
        for user in ["u1", "u2", "u3", "u4"] {
            let registry = &registry;
            scope.spawn(move || {
                for _ in 0..25 {
                    registry.process(user, "hello", &EmotionalAnalysis::default());
                }
            });
        }
    });

    for user in ["u1", "u2", "u3", "u4"] {
        let count = registry.with_pipeline(user, |p| p.tracker().interaction_count());
        assert_eq!(count, Some(25));
    }
}

#[test]
fn test_config_and_custom_keywords() -> Result<()> {
    let dir = TempDir::new()?;
    let keywords_path = dir.path().join("keywords.json");
    let config_path = dir.path().join("config.toml");

    fs::write(
        &keywords_path,
        serde_json::to_string_pretty(&json!({
            "critical": ["Final Mission"],
            "high": [],
            "medium": ["no purpose"],
            "low": [],
            "multipliers": { "isolation": ["on my own"] }
        }))?,
    )?;
    fs::write(
        &config_path,
        format!(
            "keywords_path = {:?}\naudit_window = 2\n\n[negation]\nenabled = false\n",
            keywords_path.display().to_string()
        ),
    )?;

    let config = load_config_from(&config_path)?;
    let keywords = load_keywords(&config)?;
    let mut pipeline = SafetyPipeline::from_config("custom", keywords, &config)?;
    let neutral = EmotionalAnalysis::default();

    let result = pipeline.process("this is my final mission", &neutral);
    assert_eq!(result.risk_level, RiskLevel::Critical);

    // Built-in phrases are gone with the custom tables
    let result = pipeline.process("I want to end my life", &neutral);
    assert_eq!(result.risk_level, RiskLevel::None);

    let result = pipeline.process("I'm on my own with no purpose", &neutral);
    assert_eq!(result.risk_level, RiskLevel::High);
    assert!(result.context_multipliers_present);

    assert_eq!(pipeline.classifier().audit_history().len(), 2);
    Ok(())
}

// Per-user safety pipeline and the registry that isolates users
//
// Order per message is fixed: record the emotion, then assess the text
// against the updated history.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Config;
use crate::crisis::{AssessmentOutcome, AuditRecord, KeywordTables, RiskClassifier, SafetyAssessment};
use crate::emotion::{EmotionTracker, EmotionalAnalysis, EmotionalContext, SessionSummary};
use crate::errors::ConfigError;

/// What remains of a user session once it ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub user_id: String,
    /// None if no messages were processed
    pub summary: Option<SessionSummary>,
    pub audit: Vec<AuditRecord>,
}

/// One user's tracker and classifier, sequenced record-then-assess
pub struct SafetyPipeline {
    tracker: EmotionTracker,
    classifier: RiskClassifier,
}

impl SafetyPipeline {
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            tracker: EmotionTracker::new(user_id.clone()),
            classifier: RiskClassifier::with_defaults(user_id),
        }
    }

    pub fn from_config(
        user_id: impl Into<String>,
        keywords: KeywordTables,
        config: &Config,
    ) -> Result<Self, ConfigError> {
        let user_id = user_id.into();
        Ok(Self {
            tracker: EmotionTracker::from_config(user_id.clone(), config),
            classifier: RiskClassifier::new(user_id, keywords, config)?,
        })
    }

    fn from_validated(user_id: &str, keywords: KeywordTables, config: &Config) -> Self {
        Self {
            tracker: EmotionTracker::from_config(user_id, config),
            classifier: RiskClassifier::from_validated(user_id.to_string(), keywords, config),
        }
    }

    pub fn user_id(&self) -> &str {
        self.classifier.user_id()
    }

    /// Record the analysis, then assess the message against the updated history
    pub fn process(&mut self, message: &str, analysis: &EmotionalAnalysis) -> SafetyAssessment {
        self.tracker.record(analysis);
        let history = self.tracker.history();
        self.classifier
            .assess(message, &EmotionalContext::from(analysis), &history)
    }

    /// Same as `process`, for unvalidated JSON from the emotion-analysis step
    ///
    /// The tracker normalizes whatever it receives; the classifier still
    /// fails safe on a missing message or a non-mapping context.
    pub fn process_raw(&mut self, message: &Value, analysis: &Value) -> AssessmentOutcome {
        self.tracker.record(&EmotionalAnalysis::from_value(analysis));
        let history: Vec<Value> = self
            .tracker
            .history()
            .iter()
            .map(|snapshot| {
                json!({
                    "state": snapshot.state,
                    "primary_emotion": snapshot.primary_emotion,
                    "intensity": snapshot.intensity,
                })
            })
            .collect();

        self.classifier.assess_raw(message, analysis, &history)
    }

    pub fn tracker(&self) -> &EmotionTracker {
        &self.tracker
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Close the session, keeping only its summary and audit trail
    pub fn end_session(self) -> SessionReport {
        let report = SessionReport {
            user_id: self.classifier.user_id().to_string(),
            summary: self.tracker.session_summary(),
            audit: self.classifier.audit_history(),
        };
        tracing::info!(
            user_id = %report.user_id,
            "Session ended after {} interactions",
            self.tracker.interaction_count()
        );
        report
    }
}

/// Independent pipelines per user
///
/// A user's pipeline is only touched while its map entry is held, so calls
/// for the same user serialize while different users proceed in parallel.
pub struct SessionRegistry {
    pipelines: DashMap<String, SafetyPipeline>,
    keywords: KeywordTables,
    config: Config,
}

impl SessionRegistry {
    pub fn new(keywords: KeywordTables, config: Config) -> Result<Self, ConfigError> {
        let keywords = keywords.normalized();
        keywords.validate()?;
        config.validate()?;
        Ok(Self {
            pipelines: DashMap::new(),
            keywords,
            config,
        })
    }

    pub fn process(
        &self,
        user_id: &str,
        message: &str,
        analysis: &EmotionalAnalysis,
    ) -> SafetyAssessment {
        let mut pipeline = self
            .pipelines
            .entry(user_id.to_string())
            .or_insert_with(|| self.create(user_id));
        pipeline.process(message, analysis)
    }

    pub fn process_raw(&self, user_id: &str, message: &Value, analysis: &Value) -> AssessmentOutcome {
        let mut pipeline = self
            .pipelines
            .entry(user_id.to_string())
            .or_insert_with(|| self.create(user_id));
        pipeline.process_raw(message, analysis)
    }

    /// Read-only access to one user's pipeline
    pub fn with_pipeline<R>(&self, user_id: &str, f: impl FnOnce(&SafetyPipeline) -> R) -> Option<R> {
        self.pipelines.get(user_id).map(|pipeline| f(&pipeline))
    }

    pub fn end_session(&self, user_id: &str) -> Option<SessionReport> {
        self.pipelines
            .remove(user_id)
            .map(|(_, pipeline)| pipeline.end_session())
    }

    /// Users with an open session, sorted
    pub fn active_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.pipelines.iter().map(|e| e.key().clone()).collect();
        users.sort();
        users
    }

    fn create(&self, user_id: &str) -> SafetyPipeline {
        tracing::debug!(user_id = %user_id, "Opening safety session");
        SafetyPipeline::from_validated(user_id, self.keywords.clone(), &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::RiskLevel;

    #[test]
    fn test_pipeline_feeds_history_to_classifier() {
        let mut pipeline = SafetyPipeline::new("u1");
        let depressed = EmotionalAnalysis::new("sadness", 0.5, "depressed");

        pipeline.process("rough day", &depressed);
        let result = pipeline.process("I feel worthless", &depressed);

        // Only two snapshots so far; the pattern needs three
        assert_eq!(result.risk_level, RiskLevel::Medium);

        let result = pipeline.process("I feel worthless", &depressed);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result
            .safety_concerns
            .contains(&"persistent_depression_pattern".to_string()));
    }

    #[test]
    fn test_process_raw_fail_safe_still_records_emotion() {
        let mut pipeline = SafetyPipeline::new("u1");
        let outcome = pipeline.process_raw(&Value::Null, &json!({"emotional_intensity": 0.4}));

        assert!(outcome.is_fail_safe());
        assert_eq!(pipeline.tracker().interaction_count(), 1);
    }

    #[test]
    fn test_out_of_range_intensity_is_clamped_for_both_components() {
        let mut pipeline = SafetyPipeline::new("u1");
        let result = pipeline.process("rough day", &EmotionalAnalysis::new("anger", 1.7, "agitated"));

        assert_eq!(result.emotional_intensity, 1.0);
        assert_eq!(pipeline.tracker().history()[0].intensity, 1.0);

        let result = pipeline.process("rough day", &EmotionalAnalysis::new("calm", -0.4, "neutral"));
        assert_eq!(result.emotional_intensity, 0.0);
        assert_eq!(pipeline.tracker().history()[1].intensity, 0.0);
    }

    #[test]
    fn test_end_session_report() {
        let mut pipeline = SafetyPipeline::new("u1");
        pipeline.process("hello", &EmotionalAnalysis::new("joy", 0.2, "neutral"));
        pipeline.process("I hate myself", &EmotionalAnalysis::new("shame", 0.6, "depressed"));

        let report = pipeline.end_session();
        assert_eq!(report.user_id, "u1");
        assert_eq!(report.audit.len(), 2);
        assert_eq!(report.audit[1].risk_level, RiskLevel::Medium);
        assert_eq!(report.summary.unwrap().interaction_count, 2);
    }

    #[test]
    fn test_registry_isolates_users() {
        let registry = SessionRegistry::new(KeywordTables::default(), Config::default()).unwrap();
        let depressed = EmotionalAnalysis::new("sadness", 0.5, "depressed");

        registry.process("alice", "meh", &depressed);
        registry.process("alice", "meh", &depressed);
        registry.process("bob", "hi", &EmotionalAnalysis::default());

        // Bob's history is not Alice's: no depression pattern for him
        let bob = registry.process("bob", "I feel worthless", &depressed);
        assert_eq!(bob.risk_level, RiskLevel::Medium);

        let alice = registry.process("alice", "I feel worthless", &depressed);
        assert_eq!(alice.risk_level, RiskLevel::High);

        assert_eq!(registry.active_users(), vec!["alice", "bob"]);
        assert_eq!(
            registry.with_pipeline("alice", |p| p.tracker().interaction_count()),
            Some(3)
        );

        let report = registry.end_session("alice").unwrap();
        assert_eq!(report.audit.len(), 3);
        assert_eq!(registry.active_users(), vec!["bob"]);
        assert!(registry.end_session("alice").is_none());
    }

    #[test]
    fn test_registry_rejects_invalid_tables() {
        let mut tables = KeywordTables::default();
        tables.critical.clear();
        assert!(SessionRegistry::new(tables, Config::default()).is_err());
    }
}

// Crisis risk classifier
//
// Every message passes through here before any response is generated.
// The classifier never returns an error: inputs it cannot read produce a
// forced-HIGH fail-safe verdict instead of a silent pass-through.

use serde_json::Value;

use super::keywords::{normalize_text, KeywordTables};
use super::negation::{NegationFilter, PhraseMatch};
use super::types::{
    AuditRecord, KeywordCategory, MultiplierCategory, RiskLevel, SafetyAssessment,
};
use crate::config::{Config, Thresholds};
use crate::emotion::{normalize_intensity, EmotionSnapshot, EmotionalContext};
use crate::errors::{AssessmentError, ConfigError};
use crate::window::RollingWindow;

/// History entries inspected by the pattern phase
const PATTERN_WINDOW: usize = 3;
const DEPRESSED: &str = "depressed";
const ANXIOUS: &str = "anxious";

/// Result of assessing unvalidated input
#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentOutcome {
    Assessed(SafetyAssessment),
    /// Input could not be read; the assessment is the forced-HIGH verdict
    FailSafe {
        assessment: SafetyAssessment,
        error: AssessmentError,
    },
}

impl AssessmentOutcome {
    pub fn assessment(&self) -> &SafetyAssessment {
        match self {
            AssessmentOutcome::Assessed(assessment) => assessment,
            AssessmentOutcome::FailSafe { assessment, .. } => assessment,
        }
    }

    pub fn into_assessment(self) -> SafetyAssessment {
        match self {
            AssessmentOutcome::Assessed(assessment) => assessment,
            AssessmentOutcome::FailSafe { assessment, .. } => assessment,
        }
    }

    pub fn is_fail_safe(&self) -> bool {
        matches!(self, AssessmentOutcome::FailSafe { .. })
    }
}

/// Running state of one assessment while the phases execute
struct Evaluation {
    level: RiskLevel,
    score: f64,
    concerns: Vec<String>,
    triggers: Vec<String>,
    multipliers_present: bool,
}

impl Evaluation {
    fn new() -> Self {
        Self {
            level: RiskLevel::None,
            score: 0.0,
            concerns: Vec::new(),
            triggers: Vec::new(),
            multipliers_present: false,
        }
    }

    /// Move from `from` to `to` only if the current level is exactly `from`
    fn escalate(&mut self, from: RiskLevel, to: RiskLevel) -> bool {
        if self.level == from && to > from {
            self.level = to;
            true
        } else {
            false
        }
    }
}

pub struct RiskClassifier {
    user_id: String,
    keywords: KeywordTables,
    negation: NegationFilter,
    thresholds: Thresholds,
    audit: RollingWindow<AuditRecord>,
}

impl RiskClassifier {
    /// Classifier with built-in keyword tables and default settings
    pub fn with_defaults(user_id: impl Into<String>) -> Self {
        let config = Config::default();
        Self::from_validated(user_id.into(), KeywordTables::default(), &config)
    }

    /// Classifier with injected keyword tables
    pub fn new(
        user_id: impl Into<String>,
        keywords: KeywordTables,
        config: &Config,
    ) -> Result<Self, ConfigError> {
        let keywords = keywords.normalized();
        keywords.validate()?;
        Ok(Self::from_validated(user_id.into(), keywords, config))
    }

    /// Tables must already be normalized and validated
    pub(crate) fn from_validated(user_id: String, keywords: KeywordTables, config: &Config) -> Self {
        Self {
            user_id,
            keywords,
            negation: NegationFilter::from_config(&config.negation),
            thresholds: config.thresholds.clone(),
            audit: RollingWindow::new(config.audit_window),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn keywords(&self) -> &KeywordTables {
        &self.keywords
    }

    /// Swap in new keyword tables; the old tables stay on validation failure
    pub fn replace_keywords(&mut self, keywords: KeywordTables) -> Result<(), ConfigError> {
        let keywords = keywords.normalized();
        keywords.validate()?;
        tracing::info!(
            user_id = %self.user_id,
            "Keyword tables replaced ({} phrases)",
            keywords.phrase_count()
        );
        self.keywords = keywords;
        Ok(())
    }

    /// Assess a message with already-typed context and history
    pub fn assess(
        &mut self,
        message: &str,
        context: &EmotionalContext,
        history: &[EmotionSnapshot],
    ) -> SafetyAssessment {
        let skip = history.len().saturating_sub(PATTERN_WINDOW);
        let recent_states: Vec<Option<&str>> = history[skip..]
            .iter()
            .map(|snapshot| Some(snapshot.state.as_str()))
            .collect();

        let assessment = self.evaluate(message, context.emotional_intensity, &recent_states);
        self.record(&assessment);
        assessment
    }

    /// Assess raw JSON input, failing safe on anything malformed
    ///
    /// `message` must be present (null is an error); a non-string message is
    /// treated as text with no keywords. `context` must be a mapping, and the
    /// last three `history` entries must be mappings.
    pub fn assess_raw(
        &mut self,
        message: &Value,
        context: &Value,
        history: &[Value],
    ) -> AssessmentOutcome {
        match validate_raw(message, context, history) {
            Ok((text, context, states)) => {
                let assessment = self.evaluate(text, context.emotional_intensity, &states);
                self.record(&assessment);
                AssessmentOutcome::Assessed(assessment)
            }
            Err(error) => {
                tracing::error!(
                    user_id = %self.user_id,
                    "Safety assessment failed, assuming HIGH risk: {}",
                    error
                );
                let assessment = SafetyAssessment::fail_safe(error.to_string());
                self.record(&assessment);
                AssessmentOutcome::FailSafe { assessment, error }
            }
        }
    }

    /// Past verdicts, oldest first
    pub fn audit_history(&self) -> Vec<AuditRecord> {
        self.audit.to_vec()
    }

    pub fn last_assessment_level(&self) -> Option<RiskLevel> {
        self.audit.latest().map(|record| record.risk_level)
    }

    fn record(&mut self, assessment: &SafetyAssessment) {
        self.audit.push(AuditRecord::from_assessment(assessment));

        if assessment.risk_level != RiskLevel::None {
            tracing::warn!(
                user_id = %self.user_id,
                "Safety assessment: risk={} score={:.1} triggers={}",
                assessment.risk_level,
                assessment.risk_score,
                assessment.specific_triggers.len()
            );
        }
    }

    /// Run the detection phases; pure with respect to `self`
    fn evaluate(
        &self,
        message: &str,
        intensity: f64,
        recent_states: &[Option<&str>],
    ) -> SafetyAssessment {
        let text = normalize_text(message);
        let intensity = normalize_intensity(intensity);
        let mut eval = Evaluation::new();

        self.match_keywords(&text, &mut eval);
        self.apply_multipliers(&text, &mut eval);
        self.apply_intensity(intensity, &mut eval);
        self.apply_history(recent_states, &mut eval);

        SafetyAssessment::new(
            eval.level,
            eval.score,
            eval.concerns,
            eval.triggers,
            intensity,
            eval.multipliers_present,
        )
    }

    /// Phase 1: first category in priority order with a matching phrase wins
    fn match_keywords(&self, text: &str, eval: &mut Evaluation) {
        for category in KeywordCategory::PRIORITY {
            for phrase in self.keywords.phrases(category) {
                match self.negation.find(text, phrase) {
                    PhraseMatch::Matched => {
                        eval.level = category.level();
                        eval.score += category.score();
                        eval.concerns.push(category.concern().to_string());
                        eval.triggers.push(format!("{}: '{}'", category.label(), phrase));
                        self.log_match(category, phrase);
                        return;
                    }
                    PhraseMatch::Suppressed { cue } => {
                        tracing::debug!(
                            user_id = %self.user_id,
                            "Suppressed {} phrase '{}' (negated by '{}')",
                            category.label(),
                            phrase,
                            cue
                        );
                    }
                    PhraseMatch::Absent => {}
                }
            }
        }
    }

    fn log_match(&self, category: KeywordCategory, phrase: &str) {
        match category {
            KeywordCategory::Critical => {
                tracing::error!(user_id = %self.user_id, "CRITICAL safety alert: phrase '{}'", phrase)
            }
            KeywordCategory::High => {
                tracing::error!(user_id = %self.user_id, "HIGH risk alert: phrase '{}'", phrase)
            }
            KeywordCategory::Medium => {
                tracing::warn!(user_id = %self.user_id, "MEDIUM risk: phrase '{}'", phrase)
            }
            KeywordCategory::Low => {
                tracing::info!(user_id = %self.user_id, "LOW risk: ideation detected")
            }
        }
    }

    /// Phase 2: every multiplier category is scanned; escalation is one step at most
    fn apply_multipliers(&self, text: &str, eval: &mut Evaluation) {
        let mut found: Vec<MultiplierCategory> = Vec::new();
        for (category, phrases) in &self.keywords.multipliers {
            if phrases.iter().any(|p| !p.is_empty() && text.contains(p.as_str())) {
                found.push(*category);
                eval.score += MultiplierCategory::SCORE;
                eval.triggers.push(format!("multiplier: {}", category.as_str()));
            }
        }

        if found.is_empty() {
            return;
        }
        eval.multipliers_present = true;

        let names: Vec<&str> = found.iter().map(|c| c.as_str()).collect();
        if eval.escalate(RiskLevel::Medium, RiskLevel::High) {
            tracing::warn!(
                user_id = %self.user_id,
                "Risk escalated to HIGH by multipliers: {}",
                names.join(", ")
            );
        } else if eval.escalate(RiskLevel::High, RiskLevel::Critical) {
            tracing::error!(
                user_id = %self.user_id,
                "Risk escalated to CRITICAL by multipliers: {}",
                names.join(", ")
            );
        }
    }

    /// Phase 3: strong emotion amplifies existing risk
    fn apply_intensity(&self, intensity: f64, eval: &mut Evaluation) {
        if intensity <= self.thresholds.intensity_amplify {
            return;
        }

        eval.score += 2.0;
        eval.triggers.push(format!("high_emotional_intensity: {:.2}", intensity));

        if eval.escalate(RiskLevel::Medium, RiskLevel::High) {
            tracing::warn!(user_id = %self.user_id, "Risk escalated to HIGH by emotional intensity");
        } else if intensity > self.thresholds.intensity_critical
            && eval.escalate(RiskLevel::High, RiskLevel::Critical)
        {
            tracing::error!(user_id = %self.user_id, "Risk escalated to CRITICAL by extreme intensity");
        }
    }

    /// Phase 4: patterns across the last three recorded states
    fn apply_history(&self, recent_states: &[Option<&str>], eval: &mut Evaluation) {
        if recent_states.len() < PATTERN_WINDOW {
            return;
        }
        let states = &recent_states[recent_states.len() - PATTERN_WINDOW..];

        let depressed = states.iter().filter(|s| **s == Some(DEPRESSED)).count();
        if depressed >= 2 {
            eval.concerns.push("persistent_depression_pattern".to_string());
            eval.triggers.push("pattern: persistent depression".to_string());

            if eval.escalate(RiskLevel::Medium, RiskLevel::High) {
                tracing::warn!(user_id = %self.user_id, "Risk escalated to HIGH by depression pattern");
            }
        }

        if states[0] == Some(ANXIOUS) && states[1] == Some(ANXIOUS) && states[2] == Some(DEPRESSED)
        {
            eval.triggers.push("pattern: anxiety to depression shift".to_string());
            eval.score += 1.0;
        }
    }
}

type ValidatedInput<'a> = (&'a str, EmotionalContext, Vec<Option<&'a str>>);

/// Check raw input shape before any phase runs
fn validate_raw<'a>(
    message: &'a Value,
    context: &Value,
    history: &'a [Value],
) -> Result<ValidatedInput<'a>, AssessmentError> {
    let text = match message {
        Value::Null => return Err(AssessmentError::MissingMessage),
        Value::String(text) => text.as_str(),
        _ => "",
    };

    let context = EmotionalContext::from_value(context)?;

    let skip = history.len().saturating_sub(PATTERN_WINDOW);
    let mut states = Vec::with_capacity(PATTERN_WINDOW);
    for (index, entry) in history.iter().enumerate().skip(skip) {
        let map = entry
            .as_object()
            .ok_or(AssessmentError::MalformedHistoryEntry(index))?;
        states.push(map.get("state").and_then(Value::as_str));
    }

    Ok((text, context, states))
}

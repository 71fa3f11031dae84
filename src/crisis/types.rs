// Crisis assessment data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered severity of detected crisis language
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(RiskLevel::None),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(format!("unknown risk level '{}'", other)),
        }
    }
}

/// Category of response escalation the downstream persona should apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    None,
    GentleCheckIn,
    DirectConcern,
    CrisisResponse,
    EmergencyResources,
}

impl InterventionType {
    /// Derive the intervention from the final risk level and multiplier presence
    pub fn select(level: RiskLevel, multipliers_present: bool) -> Self {
        match level {
            RiskLevel::Critical => InterventionType::EmergencyResources,
            RiskLevel::High if multipliers_present => InterventionType::EmergencyResources,
            RiskLevel::High => InterventionType::CrisisResponse,
            RiskLevel::Medium => InterventionType::DirectConcern,
            RiskLevel::Low => InterventionType::GentleCheckIn,
            RiskLevel::None => InterventionType::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionType::None => "none",
            InterventionType::GentleCheckIn => "gentle_check_in",
            InterventionType::DirectConcern => "direct_concern",
            InterventionType::CrisisResponse => "crisis_response",
            InterventionType::EmergencyResources => "emergency_resources",
        }
    }
}

impl fmt::Display for InterventionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direct keyword tables, in the priority order phase 1 checks them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordCategory {
    Critical,
    High,
    Medium,
    Low,
}

impl KeywordCategory {
    pub const PRIORITY: [KeywordCategory; 4] = [
        KeywordCategory::Critical,
        KeywordCategory::High,
        KeywordCategory::Medium,
        KeywordCategory::Low,
    ];

    pub fn level(&self) -> RiskLevel {
        match self {
            KeywordCategory::Critical => RiskLevel::Critical,
            KeywordCategory::High => RiskLevel::High,
            KeywordCategory::Medium => RiskLevel::Medium,
            KeywordCategory::Low => RiskLevel::Low,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            KeywordCategory::Critical => 10.0,
            KeywordCategory::High => 7.0,
            KeywordCategory::Medium => 5.0,
            KeywordCategory::Low => 3.0,
        }
    }

    pub fn concern(&self) -> &'static str {
        match self {
            KeywordCategory::Critical => "immediate_suicide_risk",
            KeywordCategory::High => "high_suicide_risk",
            KeywordCategory::Medium => "self_harm_risk",
            KeywordCategory::Low => "suicidal_ideation",
        }
    }

    /// Prefix used in trigger descriptions
    pub fn label(&self) -> &'static str {
        match self {
            KeywordCategory::Critical => "critical",
            KeywordCategory::High => "high",
            KeywordCategory::Medium => "medium",
            KeywordCategory::Low => "ideation",
        }
    }
}

/// Contextual keyword groups that escalate but never establish risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiplierCategory {
    Substances,
    Isolation,
    Finality,
    Means,
}

impl MultiplierCategory {
    pub const SCORE: f64 = 2.0;

    pub fn as_str(&self) -> &'static str {
        match self {
            MultiplierCategory::Substances => "substances",
            MultiplierCategory::Isolation => "isolation",
            MultiplierCategory::Finality => "finality",
            MultiplierCategory::Means => "means",
        }
    }
}

/// Result of one safety assessment
///
/// Field names are part of the output contract consumed by response shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAssessment {
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub safety_concerns: Vec<String>,
    pub specific_triggers: Vec<String>,
    pub intervention_type: InterventionType,
    pub requires_intervention: bool,
    pub requires_followup: bool,
    pub emergency_contact_suggested: bool,
    pub emotional_intensity: f64,
    pub context_multipliers_present: bool,
    /// Present only on the fail-safe path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SafetyAssessment {
    /// Build an assessment, deriving the flags and intervention from the level
    pub fn new(
        risk_level: RiskLevel,
        risk_score: f64,
        safety_concerns: Vec<String>,
        specific_triggers: Vec<String>,
        emotional_intensity: f64,
        context_multipliers_present: bool,
    ) -> Self {
        Self {
            risk_level,
            risk_score,
            safety_concerns,
            specific_triggers,
            intervention_type: InterventionType::select(risk_level, context_multipliers_present),
            requires_intervention: matches!(risk_level, RiskLevel::High | RiskLevel::Critical),
            requires_followup: matches!(risk_level, RiskLevel::Medium | RiskLevel::Low),
            emergency_contact_suggested: risk_level == RiskLevel::Critical,
            emotional_intensity,
            context_multipliers_present,
            error: None,
        }
    }

    /// Forced-HIGH verdict used whenever the input could not be assessed
    pub fn fail_safe(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            risk_level: RiskLevel::High,
            risk_score: KeywordCategory::High.score(),
            safety_concerns: vec!["assessment_error".to_string()],
            specific_triggers: vec![format!("fail_safe: {}", error)],
            intervention_type: InterventionType::CrisisResponse,
            requires_intervention: true,
            requires_followup: true,
            emergency_contact_suggested: true,
            emotional_intensity: 0.0,
            context_multipliers_present: false,
            error: Some(error),
        }
    }

    pub fn is_fail_safe(&self) -> bool {
        self.error.is_some()
    }
}

/// Compact record kept in the classifier's audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub risk_level: RiskLevel,
    pub concerns: Vec<String>,
    pub triggers: Vec<String>,
}

impl AuditRecord {
    pub fn from_assessment(assessment: &SafetyAssessment) -> Self {
        Self {
            timestamp: Utc::now(),
            risk_level: assessment.risk_level,
            concerns: assessment.safety_concerns.clone(),
            triggers: assessment.specific_triggers.clone(),
        }
    }
}

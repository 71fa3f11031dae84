// Crisis module
// Risk classification of user messages

mod classifier;
mod keywords;
mod negation;
mod types;

pub use classifier::{AssessmentOutcome, RiskClassifier};
pub use keywords::{normalize_text, KeywordTables};
pub use negation::{NegationFilter, PhraseMatch};
pub use types::{
    AuditRecord, InterventionType, KeywordCategory, MultiplierCategory, RiskLevel,
    SafetyAssessment,
};

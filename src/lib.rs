// Vigil - Crisis risk assessment layer for conversational companions
// Library exports

pub mod config;
pub mod crisis; // Risk classification
pub mod emotion; // Emotional trend tracking
pub mod errors;
pub mod pipeline; // Per-user record-then-assess sequencing
pub mod window;

pub use crisis::{AssessmentOutcome, InterventionType, RiskClassifier, RiskLevel, SafetyAssessment};
pub use emotion::{EmotionTracker, EmotionalAnalysis, EmotionalContext};
pub use pipeline::{SafetyPipeline, SessionRegistry, SessionReport};

// Emotion module
// Per-session emotional history and trend views

mod tracker;
mod types;

pub use tracker::EmotionTracker;
pub use types::{
    normalize_intensity, EmotionSnapshot, EmotionalAnalysis, EmotionalContext, SessionSummary,
    Trend, TrendSummary,
};

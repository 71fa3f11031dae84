// Emotional trend tracking across a user session
//
// Run `record` before the classifier on every message: the classifier reads
// the tracker's history for its pattern phase.

use super::types::{EmotionSnapshot, EmotionalAnalysis, SessionSummary, Trend, TrendSummary};
use crate::config::Config;
use crate::window::RollingWindow;

/// Entries considered by the trend summary
const TREND_WINDOW: usize = 10;
/// Minimum entries before a trend summary is produced
const MIN_TREND_ENTRIES: usize = 3;
/// Minimum entries before recent and earlier means are compared
const MIN_COMPARISON_ENTRIES: usize = 5;

pub struct EmotionTracker {
    user_id: String,
    /// Bounded recent window, consumed by the classifier
    history: RollingWindow<EmotionSnapshot>,
    /// Every snapshot this session, consumed only by `session_summary`
    session: Vec<EmotionSnapshot>,
    significant_event_threshold: f64,
    trend_delta: f64,
}

impl EmotionTracker {
    /// Create a tracker with the default window and thresholds
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::from_config(user_id, &Config::default())
    }

    pub fn from_config(user_id: impl Into<String>, config: &Config) -> Self {
        Self {
            user_id: user_id.into(),
            history: RollingWindow::new(config.emotion_window),
            session: Vec::new(),
            significant_event_threshold: config.thresholds.significant_event,
            trend_delta: config.thresholds.trend_delta,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Record one emotional analysis result
    pub fn record(&mut self, analysis: &EmotionalAnalysis) -> &EmotionSnapshot {
        let snapshot = EmotionSnapshot::from_analysis(analysis);
        tracing::debug!(
            user_id = %self.user_id,
            emotion = %snapshot.primary_emotion,
            state = %snapshot.state,
            "Recorded emotion (intensity {:.2})",
            snapshot.intensity
        );

        self.history.push(snapshot.clone());
        self.session.push(snapshot);
        &self.session[self.session.len() - 1]
    }

    /// Recent window contents, oldest first
    pub fn history(&self) -> Vec<EmotionSnapshot> {
        self.history.to_vec()
    }

    /// Dominant emotion, mean intensity and direction over the last 10 entries
    pub fn trend_summary(&self) -> Option<TrendSummary> {
        if self.history.len() < MIN_TREND_ENTRIES {
            return None;
        }

        let recent: Vec<&EmotionSnapshot> = self.history.last_n(TREND_WINDOW).collect();
        let intensities: Vec<f64> = recent.iter().map(|s| s.intensity).collect();

        Some(TrendSummary {
            dominant_emotion: dominant(recent.iter().map(|s| s.primary_emotion.as_str())),
            average_intensity: mean(&intensities),
            trend: self.calculate_trend(&intensities),
            sample_size: recent.len(),
        })
    }

    /// Compare the mean of the last 3 points with the up-to-3 points before them
    fn calculate_trend(&self, intensities: &[f64]) -> Trend {
        let n = intensities.len();
        if n < MIN_COMPARISON_ENTRIES {
            return Trend::Emerging;
        }

        let recent_avg = mean(&intensities[n - 3..]);
        let earlier_avg = mean(&intensities[n.saturating_sub(6)..n - 3]);

        if recent_avg > earlier_avg + self.trend_delta {
            Trend::Intensifying
        } else if recent_avg < earlier_avg - self.trend_delta {
            Trend::Calming
        } else {
            Trend::Stable
        }
    }

    /// Brief note on the last interaction, for session continuity
    pub fn recent_pattern_summary(&self) -> Option<String> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.latest().map(|last| {
            format!(
                "Last interaction: {} (intensity: {:.1})",
                last.primary_emotion, last.intensity
            )
        })
    }

    /// Whether the latest message was emotionally intense
    pub fn has_significant_event(&self) -> bool {
        self.history
            .latest()
            .map(|s| s.intensity > self.significant_event_threshold)
            .unwrap_or(false)
    }

    pub fn current_state(&self) -> &str {
        self.history
            .latest()
            .map(|s| s.state.as_str())
            .unwrap_or("unknown")
    }

    /// Emotional journey across the whole session, not just the recent window
    pub fn session_summary(&self) -> Option<SessionSummary> {
        if self.session.is_empty() {
            return None;
        }

        let mut emotion_range: Vec<String> = Vec::new();
        for snapshot in &self.session {
            if !emotion_range.contains(&snapshot.primary_emotion) {
                emotion_range.push(snapshot.primary_emotion.clone());
            }
        }

        let intensities: Vec<f64> = self.session.iter().map(|s| s.intensity).collect();

        Some(SessionSummary {
            emotion_range,
            avg_intensity: mean(&intensities),
            max_intensity: intensities.iter().copied().fold(0.0, f64::max),
            dominant_emotion: dominant(self.session.iter().map(|s| s.primary_emotion.as_str())),
            interaction_count: self.session.len(),
        })
    }

    pub fn has_data(&self) -> bool {
        !self.session.is_empty()
    }

    pub fn interaction_count(&self) -> usize {
        self.session.len()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Most frequent label; ties go to the label seen first
fn dominant<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((label, count));
        }
    }

    best.map(|(label, _)| label.to_string()).unwrap_or_default()
}

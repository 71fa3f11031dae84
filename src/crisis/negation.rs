// Negation-aware phrase matching
//
// A phrase occurrence is suppressed when a negation cue appears within the
// configured number of word tokens before it ("I've never thought about
// suicide", "I used to want to die"). The lookback stops at the start of the
// clause holding the occurrence, and "not joking" affirms rather than negates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::NegationConfig;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9']+").expect("token pattern is valid"));
static CLAUSE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?;,]|\bbut\b").expect("clause pattern is valid"));

const JEST_WORDS: [&str; 2] = ["joking", "kidding"];
const AFFIRMING_NEGATORS: [&str; 3] = ["not", "never", "no"];

/// Outcome of looking for one phrase in a normalized message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseMatch {
    Absent,
    Matched,
    /// Every occurrence was preceded by a negation cue
    Suppressed { cue: String },
}

#[derive(Debug, Clone)]
pub struct NegationFilter {
    enabled: bool,
    lookback_tokens: usize,
    cues: Vec<String>,
}

impl NegationFilter {
    pub fn from_config(config: &NegationConfig) -> Self {
        Self {
            enabled: config.enabled && config.lookback_tokens > 0,
            lookback_tokens: config.lookback_tokens,
            cues: config
                .cues
                .iter()
                .map(|cue| tokens(&cue.to_lowercase()).join(" "))
                .filter(|cue| !cue.is_empty())
                .collect(),
        }
    }

    /// Look for `phrase` in `text`; both must already be normalized
    pub fn find(&self, text: &str, phrase: &str) -> PhraseMatch {
        if phrase.is_empty() || !text.contains(phrase) {
            return PhraseMatch::Absent;
        }
        if !self.enabled {
            return PhraseMatch::Matched;
        }

        let mut suppressed_by = None;
        for (start, _) in text.match_indices(phrase) {
            match self.negating_cue(&text[..start]) {
                Some(cue) => suppressed_by = Some(cue),
                None => return PhraseMatch::Matched,
            }
        }

        match suppressed_by {
            Some(cue) => PhraseMatch::Suppressed { cue },
            None => PhraseMatch::Absent,
        }
    }

    /// The first cue found among the last tokens of the clause ending `preceding`
    fn negating_cue(&self, preceding: &str) -> Option<String> {
        let clause_start = CLAUSE_BREAK
            .find_iter(preceding)
            .last()
            .map(|m| m.end())
            .unwrap_or(0);
        let mut words = tokens(&preceding[clause_start..]);
        blank_affirmations(&mut words);

        let window: Vec<&str> = words[words.len().saturating_sub(self.lookback_tokens)..]
            .iter()
            .copied()
            .filter(|word| !word.is_empty())
            .collect();
        let padded = format!(" {} ", window.join(" "));

        self.cues
            .iter()
            .find(|cue| padded.contains(&format!(" {} ", cue)))
            .cloned()
    }
}

fn tokens(text: &str) -> Vec<&str> {
    TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Blank out "not joking" style pairs; they keep their slots in the lookback
fn blank_affirmations(words: &mut [&str]) {
    for i in 1..words.len() {
        if JEST_WORDS.contains(&words[i]) && AFFIRMING_NEGATORS.contains(&words[i - 1]) {
            words[i - 1] = "";
            words[i] = "";
        }
    }
}

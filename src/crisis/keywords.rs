// Crisis keyword tables

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::types::{KeywordCategory, MultiplierCategory};
use crate::errors::ConfigError;

/// Static phrase tables consulted by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTables {
    /// Immediate danger
    pub critical: Vec<String>,
    /// Serious ideation
    pub high: Vec<String>,
    /// Self-harm or severe distress
    pub medium: Vec<String>,
    /// Passive ideation, no stated plan
    pub low: Vec<String>,
    pub multipliers: BTreeMap<MultiplierCategory, Vec<String>>,
}

/// Lowercase, straighten apostrophes, and collapse whitespace runs to single spaces
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.to_lowercase().replace('\u{2019}', "'"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn owned(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_string()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        let critical = owned(&[
            // Direct statements
            "kill myself", "end my life", "suicide", "want to die",
            "going to kill myself", "plan to die", "planning to die",
            "going to end it", "end it all tonight", "end it all today",
            // Informal
            "snuff myself", "do myself in", "top myself", "off myself",
            "end it", "finish it", "done with life",
            // Methods
            "jump off", "overdose", "pills and", "cut my wrists",
            "hang myself", "hanging myself",
            // Finality
            "goodbye forever", "last time", "won't be here tomorrow",
            "this is it", "final message", "saying goodbye",
        ]);

        let high = owned(&[
            "don't want to live", "can't go on", "no reason to live",
            "better off dead", "world better without me",
            "shouldn't be here", "wish i was dead", "wish i wasn't here",
            "don't want to be here anymore", "can't do this anymore",
            "too much to bear", "can't take it anymore",
            "rather be dead", "had enough of life", "done with it all",
            "can't cope", "end of my tether", "at the end",
            // Burden statements
            "burden on everyone", "burden to", "everyone better off",
            "tired of being a burden", "they'd be better without me",
        ]);

        let medium = owned(&[
            "hurt myself", "harm myself", "cut myself", "cutting myself",
            "burn myself", "punish myself", "self harm", "self-harm",
            "hate myself", "worthless", "piece of shit", "waste of space",
            "hopeless", "no hope", "give up", "giving up",
            "pointless", "no point", "what's the point",
            "can't see a way out", "trapped", "no escape", "no future",
            "nothing left", "empty inside", "numb", "dead inside",
        ]);

        let low = owned(&[
            "wish i was dead", "wish i wasn't here", "shouldn't exist",
            "world better without me", "disappear", "fade away",
            "stop existing", "not be here", "be gone",
        ]);

        let mut multipliers = BTreeMap::new();
        multipliers.insert(
            MultiplierCategory::Substances,
            owned(&["drunk", "drinking", "high", "pills", "alcohol", "drugs"]),
        );
        multipliers.insert(
            MultiplierCategory::Isolation,
            owned(&["alone", "no one", "nobody", "by myself", "isolated"]),
        );
        multipliers.insert(
            MultiplierCategory::Finality,
            owned(&["goodbye", "last", "final", "forever", "never again"]),
        );
        multipliers.insert(
            MultiplierCategory::Means,
            owned(&["gun", "pills", "bridge", "rope", "blade", "knife"]),
        );

        Self {
            critical,
            high,
            medium,
            low,
            multipliers,
        }
    }
}

impl KeywordTables {
    /// Load keyword tables from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword tables file: {}", path.display()))?;

        let tables: KeywordTables =
            serde_json::from_str(&contents).context("Failed to parse keyword tables JSON")?;

        let tables = tables.normalized();
        tables.validate()?;

        tracing::info!(
            "Loaded keyword tables from {} ({} phrases)",
            path.display(),
            tables.phrase_count()
        );
        Ok(tables)
    }

    /// Copy with every phrase lowercased and whitespace-collapsed
    pub fn normalized(self) -> Self {
        let norm = |phrases: Vec<String>| -> Vec<String> {
            phrases.iter().map(|p| normalize_text(p)).collect()
        };

        Self {
            critical: norm(self.critical),
            high: norm(self.high),
            medium: norm(self.medium),
            low: norm(self.low),
            multipliers: self
                .multipliers
                .into_iter()
                .map(|(category, phrases)| (category, norm(phrases)))
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.critical.is_empty() {
            return Err(ConfigError::InvalidKeywords(
                "critical table must not be empty".to_string(),
            ));
        }

        for category in KeywordCategory::PRIORITY {
            if self.phrases(category).iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidKeywords(format!(
                    "{} table contains a blank phrase",
                    category.label()
                )));
            }
        }

        for (category, phrases) in &self.multipliers {
            if phrases.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidKeywords(format!(
                    "{} multiplier contains a blank phrase",
                    category.as_str()
                )));
            }
        }

        Ok(())
    }

    /// Phrases for one direct-match category
    pub fn phrases(&self, category: KeywordCategory) -> &[String] {
        match category {
            KeywordCategory::Critical => &self.critical,
            KeywordCategory::High => &self.high,
            KeywordCategory::Medium => &self.medium,
            KeywordCategory::Low => &self.low,
        }
    }

    pub fn phrase_count(&self) -> usize {
        KeywordCategory::PRIORITY
            .iter()
            .map(|c| self.phrases(*c).len())
            .sum::<usize>()
            + self.multipliers.values().map(Vec::len).sum::<usize>()
    }
}

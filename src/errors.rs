// Error types and user-facing error messages
//
// Assessment errors never escape the classifier: they are converted into a
// fail-safe verdict. Configuration errors surface at load time only.

use thiserror::Error;

/// Input-shape failures detected at the classifier boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessmentError {
    #[error("message is missing")]
    MissingMessage,

    #[error("emotional context must be a mapping, got {0}")]
    MalformedContext(&'static str),

    #[error("emotional_intensity must be a number, got {0}")]
    MalformedIntensity(String),

    #[error("emotional history entry {0} is not a mapping")]
    MalformedHistoryEntry(usize),
}

/// Problems with configuration or keyword tables
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid keyword tables: {0}")]
    InvalidKeywords(String),

    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

/// Name of a JSON value's kind, for error messages
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a mapping",
    }
}

/// Format a config parse error with helpful suggestions
pub fn config_parse_error(path: &str, error: &str) -> String {
    format!(
        "Failed to parse config file {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check config file syntax:\n\
           \x1b[36mcat {}\x1b[0m\n\n\
        2. Remove the file to fall back to built-in defaults\n\n\
        3. Common mistakes:\n\
           • Thresholds outside 0.0-1.0\n\
           • Missing quotes around negation cues\n\
           • Unknown section names",
        path, error, path
    )
}

/// Format a keyword tables error with helpful suggestions
pub fn keywords_file_error(path: &str, error: &str) -> String {
    format!(
        "Failed to load keyword tables from {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Dump the built-in tables as a starting point:\n\
           \x1b[36mvigil keywords > keywords.json\x1b[0m\n\n\
        2. Make sure every table is present, including an empty\n\
           \x1b[36m\"multipliers\"\x1b[0m object if you use none",
        path, error
    )
}

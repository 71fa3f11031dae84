// Vigil - Crisis risk assessment layer
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use vigil::config::{load_config, load_config_from, load_keywords, Config};
use vigil::{EmotionalAnalysis, SafetyPipeline, SessionRegistry};

#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(about = "Crisis risk assessment for chat messages", version)]
struct Args {
    /// Config file (default: ~/.vigil/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assess a single message and print the assessment as JSON
    Assess {
        /// Message text
        message: String,
        /// Emotional intensity from 0.0 to 1.0
        #[arg(long, default_value_t = 0.0)]
        intensity: f64,
        /// Coarse emotional state (e.g. neutral, anxious, depressed)
        #[arg(long, default_value = "neutral")]
        state: String,
        /// Primary emotion label
        #[arg(long, default_value = "neutral")]
        emotion: String,
    },
    /// Replay a JSONL transcript through per-user sessions
    Replay {
        /// File with one {"user_id", "message", "emotional_analysis"} object per line
        path: PathBuf,
    },
    /// Print the active keyword tables as JSON
    Keywords,
}

#[derive(Deserialize)]
struct ReplayLine {
    user_id: String,
    #[serde(default)]
    message: Value,
    #[serde(default)]
    emotional_analysis: Value,
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match args.command {
        Command::Assess {
            message,
            intensity,
            state,
            emotion,
        } => run_assess(&config, &message, EmotionalAnalysis::new(&emotion, intensity, &state)),
        Command::Replay { path } => run_replay(&config, &path),
        Command::Keywords => {
            let tables = load_keywords(&config)?;
            println!("{}", serde_json::to_string_pretty(&tables)?);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vigil=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_assess(config: &Config, message: &str, analysis: EmotionalAnalysis) -> Result<()> {
    let keywords = load_keywords(config)?;
    let mut pipeline = SafetyPipeline::from_config("cli", keywords, config)?;

    let assessment = pipeline.process(message, &analysis);
    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}

fn run_replay(config: &Config, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;

    let registry = SessionRegistry::new(load_keywords(config)?, config.clone())?;

    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: ReplayLine = serde_json::from_str(line)
            .with_context(|| format!("Invalid transcript entry on line {}", index + 1))?;

        let outcome = registry.process_raw(&entry.user_id, &entry.message, &entry.emotional_analysis);
        println!(
            "{}",
            json!({
                "user_id": entry.user_id,
                "line": index + 1,
                "assessment": outcome.assessment(),
            })
        );
    }

    for user_id in registry.active_users() {
        if let Some(report) = registry.end_session(&user_id) {
            println!("{}", json!({ "session_report": report }));
        }
    }

    Ok(())
}

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Stage of the refinement loop producing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    Generator,
    Critic,
}

impl std::fmt::Display for StageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageRole::Generator => write!(f, "generator"),
            StageRole::Critic => write!(f, "critic"),
        }
    }
}

/// Structured log events for the refinement loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    LoopStarted {
        character_name: String,
        setting: String,
        mood: String,
        max_rounds: usize,
    },
    GeneratorStarted {
        round: usize,
        prompt_preview: String,
    },
    GeneratorCompleted {
        round: usize,
        draft_chars: usize,
        duration_secs: f64,
    },
    CriticStarted {
        round: usize,
    },
    CriticCompleted {
        round: usize,
        verdict: String,
    },
    /// A stage call failed with a retryable error and is being retried once
    StageRetried {
        round: usize,
        stage: StageRole,
        reason: String,
    },
    /// Both critic attempts failed; the draft is accepted by default
    CriticFallback {
        round: usize,
        reason: String,
    },
    RoundBudgetExhausted {
        rounds: usize,
    },
    LoopCompleted {
        rounds: usize,
        degraded: bool,
        duration_secs: f64,
    },
    Cancelled {
        round: usize,
    },
    ErrorEncountered {
        round: usize,
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for storyloop events, writing to stderr so the final story on
/// stdout stays clean.
pub struct Logger {
    format: LogFormat,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    pub fn log(&self, event: &LogEvent) {
        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        let _ = writeln!(std::io::stderr(), "{}", event.with_timestamp());
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::LoopStarted {
                character_name,
                setting,
                mood,
                max_rounds,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(stderr, "{}", "storyloop".bold().bright_white());
                let _ = writeln!(
                    stderr,
                    "  {} {} in {} ({}), up to {} round(s)",
                    "Story:".dimmed(),
                    character_name.bright_cyan(),
                    setting,
                    mood.dimmed(),
                    max_rounds
                );
                let _ = writeln!(stderr);
            }
            LogEvent::GeneratorStarted { round, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    format!("[round {}]", round).bright_blue(),
                    "drafting story...".dimmed()
                );
            }
            LogEvent::GeneratorCompleted {
                round,
                draft_chars,
                duration_secs,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} draft ready ({} chars, {:.1}s)",
                    format!("[round {}]", round).bright_blue(),
                    draft_chars,
                    duration_secs
                );
            }
            LogEvent::CriticStarted { round } => {
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    format!("[round {}]", round).bright_blue(),
                    "judging draft...".dimmed()
                );
            }
            LogEvent::CriticCompleted { round, verdict } => {
                let colored_verdict = if verdict.starts_with("ACCEPTED") {
                    verdict.bright_green()
                } else {
                    verdict.bright_yellow()
                };
                let _ = writeln!(
                    stderr,
                    "{} verdict: {}",
                    format!("[round {}]", round).bright_blue(),
                    colored_verdict
                );
            }
            LogEvent::StageRetried {
                round,
                stage,
                reason,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} {} ({})",
                    format!("[round {}]", round).bright_blue(),
                    "retrying".bright_yellow(),
                    stage,
                    reason.dimmed()
                );
            }
            LogEvent::CriticFallback { round, reason } => {
                let _ = writeln!(
                    stderr,
                    "{} {} ({})",
                    format!("[round {}]", round).bright_blue(),
                    "critic unavailable, accepting draft by default".bright_yellow(),
                    reason.dimmed()
                );
            }
            LogEvent::RoundBudgetExhausted { rounds } => {
                let _ = writeln!(
                    stderr,
                    "{} returning best draft after {} round(s)",
                    "budget exhausted:".bright_yellow(),
                    rounds + 1
                );
            }
            LogEvent::LoopCompleted {
                rounds,
                degraded,
                duration_secs,
            } => {
                let status = if *degraded {
                    "DEGRADED".bright_yellow()
                } else {
                    "ACCEPTED".bright_green()
                };
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {} after round {} ({:.1}s)",
                    "done:".bold(),
                    status,
                    rounds,
                    duration_secs
                );
            }
            LogEvent::Cancelled { round } => {
                let _ = writeln!(
                    stderr,
                    "{} cancelled during round {}",
                    "stopped:".bright_red(),
                    round
                );
            }
            LogEvent::ErrorEncountered { round, error } => {
                let _ = writeln!(
                    stderr,
                    "{} round {}: {}",
                    "error:".bright_red(),
                    round,
                    error
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let line = match event {
            LogEvent::LoopStarted {
                character_name,
                max_rounds,
                ..
            } => format!("start character={} max_rounds={}", character_name, max_rounds),
            LogEvent::GeneratorStarted { round, .. } => format!("r{} generate", round),
            LogEvent::GeneratorCompleted {
                round, draft_chars, ..
            } => format!("r{} draft {}ch", round, draft_chars),
            LogEvent::CriticStarted { round } => format!("r{} critique", round),
            LogEvent::CriticCompleted { round, verdict } => {
                format!("r{} {}", round, verdict)
            }
            LogEvent::StageRetried { round, stage, .. } => {
                format!("r{} retry {}", round, stage)
            }
            LogEvent::CriticFallback { round, .. } => format!("r{} critic-fallback", round),
            LogEvent::RoundBudgetExhausted { rounds } => format!("exhausted r{}", rounds),
            LogEvent::LoopCompleted {
                rounds, degraded, ..
            } => format!("done r{} degraded={}", rounds, degraded),
            LogEvent::Cancelled { round } => format!("cancelled r{}", round),
            LogEvent::ErrorEncountered { round, error } => format!("error r{}: {}", round, error),
        };
        let _ = writeln!(stderr, "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parses_known_names() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("verbose".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_events_serialize_with_snake_case_tags() {
        let event = LogEvent::CriticCompleted {
            round: 1,
            verdict: "ACCEPTED".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "critic_completed");
        assert_eq!(json["round"], 1);
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::Verdict;

/// Structured judge report expected from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeReport {
    pub safety_ok: bool,
    #[serde(default)]
    pub safety_issues: Vec<String>,
    pub quality_score: u8,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ReportParseError {
    #[error("No JSON object found in judge output")]
    NoJsonFound,

    #[error("Failed to parse judge report JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}

impl JudgeReport {
    /// Parse a report from raw judge output.
    ///
    /// The whole output is tried as JSON first; failing that, the outermost
    /// `{...}` block is extracted, since models often wrap the object in
    /// prose or code fences.
    pub fn parse(output: &str) -> Result<Self, ReportParseError> {
        debug!(output_len = output.len(), "Parsing judge report");

        let trimmed = output.trim();
        if let Ok(report) = serde_json::from_str::<JudgeReport>(trimmed) {
            return Ok(report);
        }

        let start = trimmed.find('{').ok_or(ReportParseError::NoJsonFound)?;
        let end = trimmed.rfind('}').ok_or(ReportParseError::NoJsonFound)?;
        if end <= start {
            return Err(ReportParseError::NoJsonFound);
        }
        let report = serde_json::from_str(&trimmed[start..=end])?;
        Ok(report)
    }

    /// Fold the report into a pass/fail verdict.
    ///
    /// Accepted only when the draft is safe and the quality score clears the
    /// threshold; rejections compose the safety issues and suggestions into
    /// actionable feedback.
    pub fn into_verdict(self, min_quality: u8) -> Verdict {
        if self.safety_ok && self.quality_score >= min_quality {
            return Verdict::accepted();
        }

        let mut notes = Vec::new();
        if !self.safety_issues.is_empty() {
            notes.push(format!("Fix these safety issues: {}.", self.safety_issues.join(", ")));
        }
        if self.quality_score < min_quality {
            notes.push(format!(
                "Raise the quality above {}/10: {}",
                self.quality_score,
                if self.justification.is_empty() {
                    "improve clarity, warmth, and coherence"
                } else {
                    self.justification.as_str()
                },
            ));
        }
        for suggestion in &self.suggestions {
            notes.push(format!("- {}", suggestion));
        }
        if notes.is_empty() {
            // Unsafe report with no detail still needs non-empty feedback.
            notes.push("Rewrite the story to be gentler and more age-appropriate.".to_string());
        }

        Verdict::rejected(notes.join("\n"))
    }
}

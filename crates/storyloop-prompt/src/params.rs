use serde::{Deserialize, Serialize};

use crate::builder::PromptError;

/// Narrative parameters supplied by the user.
///
/// Immutable once constructed; consumed by the prompt builder and echoed to
/// the critic so it can judge fidelity to the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryParameters {
    /// Name of the main character
    pub character_name: String,
    /// Where the story takes place
    pub setting: String,
    /// Requested tone, e.g. "warm and encouraging"
    pub mood: String,
    /// Target length guidance, e.g. "300 words"
    pub length_guidance: String,
    /// Optional free-form extra instructions
    pub additional: Option<String>,
}

impl StoryParameters {
    pub fn new(
        character_name: impl Into<String>,
        setting: impl Into<String>,
        mood: impl Into<String>,
        length_guidance: impl Into<String>,
    ) -> Self {
        Self {
            character_name: character_name.into(),
            setting: setting.into(),
            mood: mood.into(),
            length_guidance: length_guidance.into(),
            additional: None,
        }
    }

    pub fn with_additional(mut self, additional: impl Into<String>) -> Self {
        let additional = additional.into();
        if !additional.trim().is_empty() {
            self.additional = Some(additional);
        }
        self
    }

    /// Check that every required field is present and non-blank.
    pub fn validate(&self) -> Result<(), PromptError> {
        for (name, value) in [
            ("character_name", &self.character_name),
            ("setting", &self.setting),
            ("mood", &self.mood),
            ("length_guidance", &self.length_guidance),
        ] {
            if value.trim().is_empty() {
                return Err(PromptError::MissingField(name));
            }
        }
        Ok(())
    }

    /// One-line summary of the request, handed to the critic as context.
    pub fn request_context(&self) -> String {
        format!(
            "Character: {}; Setting: {}; Mood: {}; Length: {}; Additional: {}",
            self.character_name,
            self.setting,
            self.mood,
            self.length_guidance,
            self.additional.as_deref().unwrap_or("unspecified"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_params() -> StoryParameters {
        StoryParameters::new("Luna", "treehouse village", "warm and encouraging", "300 words")
    }

    #[test]
    fn test_valid_parameters_pass_validation() {
        assert!(valid_params().validate().is_ok());
    }

    #[test]
    fn test_blank_setting_fails_validation() {
        let mut params = valid_params();
        params.setting = "   ".to_string();
        let err = params.validate().unwrap_err();
        assert!(matches!(err, PromptError::MissingField("setting")));
    }

    #[test]
    fn test_with_additional_ignores_blank_input() {
        let params = valid_params().with_additional("  ");
        assert!(params.additional.is_none());

        let params = valid_params().with_additional("include a friendly owl");
        assert_eq!(params.additional.as_deref(), Some("include a friendly owl"));
    }

    #[test]
    fn test_request_context_mentions_every_field() {
        let context = valid_params().request_context();
        assert!(context.contains("Luna"));
        assert!(context.contains("treehouse village"));
        assert!(context.contains("warm and encouraging"));
        assert!(context.contains("300 words"));
    }
}

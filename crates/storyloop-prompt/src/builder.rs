use thiserror::Error;

use crate::{Draft, StoryParameters};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("Missing required story parameter: {0}")]
    MissingField(&'static str),

    #[error("Refinement prompt requires non-empty critique feedback")]
    EmptyFeedback,
}

/// Prompt templates for the storyteller
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the initial storyteller prompt from the user's parameters.
    ///
    /// Deterministic: identical parameters yield byte-identical prompts. All
    /// four required fields are embedded verbatim so the generator's output
    /// stays steerable.
    pub fn build_initial_prompt(params: &StoryParameters) -> Result<String, PromptError> {
        params.validate()?;

        let mut guidance = vec![
            "Write a bedtime story for children aged 5-10.".to_string(),
            "Use simple, kind language with a clear beginning, middle, and warm resolution."
                .to_string(),
            "Keep it gentle: avoid violence, fear, or upsetting themes.".to_string(),
            format!("Target length: {}.", params.length_guidance),
            format!("The main character is named {}.", params.character_name),
            format!("Set the story in {}.", params.setting),
            format!("The tone should feel {}.", params.mood),
        ];
        if let Some(ref additional) = params.additional {
            guidance.push(format!("Additional instructions: {}.", additional));
        }
        guidance.push("Return only the story text without commentary.".to_string());

        Ok(format!(
            "You are a storyteller telling a story for a child about the age of 5 to 10 years old.\n- {}",
            guidance.join("\n- "),
        ))
    }

    /// Build a revision prompt from the previous draft and the critic's
    /// feedback.
    ///
    /// The previous draft text and the feedback are included verbatim, along
    /// with the original parameters, so the generator revises rather than
    /// starting over.
    pub fn build_refinement_prompt(
        previous_draft: &Draft,
        feedback: &str,
        params: &StoryParameters,
    ) -> Result<String, PromptError> {
        params.validate()?;
        if feedback.trim().is_empty() {
            return Err(PromptError::EmptyFeedback);
        }

        Ok(format!(
            r#"You are revising a bedtime story using feedback from a judge.
- Rewrite the story to address the judge feedback while keeping it for ages 5-10.
- Keep it gentle and positive; avoid violence, fear, or upsetting themes.
- Preserve the main character, named {character}.
- Keep the story set in {setting}.
- Keep the tone feeling {mood}.
- Keep the target length: {length}.

Judge feedback:
{feedback}

Original story:
{story}

Return only the revised story text."#,
            character = params.character_name,
            setting = params.setting,
            mood = params.mood,
            length = params.length_guidance,
            feedback = feedback,
            story = previous_draft.text,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luna() -> StoryParameters {
        StoryParameters::new("Luna", "treehouse village", "warm and encouraging", "300 words")
    }

    #[test]
    fn test_initial_prompt_is_deterministic() {
        let a = PromptBuilder::build_initial_prompt(&luna()).unwrap();
        let b = PromptBuilder::build_initial_prompt(&luna()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_initial_prompt_embeds_all_fields_verbatim() {
        let prompt = PromptBuilder::build_initial_prompt(&luna()).unwrap();
        assert!(prompt.contains("Luna"));
        assert!(prompt.contains("treehouse village"));
        assert!(prompt.contains("warm and encouraging"));
        assert!(prompt.contains("300 words"));
    }

    #[test]
    fn test_initial_prompt_includes_additional_instructions() {
        let params = luna().with_additional("include a friendly owl");
        let prompt = PromptBuilder::build_initial_prompt(&params).unwrap();
        assert!(prompt.contains("include a friendly owl"));
    }

    #[test]
    fn test_missing_setting_fails_before_anything_else() {
        let mut params = luna();
        params.setting = String::new();
        let err = PromptBuilder::build_initial_prompt(&params).unwrap_err();
        assert_eq!(err, PromptError::MissingField("setting"));
    }

    #[test]
    fn test_refinement_prompt_contains_draft_and_feedback_verbatim() {
        let draft = Draft::new("Once upon a time, Luna climbed the tallest treehouse.", 0);
        let feedback = "too scary; soften the storm scene";
        let prompt =
            PromptBuilder::build_refinement_prompt(&draft, feedback, &luna()).unwrap();
        assert!(prompt.contains(&draft.text));
        assert!(prompt.contains(feedback));
        assert!(prompt.contains("Luna"));
        assert!(prompt.contains("treehouse village"));
    }

    #[test]
    fn test_refinement_prompt_rejects_blank_feedback() {
        let draft = Draft::new("Once upon a time.", 0);
        let err = PromptBuilder::build_refinement_prompt(&draft, "  \n", &luna()).unwrap_err();
        assert_eq!(err, PromptError::EmptyFeedback);
    }
}

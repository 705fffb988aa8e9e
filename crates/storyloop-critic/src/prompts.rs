use storyloop_prompt::{Draft, StoryParameters};

/// Prompt templates for the judge
pub struct CriticPrompts;

impl CriticPrompts {
    /// System instruction putting the backend into its judge persona.
    pub fn judge_system_prompt() -> String {
        concat!(
            "You are a careful safety and quality judge for children's bedtime stories (ages 5-10).\n",
            "Evaluate safety (no violence, fear, or inappropriate content) and quality ",
            "(clarity, warmth, coherence, and fidelity to the requested character, setting, mood, and length).\n",
            "Respond in JSON with keys:\n",
            "  safety_ok: boolean\n",
            "  safety_issues: array of strings (empty if none)\n",
            "  quality_score: integer 1-10 (10 is best)\n",
            "  justification: the reasoning behind the quality score\n",
            "  suggestions: array of up to 3 short, actionable improvement notes\n",
            "Return only the JSON object.",
        )
        .to_string()
    }

    /// User payload: the request context plus the draft under judgment.
    pub fn build_judge_prompt(draft: &Draft, params: &StoryParameters) -> String {
        format!(
            "Story request/context: {}\n\nStory (round {}):\n{}",
            params.request_context(),
            draft.round_index,
            draft.text,
        )
    }
}

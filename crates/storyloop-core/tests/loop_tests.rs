use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storyloop_backend::{BackendError, Generator};
use storyloop_core::{LoopError, RefinementLoop, RefinementState, StoryOutcome};
use storyloop_critic::{Critic, Verdict};
use storyloop_logging::{LogFormat, Logger};
use storyloop_prompt::{Draft, StoryParameters};

/// Generator double that replays a script of responses and records the
/// prompts it was given.
struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(script: Vec<Result<String, BackendError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, round_index: usize) -> Result<Draft, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("generator called more times than scripted");
        next.map(|text| Draft::new(text, round_index))
    }
}

/// Critic double replaying scripted verdicts.
struct ScriptedCritic {
    script: Mutex<VecDeque<Result<Verdict, BackendError>>>,
    calls: AtomicUsize,
}

impl ScriptedCritic {
    fn new(script: Vec<Result<Verdict, BackendError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Critic for ScriptedCritic {
    async fn critique(
        &self,
        _draft: &Draft,
        _params: &StoryParameters,
    ) -> Result<Verdict, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("critic called more times than scripted")
    }
}

fn luna() -> StoryParameters {
    StoryParameters::new("Luna", "treehouse village", "warm and encouraging", "300 words")
}

fn logger() -> Arc<Logger> {
    Arc::new(Logger::new(LogFormat::Compact))
}

fn transient() -> BackendError {
    BackendError::Transient("connection reset".into())
}

#[tokio::test]
async fn accepts_first_draft_without_refining() {
    let generator = ScriptedGenerator::new(vec![Ok("Luna slept soundly.".into())]);
    let critic = ScriptedCritic::new(vec![Ok(Verdict::accepted())]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let outcome = runner.run(RefinementState::new(luna())).await.unwrap();

    match outcome {
        StoryOutcome::Completed {
            final_text,
            rounds,
            degraded,
            history,
            ..
        } => {
            assert_eq!(final_text, "Luna slept soundly.");
            assert_eq!(rounds, 0);
            assert!(!degraded);
            assert_eq!(history.len(), 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(generator.calls(), 1);
    assert_eq!(critic.calls(), 1);
}

#[tokio::test]
async fn luna_scenario_accepts_on_third_round() {
    let generator = ScriptedGenerator::new(vec![
        Ok("Draft zero: thunder over the treehouse.".into()),
        Ok("Draft one: distant rumbles.".into()),
        Ok("Draft two: a cozy rainy evening.".into()),
    ]);
    let critic = ScriptedCritic::new(vec![
        Ok(Verdict::rejected("too scary")),
        Ok(Verdict::rejected("too scary")),
        Ok(Verdict::accepted()),
    ]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let outcome = runner
        .run(RefinementState::new(luna()).with_max_rounds(3))
        .await
        .unwrap();

    assert_eq!(outcome.rounds(), 2);
    assert!(!outcome.is_degraded());
    assert_eq!(
        outcome.final_text(),
        Some("Draft two: a cozy rainy evening.")
    );
    assert_eq!(generator.calls(), 3);

    // Feedback and the previous draft thread into the refinement prompts.
    let second_prompt = generator.prompt(1);
    assert!(second_prompt.contains("too scary"));
    assert!(second_prompt.contains("Draft zero: thunder over the treehouse."));
}

#[tokio::test]
async fn exhausted_budget_returns_last_draft_degraded() {
    let generator = ScriptedGenerator::new(vec![
        Ok("draft zero".into()),
        Ok("draft one".into()),
        Ok("draft two".into()),
    ]);
    let critic = ScriptedCritic::new(vec![
        Ok(Verdict::rejected("flat")),
        Ok(Verdict::rejected("still flat")),
        Ok(Verdict::rejected("flatter than ever")),
    ]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let outcome = runner
        .run(RefinementState::new(luna()).with_max_rounds(3))
        .await
        .unwrap();

    assert!(outcome.is_degraded());
    assert_eq!(outcome.rounds(), 2);
    assert_eq!(outcome.final_text(), Some("draft two"));
    // Budget caps generator calls even though the critic never accepted.
    assert_eq!(generator.calls(), 3);
    assert_eq!(critic.calls(), 3);
}

#[tokio::test]
async fn auth_failure_terminates_with_zero_critic_calls() {
    let generator =
        ScriptedGenerator::new(vec![Err(BackendError::Auth("bad credential".into()))]);
    let critic = ScriptedCritic::new(vec![]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let err = runner
        .run(RefinementState::new(luna()))
        .await
        .expect_err("auth failure must be fatal");

    assert!(matches!(err, LoopError::AuthFailure(_)));
    assert_eq!(generator.calls(), 1);
    assert_eq!(critic.calls(), 0);
}

#[tokio::test]
async fn transient_generator_failure_is_retried_once() {
    let generator = ScriptedGenerator::new(vec![
        Err(transient()),
        Ok("second try worked".into()),
    ]);
    let critic = ScriptedCritic::new(vec![Ok(Verdict::accepted())]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let outcome = runner.run(RefinementState::new(luna())).await.unwrap();

    assert_eq!(outcome.final_text(), Some("second try worked"));
    assert!(!outcome.is_degraded());
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn repeated_transient_failures_become_generation_unavailable() {
    let generator = ScriptedGenerator::new(vec![Err(transient()), Err(transient())]);
    let critic = ScriptedCritic::new(vec![]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let err = runner.run(RefinementState::new(luna())).await.unwrap_err();

    assert!(matches!(err, LoopError::GenerationUnavailable(_)));
    assert_eq!(generator.calls(), 2);
    assert_eq!(critic.calls(), 0);
}

#[tokio::test]
async fn empty_response_is_retried_then_fatal() {
    let generator =
        ScriptedGenerator::new(vec![Err(BackendError::Empty), Err(BackendError::Empty)]);
    let critic = ScriptedCritic::new(vec![]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let err = runner.run(RefinementState::new(luna())).await.unwrap_err();
    assert!(matches!(err, LoopError::GenerationUnavailable(_)));
}

#[tokio::test]
async fn critic_failing_twice_accepts_draft_by_default() {
    let generator = ScriptedGenerator::new(vec![Ok("a gentle story".into())]);
    let critic = ScriptedCritic::new(vec![Err(transient()), Err(transient())]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let outcome = runner.run(RefinementState::new(luna())).await.unwrap();

    // Degraded, not failed: the draft stands but callers can tell it was
    // never explicitly accepted.
    assert!(outcome.is_degraded());
    assert_eq!(outcome.final_text(), Some("a gentle story"));
    assert_eq!(critic.calls(), 2);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn critic_transient_then_acceptance_is_clean() {
    let generator = ScriptedGenerator::new(vec![Ok("a gentle story".into())]);
    let critic = ScriptedCritic::new(vec![Err(transient()), Ok(Verdict::accepted())]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let outcome = runner.run(RefinementState::new(luna())).await.unwrap();

    assert!(!outcome.is_degraded());
    assert_eq!(critic.calls(), 2);
}

#[tokio::test]
async fn critic_auth_failure_is_fatal() {
    let generator = ScriptedGenerator::new(vec![Ok("a gentle story".into())]);
    let critic = ScriptedCritic::new(vec![Err(BackendError::Auth("key revoked".into()))]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let err = runner.run(RefinementState::new(luna())).await.unwrap_err();
    assert!(matches!(err, LoopError::AuthFailure(_)));
    assert_eq!(critic.calls(), 1);
}

#[tokio::test]
async fn missing_setting_fails_before_any_backend_call() {
    let mut params = luna();
    params.setting = String::new();

    let generator = ScriptedGenerator::new(vec![]);
    let critic = ScriptedCritic::new(vec![]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    let err = runner.run(RefinementState::new(params)).await.unwrap_err();

    assert!(matches!(err, LoopError::InvalidParameters(_)));
    assert_eq!(generator.calls(), 0);
    assert_eq!(critic.calls(), 0);
}

#[tokio::test]
async fn cancellation_before_start_returns_cancelled_with_no_calls() {
    let generator = ScriptedGenerator::new(vec![]);
    let critic = ScriptedCritic::new(vec![]);
    let runner = RefinementLoop::new(&generator, &critic, logger());

    runner.cancel_handle().store(true, Ordering::SeqCst);
    let outcome = runner.run(RefinementState::new(luna())).await.unwrap();

    assert!(matches!(outcome, StoryOutcome::Cancelled { .. }));
    assert!(outcome.final_text().is_none());
    assert_eq!(generator.calls(), 0);
    assert_eq!(critic.calls(), 0);
}

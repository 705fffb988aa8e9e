use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use dialoguer::Input;

use storyloop_backend::{
    resolve_api_key, GenerationOptions, OpenAiBackend, StoryGenerator,
};
use storyloop_core::{RefinementLoop, RefinementState, StoryOutcome};
use storyloop_critic::StoryCritic;
use storyloop_logging::{LogFormat, Logger};
use storyloop_prompt::StoryParameters;

#[derive(Parser, Debug)]
#[command(
    name = "storyloop",
    about = "Generator-critic harness for children's bedtime stories",
    version,
    author
)]
struct Cli {
    /// API key (overrides the OPENAI_API_KEY env var)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Name of the main character (prompted for if omitted)
    #[arg(long)]
    character_name: Option<String>,

    /// Target story length, e.g. "300 words"
    #[arg(long)]
    length: Option<String>,

    /// Story setting, e.g. "Forest", "City"
    #[arg(long)]
    setting: Option<String>,

    /// Story mood, e.g. "adventurous and exciting", "calm and cozy"
    #[arg(long)]
    mood: Option<String>,

    /// Optional extra instructions for the storyteller
    #[arg(long)]
    additional: Option<String>,

    /// Maximum critique/refine rounds
    #[arg(short = 'n', long, default_value_t = storyloop_core::DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    /// Model to use for generation and critique
    #[arg(short, long, default_value = "gpt-3.5-turbo")]
    model: String,

    /// Sampling temperature for story drafts
    #[arg(long, default_value_t = 0.5)]
    temperature: f32,

    /// Token budget per draft
    #[arg(long, default_value_t = 3000)]
    max_tokens: u32,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Chat-completions endpoint (any OpenAI-compatible URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Output the final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show what would happen without calling the backend
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    storyloop_logging::init_tracing("warn", log_format);

    let params = gather_params(&cli)?;

    if cli.dry_run {
        println!("=== Dry Run ===");
        println!("Character: {}", params.character_name);
        println!("Setting: {}", params.setting);
        println!("Mood: {}", params.mood);
        println!("Length: {}", params.length_guidance);
        println!("Model: {}", cli.model);
        println!("Max rounds: {}", cli.max_rounds);
        return Ok(());
    }

    // Credential is resolved before any generation call is dispatched.
    let api_key = match resolve_api_key(cli.api_key.as_deref()) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red(), e);
            std::process::exit(2);
        }
    };

    let options = GenerationOptions::default()
        .with_model(cli.model.clone())
        .with_temperature(cli.temperature)
        .with_max_tokens(cli.max_tokens)
        .with_timeout(Duration::from_secs(cli.timeout_secs));

    let mut backend = OpenAiBackend::new(api_key, &options);
    if let Some(ref base_url) = cli.base_url {
        backend = backend.with_base_url(base_url.clone());
    }

    let generator = StoryGenerator::new(&backend, options);
    let critic = StoryCritic::new(&backend);
    let logger = Arc::new(Logger::new(log_format));

    let runner = RefinementLoop::new(&generator, &critic, logger);

    // Ctrl+C cancels at the next dispatch point
    let cancel_handle = runner.cancel_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nCancelling; no further backend calls will be made...");
        cancel_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let state = RefinementState::new(params).with_max_rounds(cli.max_rounds);
    match runner.run(state).await {
        Ok(outcome) => {
            if cli.json_output {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
            std::process::exit(outcome.exit_code());
        }
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red(), e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Collect narrative parameters, prompting interactively for anything the
/// flags did not supply.
fn gather_params(cli: &Cli) -> Result<StoryParameters> {
    let character_name = field(&cli.character_name, "What should the name of the character be")?;
    let length = field(&cli.length, "How long do you want the story to be")?;
    let setting = field(
        &cli.setting,
        "What setting should the story take place in (e.g. 'Forest', 'City')",
    )?;
    let mood = field(
        &cli.mood,
        "What mood should the story have (e.g. 'adventurous and exciting', 'calm and cozy')",
    )?;
    let additional = match cli.additional {
        Some(ref value) => value.clone(),
        None => Input::<String>::new()
            .with_prompt("Any additional instructions (optional)")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?,
    };

    Ok(
        StoryParameters::new(character_name, setting, mood, length)
            .with_additional(additional),
    )
}

fn field(flag: &Option<String>, prompt: &str) -> Result<String> {
    match flag {
        Some(value) => Ok(value.clone()),
        None => Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .context("Failed to read input"),
    }
}

/// Present the outcome: story text on stdout, run summary on stderr.
fn print_outcome(outcome: &StoryOutcome) {
    match outcome {
        StoryOutcome::Completed {
            final_text,
            rounds,
            degraded,
            total_duration_secs,
            ..
        } => {
            println!("{}", final_text);
            eprintln!();
            if *degraded {
                eprintln!(
                    "{} story returned without explicit critic approval",
                    "note:".bright_yellow()
                );
            }
            eprintln!(
                "{} {} round(s), {:.1}s",
                "finished:".dimmed(),
                rounds + 1,
                total_duration_secs
            );
        }
        StoryOutcome::Cancelled {
            rounds,
            total_duration_secs,
        } => {
            eprintln!(
                "{} cancelled during round {} after {:.1}s; no story produced",
                "stopped:".bright_red(),
                rounds,
                total_duration_secs
            );
        }
    }
}

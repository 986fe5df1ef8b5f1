//! Kanji SRS CLI
//!
//! Command-line interface for inspecting and exercising the review scheduler.

mod simulate;

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kanji_srs_core::{
    format_interval, Answer, ReviewResult, ReviewScheduler, ReviewState, SrsPolicy,
};

/// Kanji SRS - spaced repetition scheduler CLI
#[derive(Parser)]
#[command(name = "kanji-srs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the kanji spaced-repetition scheduler")]
#[command(long_about = "Inspect the interval table, compute single review transitions, check dueness, and simulate review sessions.\n\nA custom policy can be supplied with --policy or the KANJI_SRS_POLICY environment variable.")]
struct Cli {
    /// Policy JSON file (intervals in ms, matureStage, maturePenalty)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Stage/streak pair as typed by the user; negatives are rejected, not clamped
#[derive(Args, Debug, Clone, Copy)]
struct StateArgs {
    /// Current stage (>= 0)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    stage: i64,
    /// Incorrect streak before this review (>= 0)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    streak: i64,
    /// Review time (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_timestamp)]
    at: Option<DateTime<Utc>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the interval table of the active policy
    Intervals,

    /// Apply one review and print the resulting state
    Schedule {
        #[command(flatten)]
        state: StateArgs,
        /// Whether the answer was correct (true/false, y/n)
        #[arg(long)]
        correct: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show both possible outcomes of reviewing a state
    Preview {
        #[command(flatten)]
        state: StateArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check whether an item with the given next review time is due
    Due {
        /// The item's next review time (RFC 3339)
        #[arg(long, value_parser = parse_timestamp)]
        next_review: DateTime<Utc>,
        /// Time to check at (RFC 3339); defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,
    },

    /// Replay an answer sequence against one item, reviewing whenever due
    Simulate {
        /// Answers, e.g. "yyynny" or "correct,incorrect,correct"
        answers: String,
        /// Registration time (RFC 3339); defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        start: Option<DateTime<Utc>>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let policy = SrsPolicy::resolve(cli.policy.as_deref()).context("Failed to load SRS policy")?;
    let scheduler = ReviewScheduler::new(policy).context("Invalid SRS policy")?;
    debug!(
        stages = scheduler.intervals().len(),
        mature_stage = scheduler.policy().mature_stage,
        mature_penalty = scheduler.policy().mature_penalty,
        "Scheduler ready"
    );

    match cli.command {
        Commands::Intervals => run_intervals(&scheduler),
        Commands::Schedule {
            state,
            correct,
            json,
        } => run_schedule(&scheduler, state, &correct, json),
        Commands::Preview { state, json } => run_preview(&scheduler, state, json),
        Commands::Due { next_review, at } => run_due(next_review, at.unwrap_or_else(Utc::now)),
        Commands::Simulate {
            answers,
            start,
            json,
        } => run_simulate(
            scheduler.policy().clone(),
            &answers,
            start.unwrap_or_else(Utc::now),
            json,
        ),
    }
}

/// Logs go to stderr so stdout stays clean for JSON output
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{}': {}", s, e))
}

fn build_state(args: StateArgs, now: DateTime<Utc>) -> anyhow::Result<ReviewState> {
    // Input times are not read by the transition; carry `now` for completeness
    ReviewState::from_raw(args.stage, args.streak, now, now).context("Rejected review state")
}

/// Run intervals command
fn run_intervals(scheduler: &ReviewScheduler) -> anyhow::Result<()> {
    let policy = scheduler.policy();

    println!("{}", "=== SRS Interval Table ===".cyan().bold());
    println!();
    for (stage, interval) in scheduler.intervals().iter() {
        let marker = if stage >= policy.mature_stage {
            format!("(mature, x{} regression)", policy.mature_penalty).yellow()
        } else {
            "".normal()
        };
        println!(
            "  {} {:>6}  {}",
            format!("stage {:>2}", stage).white().bold(),
            format_interval(interval),
            marker
        );
    }
    println!();
    println!(
        "{}",
        format!(
            "Stages above {} reuse the last interval ({}).",
            scheduler.intervals().max_stage(),
            format_interval(scheduler.interval_for(u32::MAX))
        )
        .dimmed()
    );

    Ok(())
}

/// Run schedule command
fn run_schedule(
    scheduler: &ReviewScheduler,
    args: StateArgs,
    correct: &str,
    json: bool,
) -> anyhow::Result<()> {
    let answer: Answer = correct
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("--correct expects true/false or y/n")?;
    let now = args.at.unwrap_or_else(Utc::now);
    let state = build_state(args, now)?;
    let result = scheduler.review(&state, answer, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result("Review", &result);
    Ok(())
}

/// Run preview command
fn run_preview(scheduler: &ReviewScheduler, args: StateArgs, json: bool) -> anyhow::Result<()> {
    let now = args.at.unwrap_or_else(Utc::now);
    let state = build_state(args, now)?;
    let preview = scheduler.preview(&state, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    print_result("If correct", &preview.correct);
    println!();
    print_result("If incorrect", &preview.incorrect);
    Ok(())
}

/// Run due command
fn run_due(next_review: DateTime<Utc>, now: DateTime<Utc>) -> anyhow::Result<()> {
    let state = ReviewState::new(next_review);

    if state.is_due(now) {
        println!("{}", "due".green().bold());
    } else {
        let wait = state.time_until_due(now);
        println!("{} (in {})", "not due".yellow().bold(), format_wait(wait));
    }
    Ok(())
}

/// Run simulate command
fn run_simulate(
    policy: SrsPolicy,
    raw_answers: &str,
    start: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let answers = simulate::parse_answers(raw_answers).map_err(|e| anyhow::anyhow!(e))?;
    let steps = simulate::simulate(policy, &answers, start)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    println!("{}", "=== Review Simulation ===".cyan().bold());
    println!();
    println!(
        "{}",
        format!(
            "{:>3}  {:<20}  {:<9}  {:>5}  {:>6}  {:>6}  {}",
            "#", "reviewed at", "answer", "stage", "streak", "wait", "next due"
        )
        .dimmed()
    );
    for step in &steps {
        let answer = match step.answer {
            Answer::Correct => step.answer.as_str().green(),
            Answer::Incorrect => step.answer.as_str().red(),
        };
        println!(
            "{:>3}  {:<20}  {:<9}  {:>2}->{:<2} {:>6}  {:>6}  {}",
            step.review,
            step.reviewed_at.format("%Y-%m-%d %H:%M"),
            answer,
            step.from_stage,
            step.to_stage,
            step.incorrect_streak,
            format_interval(chrono::Duration::milliseconds(step.interval_ms)),
            step.next_review_time.format("%Y-%m-%d %H:%M"),
        );
    }

    if let Some(last) = steps.last() {
        println!();
        println!(
            "{}: stage {} after {} reviews",
            "Final".white().bold(),
            last.to_stage,
            steps.len()
        );
    }
    Ok(())
}

fn print_result(label: &str, result: &ReviewResult) {
    let delta = result.stage_delta();
    let delta = match delta.signum() {
        1 => format!("+{}", delta).green(),
        -1 => format!("{}", delta).red(),
        _ => "±0".normal(),
    };

    println!("{}", format!("=== {} ({}) ===", label, result.answer).cyan().bold());
    println!(
        "{}: {} -> {} ({})",
        "Stage".white().bold(),
        result.previous_stage,
        result.state.stage,
        delta
    );
    println!(
        "{}: {}",
        "Incorrect Streak".white().bold(),
        result.state.incorrect_streak
    );
    println!(
        "{}: {}",
        "Interval".white().bold(),
        format_interval(result.interval)
    );
    println!(
        "{}: {}",
        "Last Review".white().bold(),
        result.state.last_review_time.to_rfc3339()
    );
    println!(
        "{}: {}",
        "Next Review".white().bold(),
        result.state.next_review_time.to_rfc3339()
    );
}

fn format_wait(wait: chrono::Duration) -> String {
    if wait.num_days() > 0 {
        format!("{}d {}h", wait.num_days(), wait.num_hours() % 24)
    } else if wait.num_hours() > 0 {
        format!("{}h {}m", wait.num_hours(), wait.num_minutes() % 60)
    } else if wait.num_minutes() > 0 {
        format!("{}m", wait.num_minutes())
    } else {
        format!("{}s", wait.num_seconds().max(0))
    }
}

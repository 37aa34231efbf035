use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use mindwtr_core::config::Settings;
use mindwtr_recurrence::{
    ByDay, CompletionOutcome, Frequency, Recurrence, RecurrenceSpec, RecurrenceStrategy,
    RecurringTask, StoredRecurrence, TaskDate, TaskDocument, reconcile,
};
use mindwtr_rrule::{RecurrenceRule, parse};

#[derive(Parser, Debug)]
#[command(name = "mindwtr", version, about = "Recurrence tools for Mindwtr tasks")]
pub struct Cli {
    /// Configuration file (defaults to ./config.toml if present)
    #[arg(long, global = true, env = "MINDWTR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a canonical rule string
    Build {
        /// daily, weekly, monthly or yearly
        #[arg(long)]
        freq: String,

        /// Comma-separated weekday tokens (MO,WE or 2TU, -1FR for monthly rules)
        #[arg(long, allow_hyphen_values = true)]
        by_day: Option<String>,

        #[arg(long, default_value_t = 1)]
        interval: u32,

        /// Day of month for monthly rules (1-31)
        #[arg(long)]
        month_day: Option<u8>,
    },

    /// Parse a rule string and print it as JSON
    Parse {
        rule: String,

        /// Fail on malformed input instead of printing the empty rule
        #[arg(long)]
        strict: bool,
    },

    /// Print the next occurrence after an anchor date
    Next {
        /// Anchor date (2024-01-03, 2024-01-03T09:00 or RFC 3339)
        #[arg(long)]
        anchor: String,

        #[arg(long)]
        rule: String,

        /// strict or fluid (defaults to scheduling.strategy)
        #[arg(long)]
        strategy: Option<RecurrenceStrategy>,

        /// Completion time used by the fluid strategy (defaults to now)
        #[arg(long)]
        completed_at: Option<String>,
    },

    /// Reconcile a stored recurrence JSON value
    Normalize { recurrence: String },

    /// Complete a task in a data.json file
    Complete {
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        task: String,

        /// Completion time (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
}

/// ## Summary
/// Runs a subcommand and returns what it prints.
///
/// ## Errors
/// Returns an error for invalid arguments, unreadable files, or rules the
/// command cannot use.
pub fn run(command: Command, settings: &Settings) -> Result<String> {
    let zone = settings.scheduling.zone()?;

    match command {
        Command::Build {
            freq,
            by_day,
            interval,
            month_day,
        } => build_rule(&freq, by_day.as_deref(), interval, month_day, settings),
        Command::Parse { rule, strict } => parse_rule(&rule, strict),
        Command::Next {
            anchor,
            rule,
            strategy,
            completed_at,
        } => next(
            &anchor,
            &rule,
            strategy.unwrap_or(settings.scheduling.strategy),
            completed_at.as_deref(),
            zone,
        ),
        Command::Normalize { recurrence } => normalize(&recurrence),
        Command::Complete { data, task, at } => complete(&data, &task, at.as_deref(), zone),
    }
}

fn build_rule(
    freq: &str,
    by_day: Option<&str>,
    interval: u32,
    month_day: Option<u8>,
    settings: &Settings,
) -> Result<String> {
    let Some(frequency) = Frequency::parse(freq) else {
        bail!("unknown frequency {freq:?}, expected daily, weekly, monthly or yearly");
    };
    if by_day.is_some() && month_day.is_some() {
        bail!("--by-day and --month-day cannot be combined in one rule");
    }

    let mut spec = RecurrenceSpec::new(frequency, settings.scheduling.strategy);
    spec.set_interval(interval)?;

    if let Some(tokens) = by_day {
        let days = tokens
            .split(',')
            .filter(|token| !token.trim().is_empty())
            .map(|token| {
                ByDay::parse(token).with_context(|| format!("invalid weekday token {token:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        spec.set_by_day(days)?;
    }

    if let Some(day) = month_day {
        spec.set_monthly_day(day)?;
    }

    Ok(spec.rrule().to_string())
}

fn parse_rule(rule: &str, strict: bool) -> Result<String> {
    let parsed = if strict {
        RecurrenceRule::try_parse(rule)?
    } else {
        parse(rule)
    };
    Ok(serde_json::to_string_pretty(&parsed)?)
}

fn next(
    anchor: &str,
    rule: &str,
    strategy: RecurrenceStrategy,
    completed_at: Option<&str>,
    zone: Tz,
) -> Result<String> {
    let anchor = TaskDate::parse(anchor)?;
    let recurrence: Recurrence = RecurrenceSpec::from_rule_string(rule, strategy)?.into();
    let completed_at = instant_or_now(completed_at, zone)?;

    let task = RecurringTask {
        start_time: None,
        due_date: Some(anchor),
        recurrence,
    };

    match task.complete(completed_at, zone) {
        CompletionOutcome::Rescheduled {
            due_date: Some(next),
            ..
        } => Ok(next.to_string()),
        _ => bail!("{rule} has no occurrence after {anchor}"),
    }
}

fn normalize(recurrence: &str) -> Result<String> {
    let stored: StoredRecurrence =
        serde_json::from_str(recurrence).context("recurrence must be a JSON string or object")?;
    let reconciled = reconcile(&stored)?;
    Ok(serde_json::to_string_pretty(&reconciled)?)
}

fn complete(data: &Path, task: &str, at: Option<&str>, zone: Tz) -> Result<String> {
    let completed_at = instant_or_now(at, zone)?;

    let input = std::fs::read_to_string(data)
        .with_context(|| format!("reading {}", data.display()))?;
    let mut document = TaskDocument::from_json_str(&input)
        .with_context(|| format!("parsing {}", data.display()))?;

    let outcome = document.complete_task(task, completed_at, zone)?;

    std::fs::write(data, document.to_json_string_pretty()?)
        .with_context(|| format!("writing {}", data.display()))?;

    Ok(match outcome {
        CompletionOutcome::Rescheduled {
            due_date: Some(next),
            ..
        }
        | CompletionOutcome::Rescheduled {
            start_time: Some(next),
            due_date: None,
        } => format!("{task}: rescheduled to {next}"),
        CompletionOutcome::Rescheduled { .. } => format!("{task}: rescheduled"),
        CompletionOutcome::NotRecurring => format!("{task}: done"),
        CompletionOutcome::RecurrenceEnded => format!("{task}: done, recurrence ended"),
    })
}

fn instant_or_now(value: Option<&str>, zone: Tz) -> Result<DateTime<Utc>> {
    let Some(value) = value else {
        return Ok(Utc::now());
    };
    TaskDate::parse(value)?
        .instant(zone)
        .with_context(|| format!("{value} does not exist in {zone}"))
}

#[cfg(test)]
mod tests;

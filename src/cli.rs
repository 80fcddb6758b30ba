//! Non-interactive command surface. The external cron scheduler invokes the
//! job subcommands on its own cadence; the query subcommands mirror what the
//! web layer serves to the UI.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use uuid::Uuid;

use crate::config::ConfigManager;
use crate::engine::{confirm_occurrence, revert_confirmation, scheduled_for_month};
use crate::errors::{BudgetError, Result};
use crate::jobs::{run_materializer, run_planning_reminders, run_sweeper, run_weekly_summaries};
use crate::ledger::TemplateRef;
use crate::notify::StdoutSink;
use crate::storage::{JsonStorage, StorageBackend};

#[derive(Parser)]
#[command(
    name = "hearth_core_cli",
    about = "Recurring budget engine: scheduled jobs and queries."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Materialize newly due recurring occurrences in every stored budget.
    Materialize {
        /// Treat this date as "today" (default: the local date)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Auto-clear due instances of auto-debit bills and auto-confirm income.
    Sweep {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the reconciled scheduled-transactions view for one month.
    Scheduled {
        /// Budget name (default: the configured default budget)
        #[arg(long)]
        budget: Option<String>,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Confirm one occurrence of a template, creating the row if missing.
    Confirm {
        #[arg(long)]
        budget: Option<String>,
        /// Recurring bill id
        #[arg(long, conflicts_with = "income")]
        bill: Option<Uuid>,
        /// Income source id
        #[arg(long)]
        income: Option<Uuid>,
        /// Occurrence date being confirmed
        #[arg(long)]
        date: NaiveDate,
        /// Recorded amount in minor currency units, when it differs from plan
        #[arg(long)]
        amount: Option<i64>,
    },
    /// Revert a confirmed scheduled instance back to pending.
    Undo {
        #[arg(long)]
        budget: Option<String>,
        #[arg(long)]
        transaction: Uuid,
    },
    /// Send notification digests through the stdout sink.
    Notify {
        #[command(subcommand)]
        command: NotifyCommands,
    },
}

#[derive(Subcommand)]
pub enum NotifyCommands {
    /// Weekly summary of bills due in the next seven days.
    Weekly {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Month-end reminder to plan the coming month.
    Planning {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let storage = JsonStorage::new_default()?;

    match cli.command {
        Commands::Materialize { date } => {
            let run = run_materializer(&storage, effective_date(date));
            emit(&run, run.errors.len())?;
        }
        Commands::Sweep { date } => {
            let run = run_sweeper(&storage, effective_date(date));
            emit(&run, run.errors.len())?;
        }
        Commands::Scheduled {
            budget,
            year,
            month,
            date,
        } => {
            let budget = storage.load(&resolve_budget_name(budget)?)?;
            let report = scheduled_for_month(&budget, year, month, effective_date(date))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Confirm {
            budget,
            bill,
            income,
            date,
            amount,
        } => {
            let template = match (bill, income) {
                (Some(id), None) => TemplateRef::Bill(id),
                (None, Some(id)) => TemplateRef::Income(id),
                _ => {
                    return Err(BudgetError::InvalidInput(
                        "pass exactly one of --bill or --income".into(),
                    ))
                }
            };
            let name = resolve_budget_name(budget)?;
            let mut budget = storage.load(&name)?;
            let id = confirm_occurrence(&mut budget, template, date, amount)?;
            storage.save(&budget)?;
            println!("{}", serde_json::json!({ "transaction_id": id }));
        }
        Commands::Undo {
            budget,
            transaction,
        } => {
            let name = resolve_budget_name(budget)?;
            let mut budget = storage.load(&name)?;
            revert_confirmation(&mut budget, transaction)?;
            storage.save(&budget)?;
            println!("{}", serde_json::json!({ "transaction_id": transaction }));
        }
        Commands::Notify { command } => {
            let sink = StdoutSink;
            let run = match command {
                NotifyCommands::Weekly { date } => {
                    run_weekly_summaries(&storage, &sink, effective_date(date))
                }
                NotifyCommands::Planning { date } => {
                    run_planning_reminders(&storage, &sink, effective_date(date))
                }
            };
            emit(&run, run.errors.len())?;
        }
    }
    Ok(())
}

fn effective_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn resolve_budget_name(explicit: Option<String>) -> Result<String> {
    if let Some(name) = explicit {
        return Ok(name);
    }
    let config = ConfigManager::new()?.load()?;
    config.default_budget.ok_or_else(|| {
        BudgetError::Config("no budget named and no default budget configured".into())
    })
}

fn emit<T: serde::Serialize>(run: &T, error_count: usize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(run)?);
    if error_count == 0 {
        eprintln!("{}", "ok".green());
    } else {
        eprintln!("{}", format!("{error_count} error(s)").red());
    }
    Ok(())
}

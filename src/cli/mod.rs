use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::{
    DepositForm, ExpenseForm, HouseholdSummary, LedgerService, LedgerSummary,
};
use crate::domain::{EntryId, LedgerKey, LedgerState, format_currency, format_date};
use crate::io::{Exporter, ImportOptions, Importer};
use crate::logging::init_logging;

/// famledger - Family Balance Tracker
#[derive(Parser)]
#[command(name = "famledger")]
#[command(about = "Track deposits and expenses for the dad and me ledgers")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "FAMLEDGER_DB", default_value = "famledger.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Read-only balance dashboard for the dad ledger
    Dashboard {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show totals and all entries of a ledger
    Ledger {
        /// Ledger to show: dad, me
        #[arg(short, long, default_value = "dad", value_parser = parse_ledger_key)]
        ledger: LedgerKey,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Expense management commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Deposit management commands
    #[command(subcommand)]
    Deposit(DepositCommands),

    /// Export a ledger to JSON or CSV
    Export {
        /// Format: json, csv
        #[arg(default_value = "json")]
        format: String,

        /// Ledger to export: dad, me
        #[arg(short, long, default_value = "dad", value_parser = parse_ledger_key)]
        ledger: LedgerKey,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import a JSON snapshot into a ledger
    Import {
        /// Ledger to import into: dad, me
        #[arg(short, long, default_value = "dad", value_parser = parse_ledger_key)]
        ledger: LedgerKey,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Output format of the read-only views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a new expense
    Add {
        /// Amount spent (e.g., "500" or "12.50")
        amount: String,

        /// Short description of the expense
        #[arg(short, long)]
        description: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Ledger: dad, me
        #[arg(short, long, default_value = "dad", value_parser = parse_ledger_key)]
        ledger: LedgerKey,
    },

    /// Delete an expense by ID
    Delete {
        /// Expense ID
        id: String,

        /// Ledger: dad, me
        #[arg(short, long, default_value = "dad", value_parser = parse_ledger_key)]
        ledger: LedgerKey,
    },
}

#[derive(Subcommand)]
pub enum DepositCommands {
    /// Record a new deposit
    Add {
        /// Amount deposited (e.g., "50000")
        amount: String,

        /// Optional note
        #[arg(short, long)]
        description: Option<String>,

        /// Date of the deposit (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Ledger: dad, me
        #[arg(short, long, default_value = "dad", value_parser = parse_ledger_key)]
        ledger: LedgerKey,
    },

    /// Delete a deposit by ID
    Delete {
        /// Deposit ID
        id: String,

        /// Ledger: dad, me
        #[arg(short, long, default_value = "dad", value_parser = parse_ledger_key)]
        ledger: LedgerKey,
    },
}

fn parse_ledger_key(s: &str) -> Result<LedgerKey, String> {
    LedgerKey::from_str(s).ok_or_else(|| format!("unknown ledger '{}' (expected dad or me)", s))
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_logging(self.verbose);

        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Dashboard { format } => {
                let summary = load_view(&self.database, LedgerKey::Dad).await;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                    OutputFormat::Table => print!("{}", render_dashboard(&summary)),
                }
            }

            Commands::Ledger { ledger, format } => match ledger {
                LedgerKey::Me => {
                    let household = load_household_view(&self.database).await;
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&household)?)
                        }
                        OutputFormat::Table => print!("{}", render_household(&household)),
                    }
                }
                LedgerKey::Dad => {
                    let summary = load_view(&self.database, ledger).await;
                    match format {
                        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                        OutputFormat::Table => print!("{}", render_ledger(&summary)),
                    }
                }
            },

            Commands::Expense(expense_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_expense_command(&service, expense_cmd).await?;
            }

            Commands::Deposit(deposit_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_deposit_command(&service, deposit_cmd).await?;
            }

            Commands::Export {
                format,
                ledger,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let state = service.load(ledger).await?;
                let writer: Box<dyn Write> = match &output {
                    Some(path) => Box::new(BufWriter::new(
                        File::create(path)
                            .with_context(|| format!("Failed to create {}", path))?,
                    )),
                    None => Box::new(io::stdout()),
                };

                let exporter = Exporter::new(&state);
                match format.as_str() {
                    "csv" => {
                        let count = exporter.export_entries_csv(writer)?;
                        if output.is_some() {
                            eprintln!("Exported {} entries", count);
                        }
                    }
                    "json" => {
                        let snapshot = exporter.export_json(writer)?;
                        if output.is_some() {
                            eprintln!(
                                "Exported {} deposits and {} expenses",
                                snapshot.deposits.len(),
                                snapshot.expenses.len()
                            );
                        }
                    }
                    other => anyhow::bail!("Unknown export format '{}'. Valid: json, csv", other),
                }
            }

            Commands::Import {
                ledger,
                input,
                dry_run,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let mut state = service.load(ledger).await?;
                let reader: Box<dyn io::Read> = match &input {
                    Some(path) => Box::new(BufReader::new(
                        File::open(path).with_context(|| format!("Failed to open {}", path))?,
                    )),
                    None => Box::new(io::stdin()),
                };

                let result = Importer::new(&service)
                    .import_json(reader, &mut state, ImportOptions { dry_run })
                    .await?;

                let verb = if dry_run { "Would import" } else { "Imported" };
                println!(
                    "{} {} entries into the {} ledger ({} skipped)",
                    verb, result.imported, ledger, result.skipped
                );
            }
        }

        Ok(())
    }
}

/// Load a ledger for a read-only view.
/// A store that cannot be opened or read yields an empty ledger with a message.
pub async fn load_view(database: &str, ledger: LedgerKey) -> LedgerSummary {
    match LedgerService::connect(database).await {
        Ok(service) => service.load_or_empty(ledger).await.summary(),
        Err(err) => {
            tracing::error!(%ledger, "failed to open ledger store: {err:#}");
            LedgerSummary::from_state(&LedgerState::empty(ledger))
                .with_error(Some(err.user_message()))
        }
    }
}

/// Household view counterpart of [`load_view`].
pub async fn load_household_view(database: &str) -> HouseholdSummary {
    match LedgerService::connect(database).await {
        Ok(service) => service.household().await,
        Err(err) => {
            tracing::error!("failed to open ledger store: {err:#}");
            let message = Some(err.user_message());
            let me = LedgerSummary::from_state(&LedgerState::empty(LedgerKey::Me))
                .with_error(message.clone());
            let dad = LedgerSummary::from_state(&LedgerState::empty(LedgerKey::Dad))
                .with_error(message);
            HouseholdSummary::new(me, &dad)
        }
    }
}

async fn run_expense_command(service: &LedgerService, cmd: ExpenseCommands) -> Result<()> {
    match cmd {
        ExpenseCommands::Add {
            amount,
            description,
            date,
            ledger,
        } => {
            let draft = ExpenseForm {
                description,
                amount,
                date,
            }
            .validate()?;
            let mut state = service.load(ledger).await?;
            let expense = service.add_expense(&mut state, draft).await?;

            println!(
                "Recorded expense: {} {} on {} ({})",
                format_currency(expense.amount),
                expense.description,
                format_date(expense.date),
                expense.id
            );
            println!("Balance: {}", format_currency(state.current_balance()));
        }

        ExpenseCommands::Delete { id, ledger } => {
            let mut state = service.load(ledger).await?;
            if service.delete_expense(&mut state, &EntryId::from(id.clone())).await? {
                println!("Deleted expense {}", id);
            } else {
                println!("No expense {} in the {} ledger", id, ledger);
            }
            println!("Balance: {}", format_currency(state.current_balance()));
        }
    }
    Ok(())
}

async fn run_deposit_command(service: &LedgerService, cmd: DepositCommands) -> Result<()> {
    match cmd {
        DepositCommands::Add {
            amount,
            description,
            date,
            ledger,
        } => {
            let draft = DepositForm {
                amount,
                date,
                description,
            }
            .validate()?;
            let mut state = service.load(ledger).await?;
            let deposit = service.add_deposit(&mut state, draft).await?;

            println!(
                "Recorded deposit: {} on {} ({})",
                format_currency(deposit.amount),
                format_date(deposit.date),
                deposit.id
            );
            println!("Balance: {}", format_currency(state.current_balance()));
        }

        DepositCommands::Delete { id, ledger } => {
            let mut state = service.load(ledger).await?;
            if service.delete_deposit(&mut state, &EntryId::from(id.clone())).await? {
                println!("Deleted deposit {}", id);
            } else {
                println!("No deposit {} in the {} ledger", id, ledger);
            }
            println!("Balance: {}", format_currency(state.current_balance()));
        }
    }
    Ok(())
}

// ========================
// Rendering
// ========================

/// Dashboard: balance, totals, latest deposit and recent expenses.
pub fn render_dashboard(summary: &LedgerSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Current Balance");
    if let Some(error) = &summary.error {
        let _ = writeln!(out, "! {}", error);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<20} {:>18}", "Balance", format_currency(summary.current_balance));
    let _ = writeln!(
        out,
        "{:<20} {:>18}",
        "Total Deposited",
        format_currency(summary.total_deposited)
    );
    let _ = writeln!(out, "{:<20} {:>18}", "Total Spent", format_currency(summary.total_spent));
    let _ = writeln!(out);

    match &summary.latest_deposit {
        Some(deposit) => {
            let _ = writeln!(
                out,
                "Latest Deposit: {} ({})",
                format_currency(deposit.amount),
                format_date(deposit.date)
            );
        }
        None => {
            let _ = writeln!(out, "Latest Deposit: No deposits yet");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Recent Activity (most recent first)");
    if summary.expenses.is_empty() {
        let _ = writeln!(out, "No expenses yet.");
    }
    for expense in &summary.expenses {
        let _ = writeln!(
            out,
            "  {:<12} {:<30} {:>16}",
            format_date(expense.date),
            truncate(&expense.description, 30),
            format!("-{}", format_currency(expense.amount))
        );
    }
    out
}

/// Management view: totals and every entry with its identifier.
pub fn render_ledger(summary: &LedgerSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ledger: {}", summary.ledger);
    if let Some(error) = &summary.error {
        let _ = writeln!(out, "! {}", error);
    }
    let _ = writeln!(out, "{:<20} {:>18}", "Balance", format_currency(summary.current_balance));
    let _ = writeln!(
        out,
        "{:<20} {:>18}",
        "Total Deposited",
        format_currency(summary.total_deposited)
    );
    let _ = writeln!(out, "{:<20} {:>18}", "Total Spent", format_currency(summary.total_spent));
    let _ = writeln!(out);

    let _ = writeln!(out, "Deposits:");
    if summary.deposits.is_empty() {
        let _ = writeln!(out, "  No deposits yet.");
    }
    for deposit in &summary.deposits {
        let _ = writeln!(
            out,
            "  {:<12} {:<30} {:>16}  {}",
            format_date(deposit.date),
            truncate(deposit.description.as_deref().unwrap_or(""), 30),
            format_currency(deposit.amount),
            deposit.id
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Expenses:");
    if summary.expenses.is_empty() {
        let _ = writeln!(out, "  No expenses yet.");
    }
    for expense in &summary.expenses {
        let _ = writeln!(
            out,
            "  {:<12} {:<30} {:>16}  {}",
            format_date(expense.date),
            truncate(&expense.description, 30),
            format!("-{}", format_currency(expense.amount)),
            expense.id
        );
    }
    out
}

/// Personal ledger followed by its standing against the dad ledger.
pub fn render_household(household: &HouseholdSummary) -> String {
    let mut out = render_ledger(&household.me);
    let _ = writeln!(out);
    if let Some(error) = &household.dad_error {
        let _ = writeln!(out, "! Dad ledger: {}", error);
    }
    let _ = writeln!(out, "{:<20} {:>18}", "Dad Balance", format_currency(household.dad_balance));
    let _ = writeln!(
        out,
        "{:<20} {:>18}",
        "Balance After Dad",
        format_currency(household.balance_after_dad)
    );
    out
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use tripwise::core::log::init_logging;
use tripwise::core::model::{ExpenseCategory, NewExpense, VacationInput};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl From<Commands> for tripwise::AppCommand {
    fn from(cmd: Commands) -> tripwise::AppCommand {
        match cmd {
            Commands::Trips => tripwise::AppCommand::Trips,
            Commands::AddTrip {
                destination,
                country,
                hotel,
                start,
                end,
                budget,
                budget_currency,
                currency,
            } => tripwise::AppCommand::AddTrip(VacationInput {
                destination,
                country,
                hotel_name: hotel,
                start_date: midnight_utc(start),
                end_date: midnight_utc(end),
                budget,
                budget_currency,
                currency,
                image: None,
            }),
            Commands::RemoveTrip { id } => tripwise::AppCommand::RemoveTrip(id),
            Commands::AddExpense {
                vacation_id,
                amount,
                currency,
                category,
                description,
                date,
            } => tripwise::AppCommand::AddExpense(NewExpense {
                vacation_id,
                amount,
                currency,
                category,
                description,
                date: date.map(midnight_utc).unwrap_or_else(Utc::now),
            }),
            Commands::RemoveExpense { id } => tripwise::AppCommand::RemoveExpense(id),
            Commands::Expenses { vacation_id } => tripwise::AppCommand::Expenses(vacation_id),
            Commands::Analyze { id, currency } => tripwise::AppCommand::Analyze { id, currency },
            Commands::Currencies { query } => tripwise::AppCommand::Currencies(query),
            Commands::Convert { amount, from, to } => {
                tripwise::AppCommand::Convert { amount, from, to }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List vacations
    Trips,
    /// Plan a new vacation
    AddTrip {
        destination: String,
        #[arg(long, default_value = "")]
        country: String,
        #[arg(long, default_value = "")]
        hotel: String,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, default_value = "USD")]
        budget_currency: String,
        /// Currency to show this vacation in
        #[arg(long)]
        currency: Option<String>,
    },
    /// Delete a vacation and all of its expenses
    RemoveTrip { id: String },
    /// Record an expense against a vacation
    AddExpense {
        vacation_id: String,
        amount: f64,
        currency: String,
        #[arg(long, default_value = "other")]
        category: ExpenseCategory,
        #[arg(long, default_value = "")]
        description: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a single expense
    RemoveExpense { id: String },
    /// List the expenses of a vacation
    Expenses { vacation_id: String },
    /// Display budget analysis for a vacation
    Analyze {
        id: String,
        /// Currency to report in
        #[arg(long)]
        currency: Option<String>,
    },
    /// Search supported currencies
    Currencies { query: Option<String> },
    /// Convert an amount between currencies
    Convert { amount: f64, from: String, to: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => tripwise::cli::setup::setup(),
        Some(cmd) => tripwise::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

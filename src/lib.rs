pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::currency::{CurrencyCatalog, CurrencyRateProvider};
use crate::core::model::{NewExpense, VacationInput};
use crate::core::vacation_cache::VacationCache;
use crate::core::{CurrencyConverter, TripPlanner};
use crate::providers::caching::CachingRateProvider;
use crate::providers::chain::ChainedRateProvider;
use crate::providers::rate_table::RateTable;
use crate::providers::yahoo::YahooRateProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Trips,
    AddTrip(VacationInput),
    RemoveTrip(String),
    AddExpense(NewExpense),
    RemoveExpense(String),
    Expenses(String),
    Analyze {
        id: String,
        currency: Option<String>,
    },
    Currencies(Option<String>),
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
}

/// Rate sources from configuration: the configured table first, then live rates if enabled.
pub fn build_rate_provider(config: &AppConfig) -> Result<Arc<dyn CurrencyRateProvider>> {
    let table = Arc::new(RateTable::from_config(&config.base_currency, &config.rates)?);
    match &config.providers.yahoo {
        Some(yahoo) => {
            debug!("Live rates enabled from {}", yahoo.base_url);
            let live = CachingRateProvider::new(
                YahooRateProvider::new(&yahoo.base_url)?,
                config.rate_ttl(),
            );
            let sources: Vec<Arc<dyn CurrencyRateProvider>> = vec![table, Arc::new(live)];
            Ok(Arc::new(ChainedRateProvider::new(sources)))
        }
        None => Ok(table),
    }
}

pub fn build_planner(config: &AppConfig) -> Result<TripPlanner> {
    let repository = store::open_repository(config)?;
    let cache = VacationCache::new(repository, config.cache_ttl());
    let catalog = CurrencyCatalog::with_custom(config.custom_currencies.clone())?;
    let converter = CurrencyConverter::new(
        catalog,
        build_rate_provider(config)?,
        &config.base_currency,
    );
    Ok(TripPlanner::new(cache, converter)
        .with_under_budget_ratio(config.under_budget_ratio)
        .with_default_currency(&config.currency))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Tripwise starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let planner = build_planner(&config)?;
    match command {
        AppCommand::Trips => cli::trips::list(&planner).await,
        AppCommand::AddTrip(input) => cli::trips::add(&planner, input).await,
        AppCommand::RemoveTrip(id) => cli::trips::remove(&planner, &id).await,
        AppCommand::AddExpense(expense) => cli::trips::add_expense(&planner, expense).await,
        AppCommand::RemoveExpense(id) => cli::trips::remove_expense(&planner, &id).await,
        AppCommand::Expenses(id) => cli::trips::expenses(&planner, &id).await,
        AppCommand::Analyze { id, currency } => {
            cli::analyze::run(&planner, &id, currency.as_deref()).await
        }
        AppCommand::Currencies(query) => {
            cli::currencies::search(planner.converter(), query.as_deref());
            Ok(())
        }
        AppCommand::Convert { amount, from, to } => {
            cli::currencies::convert(planner.converter(), amount, &from, &to).await;
            Ok(())
        }
    }
}

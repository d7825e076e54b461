//! Core business logic abstractions

pub mod analysis;
pub mod config;
pub mod converter;
pub mod currency;
pub mod error;
pub mod log;
pub mod model;
pub mod planner;
pub mod repository;
pub mod vacation_cache;

// Re-export main types for cleaner imports
pub use analysis::{BudgetAnalysis, BudgetAnalyzer, BudgetStatus};
pub use converter::{CurrencyConverter, FALLBACK_RATE};
pub use currency::{CurrencyCatalog, CurrencyInfo, CurrencyRateProvider};
pub use error::TripError;
pub use model::{Expense, ExpenseCategory, NewExpense, Vacation, VacationInput};
pub use planner::TripPlanner;
pub use repository::VacationRepository;
pub use vacation_cache::VacationCache;

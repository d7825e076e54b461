pub mod analyze;
pub mod currencies;
pub mod setup;
pub mod trips;
pub mod ui;

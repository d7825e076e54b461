pub mod caching;
pub mod chain;
pub mod rate_table;
pub mod util;
pub mod yahoo;

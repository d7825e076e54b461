//! Currency catalog and rate-source abstractions

use crate::core::error::TripError;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Returns how many units of `to` one unit of `from` buys.
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;

    /// Monotonic counter bumped whenever the underlying rate data changes.
    fn version(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub flag: Option<String>,
}

impl CurrencyInfo {
    pub fn new(code: &str, name: &str, symbol: &str, flag: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            flag: flag.map(str::to_string),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.code.to_lowercase().contains(needle) || self.name.to_lowercase().contains(needle)
    }
}

/// Upper-cases a currency code after checking it is 3 to 5 ASCII letters.
pub fn normalize_code(code: &str) -> Result<String, TripError> {
    let trimmed = code.trim();
    if (3..=5).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(TripError::InvalidCurrencyCode(code.to_string()))
    }
}

const POPULAR_CODES: [&str; 8] = ["USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY"];

const BUILT_IN: &[(&str, &str, &str, &str)] = &[
    ("USD", "US Dollar", "$", "🇺🇸"),
    ("EUR", "Euro", "€", "🇪🇺"),
    ("GBP", "British Pound", "£", "🇬🇧"),
    ("JPY", "Japanese Yen", "¥", "🇯🇵"),
    ("AUD", "Australian Dollar", "A$", "🇦🇺"),
    ("CAD", "Canadian Dollar", "C$", "🇨🇦"),
    ("CHF", "Swiss Franc", "CHF", "🇨🇭"),
    ("CNY", "Chinese Yuan", "¥", "🇨🇳"),
    ("AED", "UAE Dirham", "د.إ", "🇦🇪"),
    ("ARS", "Argentine Peso", "$", "🇦🇷"),
    ("BRL", "Brazilian Real", "R$", "🇧🇷"),
    ("CZK", "Czech Koruna", "Kč", "🇨🇿"),
    ("DKK", "Danish Krone", "kr", "🇩🇰"),
    ("EGP", "Egyptian Pound", "E£", "🇪🇬"),
    ("HKD", "Hong Kong Dollar", "HK$", "🇭🇰"),
    ("HUF", "Hungarian Forint", "Ft", "🇭🇺"),
    ("IDR", "Indonesian Rupiah", "Rp", "🇮🇩"),
    ("ILS", "Israeli New Shekel", "₪", "🇮🇱"),
    ("INR", "Indian Rupee", "₹", "🇮🇳"),
    ("ISK", "Icelandic Krona", "kr", "🇮🇸"),
    ("KRW", "South Korean Won", "₩", "🇰🇷"),
    ("MAD", "Moroccan Dirham", "DH", "🇲🇦"),
    ("MXN", "Mexican Peso", "$", "🇲🇽"),
    ("MYR", "Malaysian Ringgit", "RM", "🇲🇾"),
    ("NOK", "Norwegian Krone", "kr", "🇳🇴"),
    ("NZD", "New Zealand Dollar", "NZ$", "🇳🇿"),
    ("PHP", "Philippine Peso", "₱", "🇵🇭"),
    ("PLN", "Polish Zloty", "zł", "🇵🇱"),
    ("SEK", "Swedish Krona", "kr", "🇸🇪"),
    ("SGD", "Singapore Dollar", "S$", "🇸🇬"),
    ("THB", "Thai Baht", "฿", "🇹🇭"),
    ("TRY", "Turkish Lira", "₺", "🇹🇷"),
    ("VND", "Vietnamese Dong", "₫", "🇻🇳"),
    ("ZAR", "South African Rand", "R", "🇿🇦"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencySections {
    pub popular: Vec<CurrencyInfo>,
    pub all: Vec<CurrencyInfo>,
}

/// Static currency metadata, optionally extended with user-defined entries.
#[derive(Debug, Clone)]
pub struct CurrencyCatalog {
    entries: Vec<CurrencyInfo>,
}

impl CurrencyCatalog {
    pub fn built_in() -> Self {
        Self {
            entries: BUILT_IN
                .iter()
                .map(|(code, name, symbol, flag)| CurrencyInfo::new(code, name, symbol, Some(flag)))
                .collect(),
        }
    }

    /// Built-in catalog merged with `custom`. Fails on the first duplicate or malformed code.
    pub fn with_custom(custom: Vec<CurrencyInfo>) -> Result<Self, TripError> {
        let mut catalog = Self::built_in();
        for info in custom {
            catalog.add_custom(info)?;
        }
        Ok(catalog)
    }

    pub fn add_custom(&mut self, mut info: CurrencyInfo) -> Result<(), TripError> {
        info.code = normalize_code(&info.code)?;
        if self.get(&info.code).is_some() {
            return Err(TripError::DuplicateCurrency(info.code));
        }
        self.entries.push(info);
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<&CurrencyInfo> {
        let code = code.trim();
        self.entries
            .iter()
            .find(|info| info.code.eq_ignore_ascii_case(code))
    }

    pub fn search(&self, query: &str) -> Vec<CurrencyInfo> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|info| needle.is_empty() || info.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn sections(&self) -> CurrencySections {
        CurrencySections {
            popular: POPULAR_CODES
                .iter()
                .filter_map(|code| self.get(code).cloned())
                .collect(),
            all: self.entries.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CurrencyCatalog {
    fn default() -> Self {
        Self::built_in()
    }
}

//! SQL-like statements issued against the prediction backend.

use chrono::{Duration, NaiveDate};

pub const DEFAULT_MODEL: &str = "crypto_predictor_new";
pub const DEFAULT_TABLE: &str = "crypto_prices";

/// Trailing window, in days, for the `show` history query
pub const HISTORY_WINDOW_DAYS: i64 = 170;

/// Names of the forecasting model and the price table the statements target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCatalog {
    pub model: String,
    pub table: String,
}

impl Default for QueryCatalog {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl QueryCatalog {
    pub fn new(model: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            table: table.into(),
        }
    }

    /// Prediction join from the latest training timestamp forward,
    /// optionally restricted to one coin.
    pub fn predictions(&self, crypto_name: Option<&str>) -> String {
        let base = format!(
            "SELECT Pred.close, Pred.date, Pred.crypto_name FROM mindsdb.{} as Pred JOIN files.{} as Train WHERE Train.date > LATEST",
            self.model, self.table
        );
        match crypto_name {
            Some(name) => format!("{} AND Train.crypto_name={};", base, quote_literal(name)),
            None => base,
        }
    }

    /// Price history of one coin strictly after `since`.
    pub fn history_since(&self, crypto_name: &str, since: NaiveDate) -> String {
        format!(
            "SELECT * FROM files.{} WHERE date > {} AND crypto_name={};",
            self.table,
            quote_literal(&since.format("%Y-%m-%d").to_string()),
            quote_literal(crypto_name)
        )
    }

    pub fn distinct_names(&self) -> String {
        format!("SELECT DISTINCT crypto_name FROM files.{};", self.table)
    }
}

/// Start of the `show` window ending on `today`.
pub fn history_window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(HISTORY_WINDOW_DAYS)
}

/// Single-quoted SQL string literal with embedded quotes doubled.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

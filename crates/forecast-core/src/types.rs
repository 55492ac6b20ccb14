use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ForecastError, ForecastResult};

/// One row of the prediction (or price history) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub crypto_name: String,
    pub date: String,
    pub close: f64,
}

/// A `{date, close}` pair as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub close: f64,
}

impl From<&PredictionRow> for PricePoint {
    fn from(row: &PredictionRow) -> Self {
        Self {
            date: row.date.clone(),
            close: row.close,
        }
    }
}

/// Per-coin entry of the top-growth listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEntry {
    pub crypto_name: String,
    pub crypto_code: Option<String>,
    pub img_url: String,
    /// Running pairwise average of `close` in row order.
    pub growth_rate: f64,
    pub values: Vec<PricePoint>,
}

/// What the chat prompt asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Show,
    Predict,
}

impl QueryMode {
    /// `show` selects history; every other value falls back to a prediction.
    pub fn from_field(field: &str) -> Self {
        if field.trim().eq_ignore_ascii_case("show") {
            QueryMode::Show
        } else {
            QueryMode::Predict
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Show => "show",
            QueryMode::Predict => "predict",
        }
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured form of a generated completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPrompt {
    pub mode: QueryMode,
    pub crypto_name: String,
    pub date: String,
    pub amount: String,
    pub summary: String,
}

/// Tabular result of a SQL-like query: named columns, positional cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive column lookup. Qualified names such as `Pred.close`
    /// also match on their last segment.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .or_else(|| {
                self.columns.iter().position(|c| {
                    c.rsplit('.')
                        .next()
                        .map(|tail| tail.eq_ignore_ascii_case(name))
                        .unwrap_or(false)
                })
            })
    }

    fn require_column(&self, name: &str) -> ForecastResult<usize> {
        self.column_index(name).ok_or_else(|| {
            ForecastError::MalformedTable(format!(
                "missing column '{}' (got: {})",
                name,
                self.columns.join(", ")
            ))
        })
    }

    /// Decode rows carrying `crypto_name`, `date` and `close`.
    ///
    /// Rows whose cells cannot be decoded are skipped.
    pub fn prediction_rows(&self) -> ForecastResult<Vec<PredictionRow>> {
        if self.rows.is_empty() {
            return Ok(Vec::new());
        }
        let name_idx = self.require_column("crypto_name")?;
        let date_idx = self.require_column("date")?;
        let close_idx = self.require_column("close")?;

        let mut out = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let decoded = (
                row.get(name_idx).and_then(cell_as_string),
                row.get(date_idx).and_then(cell_as_string),
                row.get(close_idx).and_then(cell_as_f64),
            );
            match decoded {
                (Some(crypto_name), Some(date), Some(close)) => out.push(PredictionRow {
                    crypto_name,
                    date,
                    close,
                }),
                _ => tracing::warn!("Skipping undecodable prediction row {}: {:?}", i, row),
            }
        }
        Ok(out)
    }

    /// Decode `{date, close}` pairs, ignoring every other column.
    pub fn price_points(&self) -> ForecastResult<Vec<PricePoint>> {
        if self.rows.is_empty() {
            return Ok(Vec::new());
        }
        let date_idx = self.require_column("date")?;
        let close_idx = self.require_column("close")?;

        let mut out = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            match (
                row.get(date_idx).and_then(cell_as_string),
                row.get(close_idx).and_then(cell_as_f64),
            ) {
                (Some(date), Some(close)) => out.push(PricePoint { date, close }),
                _ => tracing::warn!("Skipping undecodable price row {}: {:?}", i, row),
            }
        }
        Ok(out)
    }

    /// All non-null string cells of one column, in row order.
    pub fn string_column(&self, name: &str) -> ForecastResult<Vec<String>> {
        if self.rows.is_empty() {
            return Ok(Vec::new());
        }
        let idx = self.require_column(name)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.get(idx).and_then(cell_as_string))
            .collect())
    }
}

fn cell_as_string(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite numbers only; `"NaN"` and `"inf"` strings are rejected.
fn cell_as_f64(cell: &Value) -> Option<f64> {
    let value = match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> QueryTable {
        QueryTable::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn test_column_index_matches_qualified_names() {
        let t = table(&["Pred.close", "Pred.date", "CRYPTO_NAME"], vec![]);
        assert_eq!(t.column_index("close"), Some(0));
        assert_eq!(t.column_index("date"), Some(1));
        assert_eq!(t.column_index("crypto_name"), Some(2));
        assert_eq!(t.column_index("volume"), None);
    }

    #[test]
    fn test_prediction_rows_decode_numbers_and_strings() {
        let t = table(
            &["close", "date", "crypto_name"],
            vec![
                vec![json!(101.5), json!("2024-01-01"), json!("Bitcoin")],
                vec![json!("99.25"), json!("2024-01-02"), json!("Bitcoin")],
            ],
        );
        let rows = t.prediction_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].close, 101.5);
        assert_eq!(rows[1].close, 99.25);
        assert_eq!(rows[1].date, "2024-01-02");
    }

    #[test]
    fn test_prediction_rows_skip_bad_cells() {
        let t = table(
            &["close", "date", "crypto_name"],
            vec![
                vec![json!(null), json!("2024-01-01"), json!("Bitcoin")],
                vec![json!(3.0), json!("2024-01-02"), json!("Ethereum")],
            ],
        );
        let rows = t.prediction_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].crypto_name, "Ethereum");
    }

    #[test]
    fn test_non_finite_closes_are_skipped() {
        let t = table(
            &["close", "date", "crypto_name"],
            vec![
                vec![json!("NaN"), json!("2024-01-01"), json!("Bitcoin")],
                vec![json!("inf"), json!("2024-01-01"), json!("Ethereum")],
                vec![json!("-inf"), json!("2024-01-01"), json!("Solana")],
                vec![json!("4.5"), json!("2024-01-01"), json!("Litecoin")],
            ],
        );
        let rows = t.prediction_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].crypto_name, "Litecoin");

        let points = t.price_points().unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].close, 4.5);
    }

    #[test]
    fn test_missing_column_is_an_error_only_with_rows() {
        let empty = table(&["close"], vec![]);
        assert!(empty.prediction_rows().unwrap().is_empty());

        let t = table(&["close"], vec![vec![json!(1.0)]]);
        assert!(matches!(
            t.prediction_rows(),
            Err(ForecastError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_price_points_ignore_extra_columns() {
        let t = table(
            &["date", "open", "close", "crypto_name"],
            vec![vec![json!("2024-03-01"), json!(1.0), json!(2.0), json!("XRP")]],
        );
        let points = t.price_points().unwrap();
        assert_eq!(
            points,
            vec![PricePoint {
                date: "2024-03-01".into(),
                close: 2.0
            }]
        );
    }

    #[test]
    fn test_query_mode_from_field() {
        assert_eq!(QueryMode::from_field("show"), QueryMode::Show);
        assert_eq!(QueryMode::from_field("Show"), QueryMode::Show);
        assert_eq!(QueryMode::from_field("predict"), QueryMode::Predict);
        assert_eq!(QueryMode::from_field("forecast"), QueryMode::Predict);
        assert_eq!(serde_json::to_value(QueryMode::Show).unwrap(), json!("show"));
    }
}

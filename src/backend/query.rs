//! Backend-neutral description of record-store reads and writes.
//!
//! Mirrors the handful of PostgREST modifiers the dashboard uses: `eq`, `gte`
//! and `lte` filters, a single `order`, `limit`, exact counts and embedded
//! resources in the column list.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

impl FilterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Query-string pair in PostgREST form, e.g. `("status", "eq.active")`.
    pub fn to_param(&self) -> (String, String) {
        (
            self.column.clone(),
            format!("{}.{}", self.op.as_str(), value_text(&self.value)),
        )
    }

    /// Evaluates the filter against a row held in memory.
    pub fn matches(&self, row: &Value) -> bool {
        let Some(actual) = row.get(&self.column) else {
            return false;
        };

        match (self.op, compare_values(actual, &self.value)) {
            (FilterOp::Eq, Some(ordering)) => ordering == Ordering::Equal,
            (FilterOp::Gte, Some(ordering)) => ordering != Ordering::Less,
            (FilterOp::Lte, Some(ordering)) => ordering != Ordering::Greater,
            (_, None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    pub count: bool,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
            count: false,
        }
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    fn filter(mut self, column: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Ask the backend for the total number of matching rows.
    pub fn exact_count(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.replace(' ', ""))];
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// A PATCH against every row matching `filters`.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub filters: Vec<Filter>,
    pub values: Value,
}

impl Update {
    pub fn table(table: impl Into<String>, values: Value) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            values,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op: FilterOp::Eq,
            value: value.into(),
        });
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        self.filters.iter().map(Filter::to_param).collect()
    }
}

/// Result of a select: the rows plus the exact count when one was requested.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    pub rows: Vec<Value>,
    pub count: Option<u64>,
}

impl Rows {
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        self.rows
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// First row, if any. Equivalent to a `maybeSingle` read.
    pub fn first<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self.rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// The exact count when present, otherwise the number of rows returned.
    pub fn total(&self) -> u64 {
        self.count.unwrap_or(self.rows.len() as u64)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Orders two JSON scalars the way the database would: numbers numerically,
/// timestamps and dates chronologically, everything else as text.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(compare_text(x, y)),
        (Value::Number(x), Value::String(y)) => x.as_f64()?.partial_cmp(&y.parse::<f64>().ok()?),
        (Value::String(x), Value::Number(y)) => x.parse::<f64>().ok()?.partial_cmp(&y.as_f64()?),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    if let (Ok(x), Ok(y)) = (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        return x.cmp(&y);
    }
    if let (Ok(x), Ok(y)) = (
        NaiveDate::parse_from_str(a, "%Y-%m-%d"),
        NaiveDate::parse_from_str(b, "%Y-%m-%d"),
    ) {
        return x.cmp(&y);
    }
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_postgrest_params() {
        let query = Select::from("payments")
            .columns("*, members(full_name)")
            .eq("status", "successful")
            .gte("payment_date", "2026-10-01T00:00:00Z")
            .order("payment_date", false)
            .limit(20);

        assert_eq!(
            query.to_params(),
            vec![
                ("select".to_string(), "*,members(full_name)".to_string()),
                ("status".to_string(), "eq.successful".to_string()),
                ("payment_date".to_string(), "gte.2026-10-01T00:00:00Z".to_string()),
                ("order".to_string(), "payment_date.desc".to_string()),
                ("limit".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn timestamps_compare_chronologically_across_precisions() {
        let row = json!({ "payment_date": "2026-10-31T23:59:59Z" });
        let upper = Filter {
            column: "payment_date".to_string(),
            op: FilterOp::Lte,
            value: json!("2026-10-31T23:59:59.999Z"),
        };
        assert!(upper.matches(&row));
    }

    #[test]
    fn dates_and_numbers_compare_by_value() {
        let row = json!({ "join_date": "2026-10-01", "amount": 50 });

        let joined = Filter {
            column: "join_date".to_string(),
            op: FilterOp::Gte,
            value: json!("2026-10-01"),
        };
        let cheap = Filter {
            column: "amount".to_string(),
            op: FilterOp::Lte,
            value: json!(49.99),
        };

        assert!(joined.matches(&row));
        assert!(!cheap.matches(&row));
    }

    #[test]
    fn missing_column_never_matches() {
        let filter = Filter {
            column: "status".to_string(),
            op: FilterOp::Eq,
            value: json!("active"),
        };
        assert!(!filter.matches(&json!({ "id": 1 })));
    }
}

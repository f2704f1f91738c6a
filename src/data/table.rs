//! Tabular station data
//!
//! Rows come from a [`TableSource`]: a fixed in-memory set, a local CSV file
//! or the hosted table query service. Cells stay untyped until a consumer
//! asks for a number.

use crate::core::config::OverlayConfig;
use crate::core::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::data::http::client_for_timeout;
use crate::{MapError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// The cell as text, the way the table service reports it
    pub fn value(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(text) => Cow::Borrowed(text.as_str()),
            CellValue::Number(number) => Cow::Owned(format_number(*number)),
        }
    }

    /// The cell as a finite number, if it is one
    pub fn as_f64(&self) -> Option<f64> {
        let number = match self {
            CellValue::Number(number) => *number,
            CellValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        number.is_finite().then_some(number)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(text) if text.trim().is_empty())
    }
}

/// Renders a number the way the table service's clients print it: plain
/// decimals between `1e-6` and `1e21`, exponent form outside, and no sign
/// on zero.
pub fn format_number(number: f64) -> String {
    if number == 0.0 {
        return "0".to_string();
    }
    if number.is_nan() {
        return "NaN".to_string();
    }
    if number.is_infinite() {
        let sign = if number < 0.0 { "-" } else { "" };
        return format!("{}Infinity", sign);
    }

    let magnitude = number.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return number.to_string();
    }

    let text = format!("{:e}", number);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::Text(text.to_string())
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        CellValue::Text(text)
    }
}

impl From<f64> for CellValue {
    fn from(number: f64) -> Self {
        CellValue::Number(number)
    }
}

/// One row of the overlay table, columns kept in source order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    fields: Vec<(String, CellValue)>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets a column, replacing an existing value
    pub fn insert(&mut self, column: &str, value: impl Into<CellValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Query describing which table feeds the overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    /// Location column of the layer
    pub select: String,
    /// Table key
    pub from: String,
    pub where_clause: Option<String>,
}

impl TableQuery {
    pub fn new(select: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            select: select.into(),
            from: from.into(),
            where_clause: None,
        }
    }

    pub fn with_where(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    /// SQL sent to the table service. All columns are requested since the
    /// click handler reads more than the location column.
    pub fn to_sql(&self) -> String {
        match &self.where_clause {
            Some(clause) => format!("SELECT * FROM {} WHERE {}", self.from, clause),
            None => format!("SELECT * FROM {}", self.from),
        }
    }
}

impl From<&OverlayConfig> for TableQuery {
    fn from(config: &OverlayConfig) -> Self {
        TableQuery::new(config.select.clone(), config.from.clone())
    }
}

/// Anything that can answer a [`TableQuery`] with rows
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch(&self, query: &TableQuery) -> Result<Vec<TableRow>>;

    /// Short label used in log messages
    fn describe(&self) -> String {
        "table source".to_string()
    }
}

/// Parses CSV with a header line into rows; every cell is kept as text
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<TableRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().map_err(MapError::from)?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(MapError::from)?;
        let mut row = TableRow::new();
        for (column, cell) in headers.iter().zip(record.iter()) {
            row.insert(column, cell);
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Serves a fixed set of rows regardless of the query
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableSource {
    rows: Vec<TableRow>,
}

impl InMemoryTableSource {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl TableSource for InMemoryTableSource {
    async fn fetch(&self, _query: &TableQuery) -> Result<Vec<TableRow>> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory table ({} rows)", self.rows.len())
    }
}

/// Reads rows from a local CSV export of the table
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    path: PathBuf,
}

impl CsvTableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TableSource for CsvTableSource {
    async fn fetch(&self, _query: &TableQuery) -> Result<Vec<TableRow>> {
        let path = self.path.clone();

        // File IO and parsing run on the blocking pool
        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&path).map_err(MapError::from)?;
            parse_csv(std::io::BufReader::new(file))
        })
        .await
        .map_err(|e| MapError::Runtime(format!("CSV load task failed: {}", e)))?
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}

/// Queries the hosted table service and parses its CSV answer
#[derive(Debug, Clone)]
pub struct HttpTableSource {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpTableSource {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            client: client_for_timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))?,
        })
    }

    pub fn from_config(config: &OverlayConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.api_key.clone())
    }

    fn query_params(&self, query: &TableQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("sql", query.to_sql()), ("alt", "csv".to_string())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        params
    }
}

#[async_trait]
impl TableSource for HttpTableSource {
    async fn fetch(&self, query: &TableQuery) -> Result<Vec<TableRow>> {
        log::debug!("Querying {} with `{}`", self.endpoint, query.to_sql());

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(MapError::from)?
            .error_for_status()
            .map_err(MapError::from)?;

        let body = response.text().await.map_err(MapError::from)?;
        log::debug!("Downloaded {} bytes from {}", body.len(), self.endpoint);

        parse_csv(body.as_bytes())
    }

    fn describe(&self) -> String {
        format!("table service {}", self.endpoint)
    }
}

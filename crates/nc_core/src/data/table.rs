//! Row-oriented race tables handed over by the external results loader.
//!
//! The engine never touches files itself; whoever loads the table (CSV
//! reader, test fixture) passes it in along with an identifier string that
//! carries the race distance as its last `_`-separated token, e.g.
//! `"02 Lillehammer 06122024 S24_25_10.0.csv"` → 10 km.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RaceError, Result};

/// One athlete's raw record: every column of the results sheet, queryable
/// by field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceRecord {
    fields: HashMap<String, String>,
}

impl RaceRecord {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Query a specific column.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// A whole results sheet: identifier, column names, and one row per entrant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceTable {
    identifier: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RaceTable {
    pub fn new(
        identifier: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self { identifier: identifier.into(), columns, rows }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Race distance in meters, decoded from the identifier suffix token.
    /// A missing token is fatal: the race cannot be constructed without it.
    pub fn distance_m(&self) -> Result<f64> {
        race_distance_m(&self.identifier)
    }

    /// Materialize row `idx` as a queryable record. Short rows simply lack
    /// the trailing columns.
    pub fn record(&self, idx: usize) -> RaceRecord {
        let fields = self
            .columns
            .iter()
            .zip(&self.rows[idx])
            .map(|(c, v)| (c.clone(), v.clone()))
            .collect();
        RaceRecord::new(fields)
    }

    pub fn records(&self) -> impl Iterator<Item = RaceRecord> + '_ {
        (0..self.rows.len()).map(|i| self.record(i))
    }
}

/// Decode `..._<km>.<ext>` (or `..._<km>`) into meters.
pub fn race_distance_m(identifier: &str) -> Result<f64> {
    let (_, token) = identifier
        .rsplit_once('_')
        .ok_or_else(|| RaceError::MissingDistance(identifier.to_string()))?;

    // The token is either the bare kilometer figure ("10.0") or carries a
    // file extension ("10.0.csv"); try the bare parse first.
    let km: f64 = match token.parse() {
        Ok(v) => v,
        Err(_) => token
            .rsplit_once('.')
            .and_then(|(stem, _ext)| stem.parse().ok())
            .ok_or_else(|| RaceError::MissingDistance(identifier.to_string()))?,
    };
    Ok(km * 1000.0)
}

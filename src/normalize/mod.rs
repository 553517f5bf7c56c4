// src/normalize/mod.rs
pub mod cell;
pub mod header;
pub mod scale;

use std::collections::HashSet;
use tracing::{debug, info};

pub use cell::{clean_str, Cell};
pub use header::HeaderLayout;
pub use scale::Scale;

use crate::config::LoadConfig;
use crate::error::LoadError;
use crate::source::RawTable;

/// One source row after normalization: a (country, variable, unit) series
/// plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Line of the source row, for diagnostics.
    pub line: usize,
    pub country: String,
    pub variable: String,
    /// Subject code such as `NGDP`, when the file has one.
    pub code: Option<String>,
    pub unit: String,
    /// Exposed as-is; values are never multiplied by it.
    pub scale: Option<Scale>,
    pub notes: Option<String>,
    /// ISO code printed in the file itself, if any.
    pub iso: Option<String>,
    pub estimates_start_after: Option<i32>,
    /// One entry per year of the owning [`NormalizedTable`].
    pub values: Vec<Option<f64>>,
}

/// The atomic fact: one value (or its absence) for a country, variable, unit
/// and year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation<'a> {
    pub country: &'a str,
    pub variable: &'a str,
    pub unit: &'a str,
    pub year: i32,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    /// Ascending, shared by every series.
    pub years: Vec<i32>,
    /// Source row order.
    pub series: Vec<Series>,
}

impl NormalizedTable {
    pub fn observations(&self) -> impl Iterator<Item = Observation<'_>> + '_ {
        self.series.iter().flat_map(move |s| {
            self.years
                .iter()
                .zip(&s.values)
                .map(move |(&year, &value)| Observation {
                    country: &s.country,
                    variable: &s.variable,
                    unit: &s.unit,
                    year,
                    value,
                })
        })
    }
}

fn optional(fields: &[String], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| fields.get(i))
        .map(|s| clean_str(s))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Turn raw records into series.
///
/// Blank rows and rows without country, variable or unit are footer noise and
/// are dropped. A year cell that is neither numeric nor a missing token aborts
/// the whole load.
pub fn normalize(raw: &RawTable, config: &LoadConfig) -> Result<NormalizedTable, LoadError> {
    let layout = HeaderLayout::from_headers(&raw.headers, &config.year_range)?;
    let years: Vec<i32> = layout.years.iter().map(|&(y, _)| y).collect();

    let mut series = Vec::with_capacity(raw.rows.len());
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut dropped = 0usize;

    for record in &raw.rows {
        let fields = &record.fields;
        let field = |idx: usize| fields.get(idx).map(|s| clean_str(s)).unwrap_or("");

        if fields.iter().all(|f| f.trim().is_empty()) {
            dropped += 1;
            continue;
        }
        let (country, variable, unit) = (
            field(layout.country),
            field(layout.variable),
            field(layout.unit),
        );
        if country.is_empty() || variable.is_empty() || unit.is_empty() {
            debug!(line = record.line, "dropping row without country/variable/unit");
            dropped += 1;
            continue;
        }

        let mut values = Vec::with_capacity(layout.years.len());
        for &(_, col) in &layout.years {
            let raw_cell = fields.get(col).map(String::as_str).unwrap_or("");
            match Cell::parse(raw_cell, config) {
                Cell::Number(v) => values.push(Some(v)),
                Cell::Missing => values.push(None),
                Cell::Invalid => {
                    return Err(LoadError::CellParse {
                        row: record.line,
                        column: clean_str(&raw.headers[col]).to_string(),
                        value: raw_cell.to_string(),
                    })
                }
            }
        }

        let key = (country.to_string(), variable.to_string(), unit.to_string());
        if !seen.insert(key.clone()) {
            let (country, variable, unit) = key;
            return Err(LoadError::DuplicateSeries {
                row: record.line,
                country,
                variable,
                unit,
            });
        }

        let estimates_start_after = match optional(fields, layout.estimates_start) {
            Some(s) => match s.parse::<i32>() {
                Ok(y) => Some(y),
                Err(_) => {
                    debug!(line = record.line, value = %s, "unparsable estimates year");
                    None
                }
            },
            None => None,
        };

        let (country, variable, unit) = key;
        series.push(Series {
            line: record.line,
            country,
            variable,
            code: optional(fields, layout.code),
            unit,
            scale: optional(fields, layout.scale).and_then(|s| Scale::parse(&s)),
            notes: optional(fields, layout.notes),
            iso: optional(fields, layout.iso),
            estimates_start_after,
            values,
        });
    }

    info!(
        series = series.len(),
        years = years.len(),
        dropped,
        "normalized table"
    );
    Ok(NormalizedTable { years, series })
}

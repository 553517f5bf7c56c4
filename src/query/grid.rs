// src/query/grid.rs

use arrow::array::{ArrayRef, Float64Builder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::CountryEntry;
use crate::error::QueryError;

/// Dense country × year table for one (variable, unit) pair.
///
/// Every country row has a slot for every year; gaps are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    variable: String,
    unit: String,
    countries: Vec<CountryEntry>,
    years: Vec<i32>,
    values: Vec<Vec<Option<f64>>>,
}

impl Grid {
    pub(crate) fn new(
        variable: &str,
        unit: &str,
        years: Vec<i32>,
        rows: Vec<(CountryEntry, Vec<Option<f64>>)>,
    ) -> Self {
        let (countries, values): (Vec<CountryEntry>, Vec<Vec<Option<f64>>>) = rows
            .into_iter()
            .map(|(c, mut v)| {
                v.resize(years.len(), None);
                (c, v)
            })
            .unzip();
        Self {
            variable: variable.to_string(),
            unit: unit.to_string(),
            countries,
            years,
            values,
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn countries(&self) -> &[CountryEntry] {
        &self.countries
    }

    pub fn country_names(&self) -> Vec<&str> {
        self.countries.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iso_codes(&self) -> Vec<Option<&str>> {
        self.countries.iter().map(|c| c.iso.as_deref()).collect()
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    fn country_idx(&self, country: &str) -> Option<usize> {
        self.countries.iter().position(|c| c.name == country)
    }

    fn year_idx(&self, year: i32) -> Option<usize> {
        self.years.iter().position(|&y| y == year)
    }

    /// `None` both for an unknown cell and for a known-but-missing value.
    pub fn value(&self, country: &str, year: i32) -> Option<f64> {
        let r = self.country_idx(country)?;
        let c = self.year_idx(year)?;
        self.values[r][c]
    }

    pub fn row(&self, country: &str) -> Option<&[Option<f64>]> {
        self.country_idx(country).map(|r| self.values[r].as_slice())
    }

    /// `(country, value)` for every country, in row order.
    pub fn column(&self, year: i32) -> Option<Vec<(&str, Option<f64>)>> {
        let c = self.year_idx(year)?;
        Some(
            self.countries
                .iter()
                .zip(&self.values)
                .map(|(country, row)| (country.name.as_str(), row[c]))
                .collect(),
        )
    }

    pub fn rows(&self) -> impl Iterator<Item = (&CountryEntry, &[Option<f64>])> + '_ {
        self.countries
            .iter()
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Rows whose ISO code is in `codes`, in the order of `codes`. Codes with
    /// no matching row are skipped.
    pub fn select_iso(&self, codes: &[&str]) -> Grid {
        let rows = codes
            .iter()
            .filter_map(|code| {
                self.countries
                    .iter()
                    .position(|c| c.iso.as_deref() == Some(*code))
            })
            .map(|r| (self.countries[r].clone(), self.values[r].clone()))
            .collect();
        Grid::new(&self.variable, &self.unit, self.years.clone(), rows)
    }

    /// `country: Utf8`, `iso: Utf8 (nullable)`, then one nullable `Float64`
    /// column per year named after the year. Variable and unit travel in the
    /// schema metadata.
    pub fn to_record_batch(&self) -> Result<RecordBatch, QueryError> {
        let mut fields = Vec::with_capacity(self.years.len() + 2);
        fields.push(Field::new("country", DataType::Utf8, false));
        fields.push(Field::new("iso", DataType::Utf8, true));
        for year in &self.years {
            fields.push(Field::new(year.to_string(), DataType::Float64, true));
        }
        let metadata = HashMap::from([
            ("variable".to_string(), self.variable.clone()),
            ("unit".to_string(), self.unit.clone()),
        ]);
        let schema = Arc::new(Schema::new(fields).with_metadata(metadata));

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.years.len() + 2);
        columns.push(Arc::new(StringArray::from(self.country_names())));
        columns.push(Arc::new(StringArray::from(self.iso_codes())));
        for c in 0..self.years.len() {
            let mut b = Float64Builder::with_capacity(self.values.len());
            for row in &self.values {
                b.append_option(row[c]);
            }
            columns.push(Arc::new(b.finish()));
        }

        RecordBatch::try_new(schema, columns).map_err(Into::into)
    }
}

// src/catalog/mod.rs
pub mod countries;

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

pub use countries::CountryTable;

use crate::normalize::NormalizedTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEntry {
    pub name: String,
    /// First subject code seen for this variable.
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryEntry {
    /// Name exactly as the file spells it.
    pub name: String,
    /// `None` when neither the reference table nor the file knows the code.
    pub iso: Option<String>,
}

/// Distinct variables, units and countries in first-seen order, plus the
/// `(variable, unit) → series` index the query layer filters with.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    variables: Vec<VariableEntry>,
    variable_pos: HashMap<String, usize>,
    units: Vec<String>,
    units_by_variable: HashMap<String, Vec<String>>,
    countries: Vec<CountryEntry>,
    country_pos: HashMap<String, usize>,
    series_by_key: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl Catalog {
    /// Reconciliation misses are never errors: the country keeps its name and
    /// gets a `None` code.
    pub fn build(table: &NormalizedTable, reference: &CountryTable) -> Self {
        let mut cat = Catalog::default();
        let mut seen_units: HashSet<&str> = HashSet::new();

        for (idx, s) in table.series.iter().enumerate() {
            match cat.variable_pos.get(&s.variable) {
                Some(&pos) => {
                    let entry = &mut cat.variables[pos];
                    if entry.code.is_none() {
                        entry.code = s.code.clone();
                    }
                }
                None => {
                    cat.variable_pos
                        .insert(s.variable.clone(), cat.variables.len());
                    cat.variables.push(VariableEntry {
                        name: s.variable.clone(),
                        code: s.code.clone(),
                    });
                }
            }

            if seen_units.insert(&s.unit) {
                cat.units.push(s.unit.clone());
            }
            let per_var = cat.units_by_variable.entry(s.variable.clone()).or_default();
            if !per_var.contains(&s.unit) {
                per_var.push(s.unit.clone());
            }

            match cat.country_pos.get(&s.country) {
                Some(&pos) => {
                    let entry = &mut cat.countries[pos];
                    if entry.iso.is_none() {
                        entry.iso = s.iso.clone();
                    }
                }
                None => {
                    let iso = reference
                        .lookup(&s.country)
                        .map(str::to_string)
                        .or_else(|| s.iso.clone());
                    cat.country_pos
                        .insert(s.country.clone(), cat.countries.len());
                    cat.countries.push(CountryEntry {
                        name: s.country.clone(),
                        iso,
                    });
                }
            }

            cat.series_by_key
                .entry(s.variable.clone())
                .or_default()
                .entry(s.unit.clone())
                .or_default()
                .push(idx);
        }

        let unmatched: Vec<&str> = cat
            .countries
            .iter()
            .filter(|c| c.iso.is_none())
            .map(|c| c.name.as_str())
            .collect();
        if !unmatched.is_empty() {
            debug!(?unmatched, "countries without ISO code");
        }
        info!(
            variables = cat.variables.len(),
            units = cat.units.len(),
            countries = cat.countries.len(),
            unmatched = unmatched.len(),
            "built catalog"
        );
        cat
    }

    pub fn variables(&self) -> &[VariableEntry] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&VariableEntry> {
        self.variable_pos.get(name).map(|&i| &self.variables[i])
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn has_unit(&self, unit: &str) -> bool {
        self.units.iter().any(|u| u == unit)
    }

    /// Units reported for `variable`, or `None` if the variable is unknown.
    pub fn units_for(&self, variable: &str) -> Option<&[String]> {
        self.units_by_variable.get(variable).map(Vec::as_slice)
    }

    pub fn countries(&self) -> &[CountryEntry] {
        &self.countries
    }

    pub fn country(&self, name: &str) -> Option<&CountryEntry> {
        self.country_pos.get(name).map(|&i| &self.countries[i])
    }

    /// Indices (source order) of the series for `(variable, unit)`.
    pub fn series_for(&self, variable: &str, unit: &str) -> &[usize] {
        self.series_by_key
            .get(variable)
            .and_then(|units| units.get(unit))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Countries whose name contains `needle`, case-insensitively.
    pub fn find_countries(&self, needle: &str) -> Vec<&CountryEntry> {
        let needle = needle.to_lowercase();
        self.countries
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Series;

    fn series(country: &str, variable: &str, unit: &str, iso: Option<&str>) -> Series {
        Series {
            line: 0,
            country: country.into(),
            variable: variable.into(),
            code: None,
            unit: unit.into(),
            scale: None,
            notes: None,
            iso: iso.map(Into::into),
            estimates_start_after: None,
            values: vec![Some(1.0)],
        }
    }

    fn table(series: Vec<Series>) -> NormalizedTable {
        NormalizedTable {
            years: vec![2018],
            series,
        }
    }

    #[test]
    fn first_seen_order() {
        let t = table(vec![
            series("Germany", "GDP", "USD", None),
            series("Germany", "Debt", "Percent of GDP", None),
            series("France", "GDP", "National currency", None),
            series("France", "GDP", "USD", None),
        ]);
        let cat = Catalog::build(&t, CountryTable::bundled());
        let vars: Vec<_> = cat.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(vars, vec!["GDP", "Debt"]);
        assert_eq!(cat.units(), ["USD", "Percent of GDP", "National currency"]);
        assert_eq!(
            cat.units_for("GDP").unwrap(),
            ["USD", "National currency"]
        );
        assert_eq!(cat.units_for("Nope"), None);
        assert_eq!(cat.series_for("GDP", "USD"), &[0, 3]);
        assert!(cat.series_for("GDP", "Percent of GDP").is_empty());
    }

    #[test]
    fn reconciliation_is_best_effort() {
        let t = table(vec![
            series("Germany", "GDP", "USD", None),
            series("Testland", "GDP", "USD", None),
            series("Kosovo", "GDP", "USD", None),
            series("Atlantis", "GDP", "USD", Some("ATL")),
        ]);
        let cat = Catalog::build(&t, CountryTable::bundled());
        assert_eq!(cat.country("Germany").unwrap().iso.as_deref(), Some("DEU"));
        assert_eq!(cat.country("Testland").unwrap().iso, None);
        assert_eq!(cat.country("Kosovo").unwrap().iso.as_deref(), Some("UVK"));
        assert_eq!(cat.country("Atlantis").unwrap().iso.as_deref(), Some("ATL"));
    }

    #[test]
    fn find_countries_by_substring() {
        let t = table(vec![
            series("Guinea", "GDP", "USD", None),
            series("Guinea-Bissau", "GDP", "USD", None),
            series("France", "GDP", "USD", None),
        ]);
        let cat = Catalog::build(&t, CountryTable::bundled());
        let names: Vec<_> = cat
            .find_countries("GUINEA")
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Guinea", "Guinea-Bissau"]);
    }
}

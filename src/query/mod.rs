// src/query/mod.rs
pub mod grid;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

pub use grid::Grid;

use crate::catalog::{Catalog, CountryEntry, CountryTable, VariableEntry};
use crate::config::{self, LoadConfig, UsdConversion};
use crate::error::{LoadError, QueryError};
use crate::normalize::{self, NormalizedTable, Observation, Series};
use crate::source::{self, RawTable, Source};

/// A loaded WEO dataset. Immutable once built; load again to refresh.
#[derive(Debug, Clone)]
pub struct Weo {
    table: NormalizedTable,
    catalog: Catalog,
    encoding: &'static str,
}

impl Weo {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::load(path.as_ref())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Self::load(bytes)
    }

    pub fn load(source: impl Into<Source>) -> Result<Self, LoadError> {
        Self::load_with(&source.into(), &LoadConfig::default())
    }

    #[tracing::instrument(level = "info", skip(source, config), fields(source = %source))]
    pub fn load_with(source: &Source, config: &LoadConfig) -> Result<Self, LoadError> {
        let raw = source::load_raw(source, config)?;
        let weo = Self::from_raw(&raw, config)?;
        info!(
            series = weo.table.series.len(),
            first_year = weo.table.years.first(),
            last_year = weo.table.years.last(),
            "loaded WEO table"
        );
        Ok(weo)
    }

    pub fn from_raw(raw: &RawTable, config: &LoadConfig) -> Result<Self, LoadError> {
        let table = normalize::normalize(raw, config)?;
        let catalog = Catalog::build(&table, CountryTable::bundled());
        Ok(Self {
            table,
            catalog,
            encoding: raw.encoding,
        })
    }

    /// Name of the encoding the source was decoded with.
    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    pub fn years(&self) -> &[i32] {
        &self.table.years
    }

    pub fn series(&self) -> &[Series] {
        &self.table.series
    }

    pub fn observations(&self) -> impl Iterator<Item = Observation<'_>> + '_ {
        self.table.observations()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Distinct variable names in first-seen order.
    pub fn variables(&self) -> Vec<&str> {
        self.catalog
            .variables()
            .iter()
            .map(|v| v.name.as_str())
            .collect()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableEntry> {
        self.catalog.variable(name)
    }

    /// All units, or only those reported for `variable` (exact match).
    pub fn units(&self, variable: Option<&str>) -> Result<Vec<&str>, QueryError> {
        let units = match variable {
            None => self.catalog.units(),
            Some(v) => self
                .catalog
                .units_for(v)
                .ok_or_else(|| QueryError::UnknownVariable(v.to_string()))?,
        };
        Ok(units.iter().map(String::as_str).collect())
    }

    pub fn countries(&self) -> &[CountryEntry] {
        self.catalog.countries()
    }

    /// Countries whose name contains `needle`, ignoring case.
    pub fn find_countries(&self, needle: &str) -> Vec<&CountryEntry> {
        self.catalog.find_countries(needle)
    }

    /// Code for an exact country name, else for the first substring match.
    pub fn iso_code(&self, country: &str) -> Option<&str> {
        match self.catalog.country(country) {
            Some(c) => c.iso.as_deref(),
            None => self
                .find_countries(country)
                .into_iter()
                .next()
                .and_then(|c| c.iso.as_deref()),
        }
    }

    fn matching_series(&self, variable: &str, unit: &str) -> Result<Vec<&Series>, QueryError> {
        let Some(units) = self.catalog.units_for(variable) else {
            return Err(QueryError::UnknownVariable(variable.to_string()));
        };
        let idx = self.catalog.series_for(variable, unit);
        if idx.is_empty() {
            if !self.catalog.has_unit(unit) {
                return Err(QueryError::UnknownUnit {
                    variable: variable.to_string(),
                    unit: unit.to_string(),
                    available: units.to_vec(),
                });
            }
            return Err(QueryError::NotFound(format!("`{variable}` in `{unit}`")));
        }
        Ok(idx.iter().map(|&i| &self.table.series[i]).collect())
    }

    /// Country × year grid for one variable in one unit.
    pub fn get(&self, variable: &str, unit: &str) -> Result<Grid, QueryError> {
        let rows = self
            .matching_series(variable, unit)?
            .into_iter()
            .map(|s| {
                let country = self
                    .catalog
                    .country(&s.country)
                    .cloned()
                    .unwrap_or_else(|| CountryEntry {
                        name: s.country.clone(),
                        iso: None,
                    });
                (country, s.values.clone())
            })
            .collect();
        Ok(Grid::new(variable, unit, self.table.years.clone(), rows))
    }

    fn year_idx(&self, year: i32) -> Option<usize> {
        self.table.years.iter().position(|&y| y == year)
    }

    /// GDP in U.S. dollars for `year`, from local-currency GDP and the
    /// implied exchange rate. See [`Weo::gdp_usd_with`].
    pub fn gdp_usd(&self, year: i32) -> Result<BTreeMap<String, f64>, QueryError> {
        self.gdp_usd_with(year, &UsdConversion::default())
    }

    /// `gdp_local / exchange_rate` per country.
    ///
    /// Countries lacking either value for `year` (or reporting a zero rate)
    /// are left out; a partial or empty map is a normal result. A year or a
    /// rate series absent from the file counts as missing for every country.
    /// Only a GDP series the file does not carry is an error.
    pub fn gdp_usd_with(
        &self,
        year: i32,
        conv: &UsdConversion,
    ) -> Result<BTreeMap<String, f64>, QueryError> {
        let gdp = self.matching_series(&conv.gdp_variable, &conv.gdp_unit)?;
        let Some(y) = self.year_idx(year) else {
            debug!(year, "year not in dataset, every country excluded");
            return Ok(BTreeMap::new());
        };
        let rates: HashMap<&str, Option<f64>> =
            match self.matching_series(&conv.rate_variable, &conv.rate_unit) {
                Ok(series) => series
                    .into_iter()
                    .map(|s| (s.country.as_str(), s.values[y]))
                    .collect(),
                Err(err) => {
                    debug!(year, "no exchange rate series: {}", err);
                    HashMap::new()
                }
            };

        let mut out = BTreeMap::new();
        for s in gdp {
            let local = s.values[y];
            let rate = rates.get(s.country.as_str()).copied().flatten();
            match (local, rate) {
                (Some(local), Some(rate)) if rate != 0.0 => {
                    out.insert(s.country.clone(), local / rate);
                }
                (Some(_), Some(_)) => {
                    debug!(country = %s.country, year, "zero exchange rate, skipped");
                }
                _ => {
                    let err = QueryError::NotFound(format!(
                        "{} for {} in {year}",
                        if local.is_none() { "GDP" } else { "exchange rate" },
                        s.country
                    ));
                    debug!(country = %s.country, "excluded: {}", err);
                }
            }
        }
        Ok(out)
    }

    /// GDP in U.S. dollars as printed in the file, largest first.
    pub fn gdp_usd_reported(&self, year: i32) -> Result<Vec<(String, f64)>, QueryError> {
        let grid = self.get(config::GDP_VARIABLE, config::US_DOLLARS)?;
        let column = grid
            .column(year)
            .ok_or_else(|| QueryError::NotFound(format!("year {year}")))?;
        let mut ranked: Vec<(String, f64)> = column
            .into_iter()
            .filter_map(|(c, v)| v.map(|v| (c.to_string(), v)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }

    /// Six-month U.S. dollar LIBOR by year.
    pub fn libor_usd(&self) -> Result<Vec<(i32, Option<f64>)>, QueryError> {
        let grid = self.get(config::LIBOR_VARIABLE, config::PERCENT)?;
        let usa = grid.select_iso(&["USA"]);
        let (_, row) = usa
            .rows()
            .next()
            .ok_or_else(|| QueryError::NotFound("LIBOR for USA".into()))?;
        Ok(usa.years().iter().copied().zip(row.iter().copied()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const FIXTURE: &str = "\
Country\tISO\tWEO Subject Code\tSubject Descriptor\tUnits\tScale\t2018\t2019\tEstimates Start After
Germany\tDEU\tNGDP\tGross domestic product, current prices\tNational currency\tBillions\t3,344.37\t3,449.05\t2018
Germany\tDEU\tNGDPD\tGross domestic product, current prices\tU.S. dollars\tBillions\t3,949.55\t3,863.34\t2018
Germany\tDEU\tENDA\tImplied exchange rate\tNational currency per U.S. dollar\tUnits\t0.847\t0.893\t2018
Japan\tJPN\tNGDP\tGross domestic product, current prices\tNational currency\tBillions\t547,125.50\t553,962.20\t2018
Japan\tJPN\tNGDPD\tGross domestic product, current prices\tU.S. dollars\tBillions\t4,954.81\t5,079.92\t2018
Japan\tJPN\tENDA\tImplied exchange rate\tNational currency per U.S. dollar\tUnits\t110.424\tn/a\t2018
Testland\t\tNGDP\tGross domestic product, current prices\tNational currency\tBillions\t100\t110\t2019
United States\tUSA\tFLIBOR6\tSix-month London interbank offered rate (LIBOR)\tPercent\t\t2.49\t2.33\t2018
\t\t\t\t\t\t\t\t
International Monetary Fund, World Economic Outlook Database, October 2019\t\t\t\t\t\t\t\t
";

    fn weo() -> Weo {
        Weo::from_bytes(FIXTURE.as_bytes()).unwrap()
    }

    #[test]
    fn lists_variables_and_units() -> Result<()> {
        let w = weo();
        assert_eq!(
            w.variables(),
            vec![
                "Gross domestic product, current prices",
                "Implied exchange rate",
                "Six-month London interbank offered rate (LIBOR)",
            ]
        );
        assert_eq!(
            w.units(Some("Gross domestic product, current prices"))?,
            vec!["National currency", "U.S. dollars"]
        );
        assert_eq!(w.units(None)?.len(), 4);
        assert_eq!(
            w.variable("Implied exchange rate").and_then(|v| v.code.as_deref()),
            Some("ENDA")
        );
        Ok(())
    }

    #[test]
    fn units_for_unknown_variable() {
        // lookups are case-sensitive
        let err = weo()
            .units(Some("gross domestic product, current prices"))
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownVariable(_)));
    }

    #[test]
    fn get_errors() {
        let w = weo();
        assert!(matches!(
            w.get("Nope", "Percent").unwrap_err(),
            QueryError::UnknownVariable(_)
        ));
        assert!(matches!(
            w.get("Implied exchange rate", "Furlongs").unwrap_err(),
            QueryError::UnknownUnit { .. }
        ));
        assert!(matches!(
            w.get("Implied exchange rate", "Percent").unwrap_err(),
            QueryError::NotFound(_)
        ));
    }

    #[test]
    fn get_builds_dense_grid() -> Result<()> {
        let w = weo();
        let g = w.get("Gross domestic product, current prices", "National currency")?;
        assert_eq!(g.country_names(), vec!["Germany", "Japan", "Testland"]);
        assert_eq!(g.years(), &[2018, 2019]);
        assert_eq!(g.value("Germany", 2018), Some(3344.37));
        assert_eq!(g.iso_codes(), vec![Some("DEU"), Some("JPN"), None]);
        Ok(())
    }

    #[test]
    fn gdp_usd_is_partial() -> Result<()> {
        let w = weo();
        let gdp = w.gdp_usd(2019)?;
        // Japan has no 2019 rate, Testland has no rate series at all
        assert_eq!(gdp.keys().collect::<Vec<_>>(), vec!["Germany"]);
        assert!((gdp["Germany"] - 3449.05 / 0.893).abs() < 1e-9);

        let gdp_2018 = w.gdp_usd(2018)?;
        assert_eq!(gdp_2018.len(), 2);
        assert!((gdp_2018["Japan"] - 547_125.50 / 110.424).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn gdp_usd_unknown_year_is_empty() -> Result<()> {
        assert!(weo().gdp_usd(1990)?.is_empty());
        Ok(())
    }

    #[test]
    fn gdp_usd_without_rate_series() -> Result<()> {
        let text = "country,variable,unit,2018,2019\n\
                    Testland,\"Gross domestic product, current prices\",National currency,100,110\n";
        let w = Weo::from_bytes(text.as_bytes())?;
        assert!(w.gdp_usd(2019)?.is_empty());

        // rate series present but the year is not
        let text = "country,variable,unit,2018\n\
                    Testland,\"Gross domestic product, current prices\",National currency,100\n\
                    Testland,Implied exchange rate,National currency per U.S. dollar,2\n";
        let w = Weo::from_bytes(text.as_bytes())?;
        assert!(w.gdp_usd(2019)?.is_empty());
        assert_eq!(w.gdp_usd(2018)?.get("Testland"), Some(&50.0));
        Ok(())
    }

    #[test]
    fn gdp_usd_missing_gdp_series_is_an_error() -> Result<()> {
        let text = "country,variable,unit,2019\n\
                    Testland,Implied exchange rate,National currency per U.S. dollar,2\n";
        let w = Weo::from_bytes(text.as_bytes())?;
        assert!(matches!(
            w.gdp_usd(2019).unwrap_err(),
            QueryError::UnknownVariable(_)
        ));
        Ok(())
    }

    #[test]
    fn gdp_usd_zero_rate_is_excluded() -> Result<()> {
        let text = "country,variable,unit,2019\n\
                    Aland,\"Gross domestic product, current prices\",National currency,100\n\
                    Bland,\"Gross domestic product, current prices\",National currency,300\n\
                    Aland,Implied exchange rate,National currency per U.S. dollar,0\n\
                    Bland,Implied exchange rate,National currency per U.S. dollar,3\n";
        let w = Weo::from_bytes(text.as_bytes())?;
        let gdp = w.gdp_usd(2019)?;
        assert_eq!(gdp.keys().collect::<Vec<_>>(), vec!["Bland"]);
        assert!(gdp.values().all(|v| v.is_finite()));
        assert_eq!(gdp["Bland"], 100.0);
        Ok(())
    }

    #[test]
    fn reported_gdp_is_ranked() -> Result<()> {
        let ranked = weo().gdp_usd_reported(2019)?;
        assert_eq!(ranked[0].0, "Japan");
        assert_eq!(ranked[1], ("Germany".to_string(), 3863.34));
        Ok(())
    }

    #[test]
    fn libor_for_usa() -> Result<()> {
        let libor = weo().libor_usd()?;
        assert_eq!(libor, vec![(2018, Some(2.49)), (2019, Some(2.33))]);
        Ok(())
    }

    #[test]
    fn country_helpers() {
        let w = weo();
        assert_eq!(w.iso_code("Germany"), Some("DEU"));
        assert_eq!(w.iso_code("united"), Some("USA"));
        assert_eq!(w.iso_code("Testland"), None);
        assert_eq!(w.find_countries("AN").len(), 3);
        assert_eq!(w.encoding(), "UTF-8");
    }

    #[test]
    fn series_metadata_is_exposed() {
        let w = weo();
        let s = &w.series()[0];
        assert_eq!(s.scale, Some(crate::Scale::Billions));
        assert_eq!(s.estimates_start_after, Some(2018));
        assert_eq!(s.code.as_deref(), Some("NGDP"));
    }
}

use std::ops::RangeInclusive;
use tracing::debug;

use super::cell::clean_str;
use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Country,
    Variable,
    Unit,
    Scale,
    Notes,
    Code,
    Iso,
    EstimatesStart,
}

/// Accepted labels per metadata column, already normalized by `normalize_label`.
const ALIASES: &[(Role, &[&str])] = &[
    (Role::Country, &["country"]),
    (Role::Variable, &["variable", "subject descriptor"]),
    (Role::Unit, &["unit", "units"]),
    (Role::Scale, &["scale"]),
    (
        Role::Notes,
        &["notes", "subject notes", "country/series-specific notes"],
    ),
    (Role::Code, &["weo subject code", "subject code", "code"]),
    (Role::Iso, &["iso"]),
    (Role::EstimatesStart, &["estimates start after"]),
];

/// Column positions discovered in the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    pub country: usize,
    pub variable: usize,
    pub unit: usize,
    pub scale: Option<usize>,
    pub notes: Option<usize>,
    pub code: Option<usize>,
    pub iso: Option<usize>,
    pub estimates_start: Option<usize>,
    /// `(year, column)` in ascending year order.
    pub years: Vec<(i32, usize)>,
}

fn normalize_label(label: &str) -> String {
    clean_str(label)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `Some(year)` when the label is four ASCII digits inside `range`.
pub fn parse_year(label: &str, range: &RangeInclusive<i32>) -> Option<i32> {
    let label = clean_str(label);
    if label.len() != 4 || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    label.parse().ok().filter(|y| range.contains(y))
}

impl HeaderLayout {
    pub fn from_headers(
        headers: &[String],
        year_range: &RangeInclusive<i32>,
    ) -> Result<Self, LoadError> {
        let mut found: Vec<(Role, usize)> = Vec::new();
        let mut years: Vec<(i32, usize)> = Vec::new();

        for (idx, raw) in headers.iter().enumerate() {
            if let Some(year) = parse_year(raw, year_range) {
                if years.iter().any(|&(y, _)| y == year) {
                    return Err(LoadError::Format(format!(
                        "year column {year} appears more than once"
                    )));
                }
                years.push((year, idx));
                continue;
            }

            let label = normalize_label(raw);
            let role = ALIASES
                .iter()
                .find(|(_, names)| names.contains(&label.as_str()))
                .map(|(role, _)| *role);
            match role {
                // first matching column wins
                Some(role) if !found.iter().any(|(r, _)| *r == role) => found.push((role, idx)),
                Some(role) => debug!(column = %raw, ?role, "duplicate metadata column ignored"),
                None => debug!(column = %raw, "ignoring unrecognised column"),
            }
        }

        let get = |role: Role| found.iter().find(|(r, _)| *r == role).map(|(_, i)| *i);
        let require = |role: Role, name: &str| {
            get(role).ok_or_else(|| LoadError::Format(format!("missing `{name}` column in header")))
        };

        if years.is_empty() {
            return Err(LoadError::Format(format!(
                "no year columns in header (expected 4-digit labels in {}..={})",
                year_range.start(),
                year_range.end()
            )));
        }
        years.sort_by_key(|&(y, _)| y);

        Ok(Self {
            country: require(Role::Country, "country")?,
            variable: require(Role::Variable, "variable")?,
            unit: require(Role::Unit, "unit")?,
            scale: get(Role::Scale),
            notes: get(Role::Notes),
            code: get(Role::Code),
            iso: get(Role::Iso),
            estimates_start: get(Role::EstimatesStart),
            years,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn weo_layout() {
        let h = headers(&[
            "WEO Country Code",
            "ISO",
            "WEO Subject Code",
            "Country",
            "Subject Descriptor",
            "Subject Notes",
            "Units",
            "Scale",
            "Country/Series-specific Notes",
            "1980",
            "1981",
            "Estimates Start After",
        ]);
        let layout = HeaderLayout::from_headers(&h, &(1980..=2100)).unwrap();
        assert_eq!(layout.country, 3);
        assert_eq!(layout.variable, 4);
        assert_eq!(layout.unit, 6);
        assert_eq!(layout.iso, Some(1));
        assert_eq!(layout.code, Some(2));
        assert_eq!(layout.notes, Some(5));
        assert_eq!(layout.scale, Some(7));
        assert_eq!(layout.estimates_start, Some(11));
        assert_eq!(layout.years, vec![(1980, 9), (1981, 10)]);
    }

    #[test]
    fn labels_are_case_and_space_tolerant() {
        let h = headers(&[" COUNTRY ", "Variable", "  units", "2019", "2018", "Notes"]);
        let layout = HeaderLayout::from_headers(&h, &(1980..=2100)).unwrap();
        assert_eq!((layout.country, layout.variable, layout.unit), (0, 1, 2));
        assert_eq!(layout.years, vec![(2018, 4), (2019, 3)]);
        assert_eq!(layout.notes, Some(5));
        assert_eq!(layout.scale, None);
    }

    #[test]
    fn years_outside_range_are_not_year_columns() {
        assert_eq!(parse_year("1979", &(1980..=2100)), None);
        assert_eq!(parse_year("2101", &(1980..=2100)), None);
        assert_eq!(parse_year("20x9", &(1980..=2100)), None);
        assert_eq!(parse_year("19800", &(1980..=2100)), None);
        assert_eq!(parse_year(" 2024 ", &(1980..=2100)), Some(2024));
    }

    #[test]
    fn missing_required_column() {
        let h = headers(&["country", "unit", "2018"]);
        let err = HeaderLayout::from_headers(&h, &(1980..=2100)).unwrap_err();
        assert!(err.to_string().contains("variable"));
    }

    #[test]
    fn no_year_columns() {
        let h = headers(&["country", "variable", "unit"]);
        assert!(matches!(
            HeaderLayout::from_headers(&h, &(1980..=2100)),
            Err(LoadError::Format(_))
        ));
    }

    #[test]
    fn duplicate_year_rejected() {
        let h = headers(&["country", "variable", "unit", "2018", "2018"]);
        assert!(HeaderLayout::from_headers(&h, &(1980..=2100)).is_err());
    }
}

// src/catalog/countries.rs

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::error;

/// `name,iso` rows; several spellings may map to one code.
const BUNDLED: &str = include_str!("../../data/countries.csv");

static REFERENCE: Lazy<CountryTable> = Lazy::new(|| {
    CountryTable::from_csv(BUNDLED).unwrap_or_else(|e| {
        error!("bundled country table is unreadable, reconciliation disabled: {}", e);
        CountryTable::default()
    })
});

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    name: String,
    iso: String,
}

/// Static country name → ISO alpha-3 lookup, tolerant to case and common
/// punctuation variants ("Bahamas, The" and "The Bahamas" hit the same row).
#[derive(Debug, Default, Clone)]
pub struct CountryTable {
    by_key: HashMap<String, String>,
}

/// Lowercase, fold accented Latin letters, `&` → `and`, drop `.,'’()`,
/// treat `-` and `/` as spaces, collapse whitespace, drop a leading or
/// trailing "the".
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('&', " and ");
    let cleaned: String = lowered
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '\'' | '’' | '(' | ')'))
        .map(|c| if c == '-' || c == '/' { ' ' } else { fold_accent(c) })
        .collect();
    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() > 1 && words.first() == Some(&"the") {
        words.remove(0);
    }
    if words.len() > 1 && words.last() == Some(&"the") {
        words.pop();
    }
    words.join(" ")
}

/// ASCII base letter for the lowercase accented forms found in country names.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

impl CountryTable {
    /// The table shipped in `data/countries.csv`.
    pub fn bundled() -> &'static CountryTable {
        &REFERENCE
    }

    pub fn from_csv(text: &str) -> Result<Self, csv::Error> {
        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let mut by_key = HashMap::new();
        for row in rdr.deserialize::<ReferenceRow>() {
            let row = row?;
            by_key
                .entry(normalize_name(&row.name))
                .or_insert_with(|| row.iso.trim().to_ascii_uppercase());
        }
        Ok(Self { by_key })
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.by_key.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

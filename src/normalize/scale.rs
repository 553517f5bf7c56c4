use std::fmt;

/// The value of the scale metadata column.
///
/// The loader never multiplies values by the scale: a "Billions" series keeps
/// the numbers exactly as printed in the file. Callers who want absolute
/// figures use [`Scale::multiplier`] themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Scale {
    Units,
    Thousands,
    Millions,
    Billions,
    Trillions,
    Other(String),
}

impl Scale {
    /// `None` for an empty label.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let scale = match label.to_ascii_lowercase().as_str() {
            "units" => Scale::Units,
            "thousands" => Scale::Thousands,
            "millions" => Scale::Millions,
            "billions" => Scale::Billions,
            "trillions" => Scale::Trillions,
            _ => Scale::Other(label.to_string()),
        };
        Some(scale)
    }

    pub fn multiplier(&self) -> Option<f64> {
        match self {
            Scale::Units => Some(1.0),
            Scale::Thousands => Some(1e3),
            Scale::Millions => Some(1e6),
            Scale::Billions => Some(1e9),
            Scale::Trillions => Some(1e12),
            Scale::Other(_) => None,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scale::Units => "Units",
            Scale::Thousands => "Thousands",
            Scale::Millions => "Millions",
            Scale::Billions => "Billions",
            Scale::Trillions => "Trillions",
            Scale::Other(s) => s,
        };
        f.write_str(s)
    }
}

use thiserror::Error;

/// Anything that aborts a load. No partially loaded table is ever exposed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fetching {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("input is not valid in any of the candidate encodings ({tried})")]
    Encoding { tried: String },

    #[error("format error: {0}")]
    Format(String),

    /// A cell that is neither numeric nor a missing-value token. This means the
    /// source layout changed, so the whole load fails.
    #[error("cannot parse cell at row {row}, column `{column}`: {value:?}")]
    CellParse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("duplicate series at row {row}: ({country}, {variable}, {unit}) already seen")]
    DuplicateSeries {
        row: usize,
        country: String,
        variable: String,
        unit: String,
    },
}

/// Errors scoped to a single query call.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("unknown unit `{unit}` for variable `{variable}`; reported units: {available:?}")]
    UnknownUnit {
        variable: String,
        unit: String,
        available: Vec<String>,
    },

    #[error("no observations for {0}")]
    NotFound(String),

    #[error("building record batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// src/source/mod.rs
pub mod delimiter;
pub mod encoding;

use csv::ReaderBuilder;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use url::Url;

use crate::config::LoadConfig;
use crate::error::LoadError;

/// Where the raw bytes come from.
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
    /// Fetched once with a blocking GET; retries are the caller's business.
    Url(Url),
}

impl Source {
    /// Treat `reference` as a URL if it parses as an `http(s)` one, otherwise
    /// as a local path.
    pub fn from_reference(reference: &str) -> Self {
        match Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Url(url),
            _ => Source::Path(PathBuf::from(reference)),
        }
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, LoadError> {
        match self {
            Source::Path(path) => std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.display().to_string(),
                source,
            }),
            Source::Bytes(bytes) => Ok(bytes.clone()),
            Source::Url(url) => fetch(url),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Source::Url(u) => write!(f, "{u}"),
        }
    }
}

impl From<&Path> for Source {
    fn from(p: &Path) -> Self {
        Source::Path(p.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(p: PathBuf) -> Self {
        Source::Path(p)
    }
}

impl From<Vec<u8>> for Source {
    fn from(b: Vec<u8>) -> Self {
        Source::Bytes(b)
    }
}

impl From<&[u8]> for Source {
    fn from(b: &[u8]) -> Self {
        Source::Bytes(b.to_vec())
    }
}

fn fetch(url: &Url) -> Result<Vec<u8>, LoadError> {
    let to_err = |e: reqwest::Error| LoadError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    };
    let resp = reqwest::blocking::get(url.as_str())
        .and_then(|r| r.error_for_status())
        .map_err(to_err)?;
    let bytes = resp.bytes().map_err(to_err)?;
    Ok(bytes.to_vec())
}

/// One source line, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the decoded text.
    pub line: usize,
    pub fields: Vec<String>,
}

#[derive(Debug)]
pub struct RawTable {
    /// Column labels from the first non-blank record.
    pub headers: Vec<String>,
    /// Every following record, blank ones included, in file order.
    pub rows: Vec<RawRecord>,
    pub encoding: &'static str,
    pub delimiter: u8,
}

/// Decode `bytes`, detect the delimiter and split into header + records.
pub fn parse_bytes(bytes: &[u8], config: &LoadConfig) -> Result<RawTable, LoadError> {
    let (text, enc) = encoding::decode(bytes, &config.encodings)?;
    if text.trim().is_empty() {
        return Err(LoadError::Format("input is empty".into()));
    }
    let delim = delimiter::detect(&text, &config.delimiters, config.sniff_lines)?;
    debug!(encoding = enc.name(), delimiter = %(delim as char).escape_default(), "sniffed");

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delim)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .map_err(|e| LoadError::Format(format!("CSV parse error at record {idx}: {e}")))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);
        let fields: Vec<String> = record.iter().map(str::to_string).collect();

        if headers.is_none() {
            if fields.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            headers = Some(fields);
        } else {
            rows.push(RawRecord { line, fields });
        }
    }

    let headers = headers.ok_or_else(|| LoadError::Format("no header row".into()))?;
    info!(
        columns = headers.len(),
        rows = rows.len(),
        encoding = enc.name(),
        "parsed raw table"
    );
    Ok(RawTable {
        headers,
        rows,
        encoding: enc.name(),
        delimiter: delim,
    })
}

/// Read the source and parse it into a [`RawTable`].
pub fn load_raw(source: &Source, config: &LoadConfig) -> Result<RawTable, LoadError> {
    let bytes = source.read_bytes()?;
    parse_bytes(&bytes, config)
}

//! Reader for IMF World Economic Outlook (WEO) country exports.
//!
//! Download the source file by hand, for example:
//!
//! ```text
//! curl -o weo.csv https://www.imf.org/external/pubs/ft/weo/2019/02/weodata/WEOOct2019all.xls
//! ```
//!
//! The "xls" the IMF ships is really tab-delimited ISO-8859-1 text; the loader
//! detects both the encoding and the delimiter.
//!
//! ```no_run
//! use weo::Weo;
//!
//! let weo = Weo::from_path("weo.csv")?;
//! for v in weo.variables() {
//!     println!("{v}");
//! }
//! let debt = weo.get("General government gross debt", "Percent of GDP")?;
//! let batch = debt.to_record_batch()?;
//! println!("{} countries x {} years", batch.num_rows(), debt.years().len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod normalize;
pub mod query;
pub mod source;

pub use catalog::{Catalog, CountryEntry, VariableEntry};
pub use config::{LoadConfig, UsdConversion};
pub use error::{LoadError, QueryError};
pub use normalize::{Observation, Scale, Series};
pub use query::{Grid, Weo};
pub use source::{RawTable, Source};

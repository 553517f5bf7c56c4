use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use weo::{Source, Weo};

/// Query an IMF World Economic Outlook export.
///
/// Download the file first, e.g.
/// curl -o weo.csv https://www.imf.org/external/pubs/ft/weo/2019/02/weodata/WEOOct2019all.xls
#[derive(Parser, Debug)]
#[command(name = "weo")]
struct Cli {
    /// Path or URL of the export
    #[arg(long, short, env = "WEO_PATH")]
    source: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List variables in first-seen order
    Variables,
    /// List units, optionally for one variable
    Units { variable: Option<String> },
    /// Print the country x year grid as TSV
    Get { variable: String, unit: String },
    /// GDP in USD from local currency and the implied exchange rate
    GdpUsd { year: i32 },
    /// Find countries by name
    Countries { needle: String },
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) parse args ───────────────────────────────────────────────
    let cli = Cli::parse();

    // ─── 3) load ─────────────────────────────────────────────────────
    let source = Source::from_reference(&cli.source);
    let weo = Weo::load(source).with_context(|| format!("loading {}", cli.source))?;
    info!(encoding = weo.encoding(), "ready");

    // ─── 4) answer ───────────────────────────────────────────────────
    match cli.command {
        Command::Variables => {
            for v in weo.variables() {
                println!("{v}");
            }
        }
        Command::Units { variable } => {
            for u in weo.units(variable.as_deref())? {
                println!("{u}");
            }
        }
        Command::Get { variable, unit } => {
            let grid = weo.get(&variable, &unit)?;
            let header: Vec<String> = grid.years().iter().map(|y| y.to_string()).collect();
            println!("country\tiso\t{}", header.join("\t"));
            for (country, row) in grid.rows() {
                let cells: Vec<String> = row
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
                    .collect();
                println!(
                    "{}\t{}\t{}",
                    country.name,
                    country.iso.as_deref().unwrap_or(""),
                    cells.join("\t")
                );
            }
        }
        Command::GdpUsd { year } => {
            let mut ranked: Vec<(String, f64)> = weo.gdp_usd(year)?.into_iter().collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            for (country, usd) in ranked {
                println!("{country}\t{usd:.3}");
            }
        }
        Command::Countries { needle } => {
            for c in weo.find_countries(&needle) {
                println!("{}\t{}", c.name, c.iso.as_deref().unwrap_or(""));
            }
        }
    }

    Ok(())
}

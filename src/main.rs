mod app;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use zipsnap_core::{AppError, Config, LocationError};
use zipsnap_geocode::{validate_postal_code, Country, LocationRecord, PatternCheck};
use zipsnap_store::{Export, ExportFormat};

use crate::app::App;

#[derive(Debug, Parser)]
#[command(name = "zipsnap", version, about = "Postal code lookup with history, favorites and export")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, env = "ZIPSNAP_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look up a postal code
    Lookup {
        country: Country,
        zip: String,
        /// Also export the result (json, csv or text)
        #[arg(long)]
        export: Option<ExportFormat>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Show recent searches, newest first
    History,
    /// Show saved favorites
    Favorites,
    /// Toggle the favorite flag on a history entry
    Favorite { index: usize },
    /// Look up several `country/zip` queries and show them side by side
    Compare {
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// Export a history entry
    Export {
        index: usize,
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Check a postal code against the known pattern for its country
    Validate { country: Country, zip: String },
    /// List supported countries
    Countries,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = zipsnap_core::init() {
        eprintln!("{}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            match &e {
                AppError::Location(err) => eprintln!("{} [{}]", err.user_message(), err.kind()),
                AppError::Other(err) => eprintln!("{:#}", err),
                other => eprintln!("{}", other.user_message()),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let app = match &cli.config {
        Some(path) => App::from_config(Config::load_from(path)?)?,
        None => App::new()?,
    };
    tracing::debug!("Data directory: {}", app.config().data_dir().display());
    let store = app.store();

    match cli.command {
        Command::Lookup {
            country,
            zip,
            export,
            out,
        } => {
            let record = store.lookup(country, &zip).await?;
            print_record(&record, store.is_favorite(&record));

            if let Some(format) = export {
                let export = store.export_active(format, Utc::now())?;
                let path = write_export(&out, &export)?;
                println!("Exported {} ({})", path.display(), export.mime_type);
            }
        }
        Command::History => {
            let history = store.history();
            if history.is_empty() {
                println!("No searches yet.");
            }
            for (index, record) in history.iter().enumerate() {
                print!("[{}] ", index);
                print_record(record, store.is_favorite(record));
            }
        }
        Command::Favorites => {
            let favorites = store.favorites();
            if favorites.is_empty() {
                println!("No favorites saved.");
            }
            for record in &favorites {
                print_record(record, true);
            }
        }
        Command::Favorite { index } => {
            let record = history_entry(&store.history(), index)?;
            store.toggle_favorite(&record);
            let state = if store.is_favorite(&record) {
                "Saved"
            } else {
                "Removed"
            };
            println!("{} {} {}", state, record.postal_code, record.country);
        }
        Command::Compare { queries } => {
            for query in &queries {
                let (country, zip) = parse_query(query)?;
                match store.lookup(country, zip).await {
                    Ok(record) if store.is_in_comparison(&record) => {
                        println!("{} is already in the comparison", query);
                    }
                    Ok(record) => store.add_to_comparison(record),
                    Err(e) => eprintln!("{}: {}", query, e.user_message()),
                }
            }

            for (index, record) in store.comparison().iter().enumerate() {
                print!("[{}] ", index);
                print_record(record, store.is_favorite(record));
            }
        }
        Command::Export { index, format, out } => {
            let record = history_entry(&store.history(), index)?;
            store.select(record);
            let export = store.export_active(format, Utc::now())?;
            let path = write_export(&out, &export)?;
            println!("Exported {} ({})", path.display(), export.mime_type);
        }
        Command::Validate { country, zip } => match validate_postal_code(country, &zip) {
            PatternCheck::Valid => println!("{} looks like a {} postal code", zip, country.name()),
            PatternCheck::Invalid => println!(
                "{} does not match the {} format (e.g. {})",
                zip,
                country.name(),
                country.placeholder()
            ),
            PatternCheck::Unchecked => {
                println!("No format check is available for {}", country.name())
            }
        },
        Command::Countries => {
            for country in Country::ALL {
                println!(
                    "{}  {:<14} e.g. {}",
                    country.code(),
                    country.name(),
                    country.placeholder()
                );
            }
        }
    }

    app.shutdown();
    Ok(())
}

fn history_entry(history: &[LocationRecord], index: usize) -> Result<LocationRecord, LocationError> {
    history
        .get(index)
        .cloned()
        .ok_or(LocationError::IndexOutOfRange {
            index,
            len: history.len(),
        })
}

/// Split a `country/zip` query such as `us/90210`.
fn parse_query(query: &str) -> anyhow::Result<(Country, &str)> {
    let (country, zip) = query
        .split_once('/')
        .with_context(|| format!("Expected country/zip, got '{}'", query))?;
    Ok((country.parse()?, zip))
}

fn print_record(record: &LocationRecord, favorite: bool) {
    let star = if favorite { " ★" } else { "" };
    println!(
        "{}, {} ({}){}",
        record.postal_code, record.country, record.country_abbreviation, star
    );

    for place in &record.places {
        let coords = match (&place.latitude, &place.longitude) {
            (Some(lat), Some(lon)) => format!("  {}, {}", lat, lon),
            _ => String::new(),
        };
        println!(
            "    {}, {} ({}){}",
            place.place_name, place.state, place.state_abbreviation, coords
        );
    }

    if let Some(url) = record.primary_place().and_then(|p| p.maps_url()) {
        println!("    {}", url);
    }
}

fn write_export(dir: &Path, export: &Export) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&export.file_name);
    std::fs::write(&path, &export.content)?;
    tracing::debug!("Wrote {} bytes to {}", export.content.len(), path.display());
    Ok(path)
}

//! Ingredient catalog seeder.
//!
//! Loads ingredient reference data from a CSV or JSON fixture into the
//! database. Entries already present (same name and unit) are skipped,
//! so the seeder can be re-run safely.
//!
//! Usage:
//! ```bash
//! # CSV fixture, one "name,unit" pair per line
//! cargo run --bin seed-ingredients -- data/ingredients.csv
//!
//! # JSON fixture, an array of {"name", "measurement_unit"} objects
//! cargo run --bin seed-ingredients -- data/ingredients.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use ladle_common::{Config, IdGenerator};
use ladle_db::entities::ingredient;
use ladle_db::repositories::IngredientRepository;
use sea_orm::ActiveValue::Set;
use serde::Deserialize;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "seed-ingredients",
    about = "Load the ingredient catalog from a CSV or JSON fixture"
)]
struct SeedArgs {
    /// Path to the fixture file (.csv or .json)
    file: PathBuf,
}

/// One catalog entry from a fixture file.
#[derive(Debug, PartialEq, Eq, Deserialize)]
struct IngredientEntry {
    name: String,
    measurement_unit: String,
}

/// Parse one CSV line of the form `name,unit`.
///
/// Ingredient names may themselves contain commas ("голубика, свежая или
/// замороженная"), so the unit is everything after the last comma.
fn parse_csv_line(line: &str) -> Option<IngredientEntry> {
    let (name, unit) = line.rsplit_once(',')?;
    let name = name.trim();
    let unit = unit.trim();

    if name.is_empty() || unit.is_empty() {
        return None;
    }

    Some(IngredientEntry {
        name: name.to_string(),
        measurement_unit: unit.to_string(),
    })
}

/// Parse a fixture file, picking the format from its extension.
fn parse_fixture(path: &Path, raw: &str) -> Result<Vec<IngredientEntry>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(raw)
            .with_context(|| format!("invalid JSON fixture {}", path.display())),
        Some("csv") => Ok(raw.lines().filter_map(parse_csv_line).collect()),
        _ => bail!(
            "unsupported fixture format for {}, expected .csv or .json",
            path.display()
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let entries = parse_fixture(&args.file, &raw)?;
    info!("Loaded {} entries from {}", entries.len(), args.file.display());

    let config = Config::load()?;
    let db = Arc::new(ladle_db::connect(&config.database).await?);
    ladle_db::migrate(&db).await?;

    let repo = IngredientRepository::new(db);
    let id_gen = IdGenerator::new();

    let mut created = 0usize;
    let mut skipped = 0usize;

    for entry in entries {
        if repo
            .find_by_name_and_unit(&entry.name, &entry.measurement_unit)
            .await?
            .is_some()
        {
            skipped += 1;
            continue;
        }

        repo.create(ingredient::ActiveModel {
            id: Set(id_gen.generate()),
            name: Set(entry.name),
            measurement_unit: Set(entry.measurement_unit),
        })
        .await?;
        created += 1;
    }

    info!("Seeding complete: {created} created, {skipped} already present");
    Ok(())
}

//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate};
use regex::Regex;
use sp_core::{ComponentCatalog, ComponentDefinition, SessionDraft};
use sp_db::Database;

use crate::Config;

/// Storage key of the draft being edited.
pub const DRAFT_KEY: &str = "current";

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^in\s+(\d+)\s+(day|week)s?$").unwrap());

/// Furthest ahead a relative date may point (~10 years).
const MAX_RELATIVE_DAYS: i64 = 3650;

/// Parse a session date as ISO 8601 or a relative phrase.
///
/// Supports:
/// - ISO 8601: "2026-10-20"
/// - Keywords: "today", "tomorrow"
/// - Relative: "in 3 days", "in 1 week"
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    match s {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(s) else {
        bail!(
            "Invalid date: {s}. Use ISO 8601 (e.g., 2026-10-20), 'today', 'tomorrow' or relative (e.g., 'in 3 days')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;
    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        bail!("Relative date too far ahead: {n} {}", &caps[2]);
    }

    Ok(today + Duration::days(n * days_per_unit))
}

/// Opens the configured database, creating its directory if needed.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Builds the effective catalog: built-ins, then stored, then configured components.
pub fn load_catalog(db: &Database, config: &Config) -> Result<ComponentCatalog> {
    let mut catalog = ComponentCatalog::builtin();
    for definition in db.list_components()? {
        catalog.register(definition);
    }
    for component in &config.components {
        let definition =
            ComponentDefinition::new(&component.id, component.name.clone(), component.weight)
                .with_context(|| format!("invalid component '{}' in config", component.id))?;
        catalog.register(definition);
    }
    Ok(catalog)
}

/// Loads the current draft, failing with a hint when there is none.
pub fn require_draft(db: &Database) -> Result<SessionDraft> {
    db.load_draft(DRAFT_KEY)?
        .context("no draft in progress; start one with 'sp draft new --total <minutes> <component>...'")
}

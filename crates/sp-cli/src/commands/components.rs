//! Components command for listing the effective catalog and storing
//! user-defined components.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use sp_core::{ComponentDefinition, ComponentId};

use super::util::{load_catalog, open_database};
use crate::Config;

#[derive(Debug, Args)]
pub struct ComponentsArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct AddComponentArgs {
    /// Component ID (e.g. rondos).
    pub id: ComponentId,
    /// Display name.
    #[arg(long)]
    pub name: String,
    /// Default share of the session, greater than 0 and at most 1.
    #[arg(long)]
    pub weight: f64,
}

#[derive(Debug, Serialize)]
struct ComponentEntry<'a> {
    id: &'a str,
    name: &'a str,
    weight: f64,
}

pub fn list<W: Write>(writer: &mut W, args: &ComponentsArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let catalog = load_catalog(&db, config)?;

    if args.json {
        let entries: Vec<_> = catalog
            .iter()
            .map(|d| ComponentEntry {
                id: d.id.as_str(),
                name: &d.display_name,
                weight: d.default_weight.value(),
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    writeln!(writer, "{:<12} {:<18} WEIGHT", "ID", "NAME")?;
    for definition in catalog.iter() {
        writeln!(
            writer,
            "{:<12} {:<18} {}",
            definition.id.as_str(),
            definition.display_name,
            definition.default_weight
        )?;
    }
    Ok(())
}

/// Stores a component in the database, replacing one with the same ID.
///
/// Components from the config file still take precedence when listed.
pub fn add<W: Write>(writer: &mut W, args: &AddComponentArgs, config: &Config) -> Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        bail!("component name cannot be empty");
    }
    let definition = ComponentDefinition::new(args.id.as_str(), name, args.weight)
        .with_context(|| format!("invalid component '{}'", args.id))?;

    let mut db = open_database(config)?;
    db.upsert_component(&definition)?;
    writeln!(
        writer,
        "Saved component {} ({}, weight {})",
        definition.id, definition.display_name, definition.default_weight
    )?;
    Ok(())
}

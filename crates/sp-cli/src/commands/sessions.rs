//! Sessions command for browsing saved sessions.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use sp_core::{ComponentCatalog, DrillCatalog};
use sp_db::{Database, StoredSession};

use super::util::{load_catalog, open_database};
use crate::Config;

#[derive(Debug, Args)]
pub struct ShowSessionArgs {
    /// Session ID as printed by 'sp sessions list'.
    pub id: String,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn list<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let sessions = db.list_sessions()?;

    if sessions.is_empty() {
        writeln!(writer, "No saved sessions.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<36}  {:<10}  {:>4}  {:>5}  NAME",
        "ID", "DATE", "MIN", "SLOTS"
    )?;
    for session in &sessions {
        let date = session
            .date
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        writeln!(
            writer,
            "{:<36}  {:<10}  {:>4}  {:>5}  {}",
            session.id.as_str(),
            date,
            session.total_duration,
            session.slot_count,
            session.name.as_deref().unwrap_or("(unnamed)")
        )?;
    }
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, args: &ShowSessionArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let session = db
        .load_session(args.id.trim())?
        .with_context(|| format!("session not found: {}", args.id))?;

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&session)?)?;
        return Ok(());
    }

    let catalog = load_catalog(&db, config)?;
    write!(writer, "{}", format_session(&session, &catalog, &db))?;
    Ok(())
}

/// Formats a saved session as a header and slot table.
pub fn format_session(session: &StoredSession, catalog: &ComponentCatalog, drills: &Database) -> String {
    let mut output = String::new();

    let name = session.meta.name.as_deref().unwrap_or("(unnamed)");
    match session.meta.date {
        Some(date) => writeln!(output, "Session: {name} ({date})").unwrap(),
        None => writeln!(output, "Session: {name}").unwrap(),
    }
    writeln!(output, "ID: {}", session.id).unwrap();
    writeln!(
        output,
        "Saved: {} UTC",
        session.created_at.format("%Y-%m-%d %H:%M")
    )
    .unwrap();
    writeln!(
        output,
        "Total: {} min, planned {} min",
        session.total_duration,
        session.plan.total_minutes()
    )
    .unwrap();
    writeln!(output).unwrap();

    writeln!(output, "{:<3}{:<20}{:>4}  DRILLS", "#", "COMPONENT", "MIN").unwrap();
    for (position, slot) in session.plan.slots.iter().enumerate() {
        let drill_names = if slot.drills.is_empty() {
            "-".to_string()
        } else {
            slot.drills
                .iter()
                .map(|id| drills.drill(id).map_or_else(|| id.to_string(), |d| d.name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(
            output,
            "{:<3}{:<20}{:>4}  {}",
            position,
            catalog.display_name(&slot.component_id),
            slot.duration,
            drill_names
        )
        .unwrap();
    }

    output
}

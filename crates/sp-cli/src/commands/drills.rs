//! Drills command for maintaining the drill catalog.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;
use sp_core::{Difficulty, Drill, DrillId};

use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct AddDrillArgs {
    /// Drill ID (e.g. rondo-4v1).
    pub id: DrillId,
    /// Display name.
    #[arg(long)]
    pub name: String,
    /// Typical running time in minutes.
    #[arg(long)]
    pub minutes: i64,
    /// beginner, intermediate or advanced.
    #[arg(long, default_value = "intermediate")]
    pub difficulty: Difficulty,
    /// Tag to attach (repeatable).
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct RemoveDrillArgs {
    /// Drill ID to remove.
    pub id: DrillId,
}

pub fn add<W: Write>(writer: &mut W, args: &AddDrillArgs, config: &Config) -> Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        bail!("drill name cannot be empty");
    }
    if args.minutes <= 0 {
        bail!("drill minutes must be positive, got {}", args.minutes);
    }

    let drill = Drill {
        id: args.id.clone(),
        name: name.to_string(),
        duration_minutes: args.minutes,
        difficulty: args.difficulty,
        tags: args
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    };

    let mut db = open_database(config)?;
    db.upsert_drill(&drill)?;
    writeln!(writer, "Saved drill {} ({})", drill.id, drill.name)?;
    Ok(())
}

/// Removes a drill from the catalog.
///
/// Drafts and saved sessions keep their references and show the raw ID.
pub fn remove<W: Write>(writer: &mut W, args: &RemoveDrillArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    if !db.delete_drill(&args.id)? {
        bail!("drill not found: {}", args.id);
    }
    writeln!(writer, "Removed drill {}", args.id)?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let drills = db.list_drills()?;

    if drills.is_empty() {
        writeln!(writer, "No drills yet. Add one with 'sp drills add <id> --name <name> --minutes <n>'.")?;
        return Ok(());
    }

    writeln!(writer, "{:<16} {:>3} {:<12} NAME", "ID", "MIN", "LEVEL")?;
    for drill in &drills {
        write!(
            writer,
            "{:<16} {:>3} {:<12} {}",
            drill.id.as_str(),
            drill.duration_minutes,
            drill.difficulty.as_str(),
            drill.name
        )?;
        if drill.tags.is_empty() {
            writeln!(writer)?;
        } else {
            writeln!(writer, " [{}]", drill.tags.join(", "))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn config(temp: &tempfile::TempDir) -> Config {
        Config {
            database_path: temp.path().join("sp.db"),
            require_drills: true,
            components: Vec::new(),
        }
    }

    fn args(id: &str, name: &str, minutes: i64, tags: &[&str]) -> AddDrillArgs {
        AddDrillArgs {
            id: DrillId::new(id).unwrap(),
            name: name.to_string(),
            minutes,
            difficulty: Difficulty::Intermediate,
            tags: tags.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn add_then_list() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        let mut output = Vec::new();

        add(&mut output, &args("rondo-4v1", "Rondo 4v1", 10, &["warmup", " "]), &config).unwrap();
        let mut advanced = args("pressing-6v4", "Pressing 6v4", 15, &[]);
        advanced.difficulty = Difficulty::Advanced;
        add(&mut output, &advanced, &config).unwrap();
        list(&mut output, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Saved drill rondo-4v1 (Rondo 4v1)
        Saved drill pressing-6v4 (Pressing 6v4)
        ID               MIN LEVEL        NAME
        pressing-6v4      15 advanced     Pressing 6v4
        rondo-4v1         10 intermediate Rondo 4v1 [warmup]
        ");
    }

    #[test]
    fn list_empty_catalog() {
        let temp = tempfile::tempdir().unwrap();
        let mut output = Vec::new();

        list(&mut output, &config(&temp)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("No drills yet."));
    }

    #[test]
    fn add_rejects_bad_values() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        let mut output = Vec::new();

        let err = add(&mut output, &args("x", "  ", 10, &[]), &config).unwrap_err();
        assert!(err.to_string().contains("drill name cannot be empty"));

        let err = add(&mut output, &args("x", "X", 0, &[]), &config).unwrap_err();
        assert!(err.to_string().contains("drill minutes must be positive"));
    }

    #[test]
    fn remove_drill() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        let mut output = Vec::new();
        add(&mut output, &args("rondo-4v1", "Rondo 4v1", 10, &[]), &config).unwrap();

        let remove_args = RemoveDrillArgs {
            id: DrillId::new("rondo-4v1").unwrap(),
        };
        remove(&mut output, &remove_args, &config).unwrap();
        let err = remove(&mut output, &remove_args, &config).unwrap_err();
        list(&mut output, &config).unwrap();

        assert_eq!(err.to_string(), "drill not found: rondo-4v1");
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Saved drill rondo-4v1 (Rondo 4v1)
        Removed drill rondo-4v1
        No drills yet. Add one with 'sp drills add <id> --name <name> --minutes <n>'.
        ");
    }
}

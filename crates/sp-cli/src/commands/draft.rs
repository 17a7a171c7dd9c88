//! Draft command for building and editing the current session.
//!
//! Every subcommand loads the stored draft, applies one edit, saves it back
//! and prints the result. Edits that don't apply (a position already at the
//! edge, a component not in the session) leave the draft unchanged and say so.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Args;
use serde::Serialize;
use sp_core::{ComponentCatalog, ComponentId, DrillCatalog, DrillId, SessionDraft, SessionMeta};
use sp_db::Database;

use super::util::{DRAFT_KEY, load_catalog, open_database, parse_date, require_draft};
use crate::Config;

#[derive(Debug, Args)]
pub struct NewDraftArgs {
    /// Session length in minutes.
    #[arg(long, allow_negative_numbers = true)]
    pub total: i64,
    /// Components in session order (e.g. warmup passing scrimmage).
    #[arg(required = true)]
    pub components: Vec<ComponentId>,
    /// Session name.
    #[arg(long)]
    pub name: Option<String>,
    /// Session date: YYYY-MM-DD, today, tomorrow, or "in N days".
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct AdjustArgs {
    /// Component to change.
    pub component: ComponentId,
    /// New duration in minutes.
    #[arg(allow_negative_numbers = true)]
    pub minutes: i64,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Position of the component (as shown by 'sp draft show').
    pub index: usize,
}

#[derive(Debug, Args)]
pub struct AttachArgs {
    /// Component to attach the drill to.
    pub component: ComponentId,
    /// Drill ID from the catalog.
    pub drill: DrillId,
}

#[derive(Debug, Args)]
pub struct DetachArgs {
    /// Component to remove the drill from.
    pub component: ComponentId,
    /// Position of the drill within the component.
    pub index: usize,
}

// ========== Commands ==========

/// Starts a new draft, replacing any draft in progress.
pub fn new<W: Write>(writer: &mut W, args: &NewDraftArgs, config: &Config) -> Result<()> {
    let date = args
        .date
        .as_deref()
        .map(|d| parse_date(d, Local::now().date_naive()))
        .transpose()?;
    let name = args
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from);

    let mut db = open_database(config)?;
    let catalog = load_catalog(&db, config)?;

    let draft = SessionDraft::new(args.total, &args.components, &catalog)?
        .with_meta(SessionMeta { name, date });
    if db.load_draft(DRAFT_KEY)?.is_some() {
        tracing::info!("replacing draft in progress");
    }
    db.save_draft(DRAFT_KEY, &draft)?;

    write!(writer, "{}", format_draft(&draft, &catalog, &db))?;
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, args: &ShowArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let catalog = load_catalog(&db, config)?;
    let draft = require_draft(&db)?;

    if args.json {
        let view = DraftView::new(&draft, &catalog);
        writeln!(writer, "{}", serde_json::to_string_pretty(&view)?)?;
    } else {
        write!(writer, "{}", format_draft(&draft, &catalog, &db))?;
    }
    Ok(())
}

pub fn adjust<W: Write>(writer: &mut W, args: &AdjustArgs, config: &Config) -> Result<()> {
    edit(writer, config, |draft| {
        if draft.allocation(&args.component).is_none() {
            return Err(format!("{} is not part of this session", args.component));
        }
        if draft.adjust_duration(&args.component, args.minutes) {
            Ok(())
        } else {
            Err(format!("{} already has that duration", args.component))
        }
    })
}

pub fn reset<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    edit(writer, config, |draft| {
        if draft.reset_to_baseline() {
            Ok(())
        } else {
            Err("durations already match the baseline".to_string())
        }
    })
}

pub fn move_up<W: Write>(writer: &mut W, args: &MoveArgs, config: &Config) -> Result<()> {
    edit(writer, config, |draft| {
        if draft.move_up(args.index) {
            Ok(())
        } else {
            Err(format!("position {} cannot move up", args.index))
        }
    })
}

pub fn move_down<W: Write>(writer: &mut W, args: &MoveArgs, config: &Config) -> Result<()> {
    edit(writer, config, |draft| {
        if draft.move_down(args.index) {
            Ok(())
        } else {
            Err(format!("position {} cannot move down", args.index))
        }
    })
}

pub fn attach<W: Write>(writer: &mut W, args: &AttachArgs, config: &Config) -> Result<()> {
    {
        let db = open_database(config)?;
        if db.drill(&args.drill).is_none() {
            bail!(
                "drill not found: {} (add it with 'sp drills add')",
                args.drill
            );
        }
    }
    edit(writer, config, |draft| {
        if draft.attach_drill(&args.component, args.drill.clone()) {
            Ok(())
        } else {
            Err(format!("{} is not part of this session", args.component))
        }
    })
}

pub fn detach<W: Write>(writer: &mut W, args: &DetachArgs, config: &Config) -> Result<()> {
    edit(writer, config, |draft| {
        if draft.detach_drill(&args.component, args.index).is_some() {
            Ok(())
        } else {
            Err(format!(
                "{} has no drill at position {}",
                args.component, args.index
            ))
        }
    })
}

pub fn renormalize<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    edit(writer, config, |draft| {
        draft.renormalize();
        Ok(())
    })
}

pub fn discard<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    if db.delete_draft(DRAFT_KEY)? {
        writeln!(writer, "Draft discarded.")?;
    } else {
        writeln!(writer, "No draft in progress.")?;
    }
    Ok(())
}

/// Loads the draft, applies `apply`, and saves it when it reports a change.
///
/// `apply` returns `Err(reason)` for a no-op; the reason is printed and the
/// stored draft is left untouched.
fn edit<W, F>(writer: &mut W, config: &Config, apply: F) -> Result<()>
where
    W: Write,
    F: FnOnce(&mut SessionDraft) -> Result<(), String>,
{
    let mut db = open_database(config)?;
    let catalog = load_catalog(&db, config)?;
    let mut draft = require_draft(&db)?;

    match apply(&mut draft) {
        Ok(()) => {
            db.save_draft(DRAFT_KEY, &draft)
                .context("failed to save draft")?;
        }
        Err(reason) => {
            tracing::debug!(%reason, "draft edit was a no-op");
            writeln!(writer, "Unchanged: {reason}")?;
        }
    }

    write!(writer, "{}", format_draft(&draft, &catalog, &db))?;
    Ok(())
}

// ========== Output ==========

/// Formats a draft as a table with the balance line.
pub fn format_draft(draft: &SessionDraft, catalog: &ComponentCatalog, drills: &Database) -> String {
    let mut output = String::new();

    let name = draft.meta.name.as_deref().unwrap_or("(unnamed)");
    match draft.meta.date {
        Some(date) => writeln!(output, "Session: {name} ({date})").unwrap(),
        None => writeln!(output, "Session: {name}").unwrap(),
    }
    writeln!(
        output,
        "Total: {} min, allocated {} min ({})",
        draft.total_duration,
        draft.allocated(),
        draft.balance()
    )
    .unwrap();
    writeln!(output).unwrap();

    writeln!(
        output,
        "{:<3}{:<20}{:>4}  {:>4}  DRILLS",
        "#", "COMPONENT", "MIN", "BASE"
    )
    .unwrap();
    for (index, allocation) in draft.allocations.iter().enumerate() {
        let drill_names = if allocation.drills.is_empty() {
            "-".to_string()
        } else {
            allocation
                .drills
                .iter()
                .map(|id| drills.drill(id).map_or_else(|| id.to_string(), |d| d.name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(
            output,
            "{:<3}{:<20}{:>4}  {:>4}  {}",
            index,
            catalog.display_name(&allocation.component_id),
            allocation.duration,
            allocation.baseline_duration,
            drill_names
        )
        .unwrap();
    }

    output
}

/// JSON shape of a draft.
#[derive(Debug, Serialize)]
struct DraftView<'a> {
    name: Option<&'a str>,
    date: Option<String>,
    total_duration: i64,
    allocated: i64,
    /// Positive when over the session length.
    balance: i64,
    settled: bool,
    slots: Vec<SlotView<'a>>,
}

#[derive(Debug, Serialize)]
struct SlotView<'a> {
    index: usize,
    component_id: &'a str,
    component_name: &'a str,
    duration: i64,
    baseline_duration: i64,
    drills: Vec<&'a str>,
}

impl<'a> DraftView<'a> {
    fn new(draft: &'a SessionDraft, catalog: &'a ComponentCatalog) -> Self {
        Self {
            name: draft.meta.name.as_deref(),
            date: draft.meta.date.map(|d| d.to_string()),
            total_duration: draft.total_duration,
            allocated: draft.allocated(),
            balance: draft.balance().signed_minutes(),
            settled: draft.is_settled(),
            slots: draft
                .allocations
                .iter()
                .map(|a| SlotView {
                    index: a.order_index,
                    component_id: a.component_id.as_str(),
                    component_name: catalog.display_name(&a.component_id),
                    duration: a.duration,
                    baseline_duration: a.baseline_duration,
                    drills: a.drills.iter().map(DrillId::as_str).collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use sp_core::{Difficulty, Drill};

    fn config(temp: &tempfile::TempDir) -> Config {
        Config {
            database_path: temp.path().join("sp.db"),
            require_drills: true,
            components: Vec::new(),
        }
    }

    fn cid(s: &str) -> ComponentId {
        ComponentId::new(s).unwrap()
    }

    fn new_args(total: i64, components: &[&str]) -> NewDraftArgs {
        NewDraftArgs {
            total,
            components: components.iter().map(|c| cid(c)).collect(),
            name: Some("U12 Tuesday".to_string()),
            date: Some("2026-10-20".to_string()),
        }
    }

    fn start_standard(config: &Config) {
        let mut sink = Vec::new();
        new(
            &mut sink,
            &new_args(60, &["warmup", "passing", "possession", "scrimmage"]),
            config,
        )
        .unwrap();
    }

    fn add_drill(config: &Config, id: &str, name: &str) {
        let mut db = open_database(config).unwrap();
        db.upsert_drill(&Drill {
            id: DrillId::new(id).unwrap(),
            name: name.to_string(),
            duration_minutes: 10,
            difficulty: Difficulty::Beginner,
            tags: Vec::new(),
        })
        .unwrap();
    }

    #[test]
    fn new_draft_prints_normalized_allocation() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        let mut output = Vec::new();

        new(
            &mut output,
            &new_args(60, &["warmup", "passing", "possession", "scrimmage"]),
            &config,
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Session: U12 Tuesday (2026-10-20)
        Total: 60 min, allocated 60 min (balanced)

        #  COMPONENT            MIN  BASE  DRILLS
        0  Warm-up               10    10  -
        1  Passing               13    13  -
        2  Possession            17    17  -
        3  Scrimmage             20    20  -
        ");
    }

    #[test]
    fn new_draft_rejects_unknown_component() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        let mut output = Vec::new();

        let err = new(&mut output, &new_args(60, &["warmup", "juggling"]), &config).unwrap_err();

        assert_eq!(err.to_string(), "unknown component: juggling");
        let db = open_database(&config).unwrap();
        assert!(db.load_draft(DRAFT_KEY).unwrap().is_none());
    }

    #[test]
    fn adjust_shows_imbalance_and_persists() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        start_standard(&config);
        let mut output = Vec::new();

        let args = AdjustArgs {
            component: cid("possession"),
            minutes: 27,
        };
        adjust(&mut output, &args, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Session: U12 Tuesday (2026-10-20)
        Total: 60 min, allocated 70 min (10 minutes over)

        #  COMPONENT            MIN  BASE  DRILLS
        0  Warm-up               10    10  -
        1  Passing               13    13  -
        2  Possession            27    17  -
        3  Scrimmage             20    20  -
        ");

        let db = open_database(&config).unwrap();
        let stored = db.load_draft(DRAFT_KEY).unwrap().unwrap();
        assert_eq!(stored.allocated(), 70);
    }

    #[test]
    fn reset_after_adjust_restores_balance() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        start_standard(&config);
        let mut sink = Vec::new();
        let args = AdjustArgs {
            component: cid("warmup"),
            minutes: 3,
        };
        adjust(&mut sink, &args, &config).unwrap();

        let db = open_database(&config).unwrap();
        let adjusted = db.load_draft(DRAFT_KEY).unwrap().unwrap();
        assert_eq!(adjusted.allocations[0].duration, 5);
        drop(db);

        reset(&mut sink, &config).unwrap();

        let db = open_database(&config).unwrap();
        let restored = db.load_draft(DRAFT_KEY).unwrap().unwrap();
        assert!(restored.is_settled());
        assert_eq!(restored.allocations[0].duration, 10);
    }

    #[test]
    fn move_at_boundary_reports_unchanged() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        start_standard(&config);
        let mut output = Vec::new();

        move_up(&mut output, &MoveArgs { index: 0 }, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Unchanged: position 0 cannot move up\n"));
    }

    #[test]
    fn attach_move_and_detach() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        start_standard(&config);
        add_drill(&config, "rondo", "Rondo 4v1");
        add_drill(&config, "7v7", "7v7 Game");
        let mut sink = Vec::new();

        for (component, drill) in [("warmup", "rondo"), ("scrimmage", "7v7"), ("scrimmage", "7v7")] {
            let args = AttachArgs {
                component: cid(component),
                drill: DrillId::new(drill).unwrap(),
            };
            attach(&mut sink, &args, &config).unwrap();
        }
        move_down(&mut sink, &MoveArgs { index: 0 }, &config).unwrap();
        let args = DetachArgs {
            component: cid("scrimmage"),
            index: 1,
        };
        let mut output = Vec::new();
        detach(&mut output, &args, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Session: U12 Tuesday (2026-10-20)
        Total: 60 min, allocated 60 min (balanced)

        #  COMPONENT            MIN  BASE  DRILLS
        0  Passing               13    13  -
        1  Warm-up               10    10  Rondo 4v1
        2  Possession            17    17  -
        3  Scrimmage             20    20  7v7 Game
        ");
    }

    #[test]
    fn attach_rejects_unknown_drill() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        start_standard(&config);
        let mut output = Vec::new();
        let args = AttachArgs {
            component: cid("warmup"),
            drill: DrillId::new("ghost").unwrap(),
        };

        let err = attach(&mut output, &args, &config).unwrap_err();
        assert!(err.to_string().contains("drill not found: ghost"));
    }

    #[test]
    fn show_without_draft_hints() {
        let temp = tempfile::tempdir().unwrap();
        let mut output = Vec::new();

        let err = show(&mut output, &ShowArgs { json: false }, &config(&temp)).unwrap_err();
        assert!(err.to_string().starts_with("no draft in progress"));
    }

    #[test]
    fn show_json() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        start_standard(&config);
        let mut output = Vec::new();

        show(&mut output, &ShowArgs { json: true }, &config).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["total_duration"], 60);
        assert_eq!(parsed["balance"], 0);
        assert_eq!(parsed["settled"], true);
        assert_eq!(parsed["date"], "2026-10-20");
        assert_eq!(parsed["slots"][3]["component_id"], "scrimmage");
        assert_eq!(parsed["slots"][3]["duration"], 20);
    }

    #[test]
    fn renormalize_accepts_edits() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        start_standard(&config);
        let mut sink = Vec::new();
        let args = AdjustArgs {
            component: cid("scrimmage"),
            minutes: 30,
        };
        adjust(&mut sink, &args, &config).unwrap();

        renormalize(&mut sink, &config).unwrap();

        let db = open_database(&config).unwrap();
        let draft = db.load_draft(DRAFT_KEY).unwrap().unwrap();
        assert!(draft.is_settled());
        for allocation in &draft.allocations {
            assert_eq!(allocation.baseline_duration, allocation.duration);
        }
    }

    #[test]
    fn discard_removes_draft() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);
        start_standard(&config);
        let mut output = Vec::new();

        discard(&mut output, &config).unwrap();
        discard(&mut output, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Draft discarded.
        No draft in progress.
        ");
    }
}

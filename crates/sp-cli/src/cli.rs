//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::components::{AddComponentArgs, ComponentsArgs};
use crate::commands::draft::{
    AdjustArgs, AttachArgs, DetachArgs, MoveArgs, NewDraftArgs, ShowArgs,
};
use crate::commands::drills::{AddDrillArgs, RemoveDrillArgs};
use crate::commands::sessions::ShowSessionArgs;

/// Training session planner.
///
/// Splits a session's length across training components, lets you
/// rebalance and reorder them, attach drills, and save the finished plan.
#[derive(Debug, Parser)]
#[command(name = "sp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage session components and their default share of time.
    #[command(subcommand)]
    Components(ComponentsAction),

    /// Manage the drill catalog.
    #[command(subcommand)]
    Drills(DrillsAction),

    /// Build and edit the current session draft.
    #[command(subcommand)]
    Draft(DraftAction),

    /// Assemble the current draft and save it as a session.
    Save,

    /// Browse saved sessions.
    #[command(subcommand)]
    Sessions(SessionsAction),
}

/// Component catalog actions.
#[derive(Debug, Subcommand)]
pub enum ComponentsAction {
    /// List built-in, stored and configured components.
    List(ComponentsArgs),
    /// Add or update a stored component.
    Add(AddComponentArgs),
}

/// Drill catalog actions.
#[derive(Debug, Subcommand)]
pub enum DrillsAction {
    /// Add or update a drill.
    Add(AddDrillArgs),
    /// List drills.
    List,
    /// Remove a drill.
    Remove(RemoveDrillArgs),
}

/// Draft editing actions.
#[derive(Debug, Subcommand)]
pub enum DraftAction {
    /// Start a new draft, replacing the current one.
    New(NewDraftArgs),
    /// Show the current draft.
    Show(ShowArgs),
    /// Set a component's duration in minutes.
    Adjust(AdjustArgs),
    /// Restore every duration to its last normalized value.
    Reset,
    /// Move the component at a position one slot earlier.
    Up(MoveArgs),
    /// Move the component at a position one slot later.
    Down(MoveArgs),
    /// Attach a drill to a component.
    Attach(AttachArgs),
    /// Remove a drill from a component by its position.
    Detach(DetachArgs),
    /// Rescale the current durations to the session length.
    Renormalize,
    /// Throw away the current draft.
    Discard,
}

/// Saved session actions.
#[derive(Debug, Subcommand)]
pub enum SessionsAction {
    /// List saved sessions.
    List,
    /// Show one saved session.
    Show(ShowSessionArgs),
}

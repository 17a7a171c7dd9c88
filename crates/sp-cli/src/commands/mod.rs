//! CLI subcommand implementations.

pub mod components;
pub mod draft;
pub mod drills;
pub mod save;
pub mod sessions;
pub mod util;

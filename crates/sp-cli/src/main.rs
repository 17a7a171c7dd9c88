use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sp_cli::commands::{components, draft, drills, save, sessions};
use sp_cli::{Cli, Commands, ComponentsAction, Config, DraftAction, DrillsAction, SessionsAction};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut out = io::stdout().lock();
    match command {
        Commands::Components(action) => match action {
            ComponentsAction::List(args) => components::list(&mut out, args, &config)?,
            ComponentsAction::Add(args) => components::add(&mut out, args, &config)?,
        },
        Commands::Drills(action) => match action {
            DrillsAction::Add(args) => drills::add(&mut out, args, &config)?,
            DrillsAction::List => drills::list(&mut out, &config)?,
            DrillsAction::Remove(args) => drills::remove(&mut out, args, &config)?,
        },
        Commands::Draft(action) => match action {
            DraftAction::New(args) => draft::new(&mut out, args, &config)?,
            DraftAction::Show(args) => draft::show(&mut out, args, &config)?,
            DraftAction::Adjust(args) => draft::adjust(&mut out, args, &config)?,
            DraftAction::Reset => draft::reset(&mut out, &config)?,
            DraftAction::Up(args) => draft::move_up(&mut out, args, &config)?,
            DraftAction::Down(args) => draft::move_down(&mut out, args, &config)?,
            DraftAction::Attach(args) => draft::attach(&mut out, args, &config)?,
            DraftAction::Detach(args) => draft::detach(&mut out, args, &config)?,
            DraftAction::Renormalize => draft::renormalize(&mut out, &config)?,
            DraftAction::Discard => draft::discard(&mut out, &config)?,
        },
        Commands::Save => save::run(&mut out, &config)?,
        Commands::Sessions(action) => match action {
            SessionsAction::List => sessions::list(&mut out, &config)?,
            SessionsAction::Show(args) => sessions::show(&mut out, args, &config)?,
        },
    }

    Ok(())
}

//! Save command for finalizing the current draft.

use std::io::Write;

use anyhow::Result;
use sp_core::{Balance, FinalizeError, finalize};

use super::util::{DRAFT_KEY, open_database, require_draft};
use crate::Config;

/// Assembles the current draft into a session and stores it.
///
/// The draft is only discarded once the session has been written, so a
/// rejected save leaves it in place for further editing.
pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let draft = require_draft(&db)?;
    let balance = draft.balance();

    let id = match finalize(draft, config.assembly_policy(), &mut db) {
        Ok(id) => id,
        Err(FinalizeError::Assembly(err)) => {
            return Err(anyhow::Error::new(err).context("cannot save session yet"));
        }
        Err(err @ FinalizeError::Store(_)) => return Err(err.into()),
    };
    db.delete_draft(DRAFT_KEY)?;

    writeln!(writer, "Saved session {id}")?;
    if balance != Balance::Exact {
        writeln!(writer, "Note: allocation was {balance} when saved.")?;
    }
    Ok(())
}

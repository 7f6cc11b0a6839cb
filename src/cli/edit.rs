//! Edit command.

use std::io::{self, IsTerminal};

use crate::cli::output;
use crate::core::config::Settings;
use crate::core::edit::{self, Editor};
use crate::core::store::Store;
use crate::error::Result;

/// Decrypt envi.yaml, open it in the editor, and save the result.
pub fn execute(settings: Settings) -> Result<()> {
    if !io::stdin().is_terminal() {
        output::warn("stdin is not a terminal; the editor may not be interactive");
    }

    let editor = Editor::new(&settings.editor);
    let store = Store::open(settings)?;
    let outcome = edit::edit(&store, &editor)?;

    let path = output::path(&outcome.path.display().to_string());
    if outcome.changed {
        output::success(&format!("saved {}", path));
    } else {
        output::success(&format!("no changes to {}", path));
    }
    Ok(())
}

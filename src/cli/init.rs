//! Init command - create a new encrypted envi.yaml.

use tracing::info;

use crate::cli::output;
use crate::core::config::Settings;
use crate::core::store::Store;
use crate::error::Result;

/// Initialize envi in the current directory.
pub fn execute(settings: Settings) -> Result<()> {
    let store = Store::open(settings)?;
    let path = store.init()?;

    output::success(&format!("initialized {}", output::path(&path.display().to_string())));
    output::hint(&format!("next: {}", output::cmd("envi edit")));

    info!("Initialized successfully");
    Ok(())
}

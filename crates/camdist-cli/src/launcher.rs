//! Starts the game through the Steam URL handler.

use anyhow::{Context, Result};
use camdist::platform::launch_url;
use tracing::debug;

/// Ask Steam to launch the game. Returns once the URL has been handed off.
pub fn launch_game() -> Result<()> {
    let url = launch_url();
    debug!("Opening {}", url);
    open::that(&url).with_context(|| format!("Failed to open {}", url))?;
    Ok(())
}

//! App manifest (`appmanifest_<id>.acf`) state.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::keyvalues;
use crate::error::Result;

/// `StateFlags` value Steam writes once an app is fully installed and updated.
pub const STATE_FULLY_INSTALLED: &str = "4";

/// Location of the app manifest inside a Steam library.
pub fn manifest_path(library: &Path, app_id: &str) -> PathBuf {
    library
        .join("steamapps")
        .join(format!("appmanifest_{}.acf", app_id))
}

/// Raw `AppState.StateFlags` value from the manifest.
pub fn read_state_flags(library: &Path, app_id: &str) -> Result<String> {
    let path = manifest_path(library, app_id);
    let flags = keyvalues::read_with(&path, |vdf| {
        keyvalues::root(vdf, "AppState")
            .and_then(|state| keyvalues::str_value(state, "StateFlags"))
            .map(str::to_string)
            .ok_or_else(|| keyvalues::malformed(&path, "missing AppState.StateFlags"))
    })?;
    debug!("Read app manifest: {}, status: {}", path.display(), flags);

    Ok(flags)
}

/// Whether Steam reports the app as fully installed (not updating).
pub fn is_ready(library: &Path, app_id: &str) -> Result<bool> {
    Ok(read_state_flags(library, app_id)? == STATE_FULLY_INSTALLED)
}

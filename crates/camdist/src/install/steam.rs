//! Steam installation discovery.

use std::path::{Path, PathBuf};

use keyvalues_parser::Value;
use tracing::debug;

use super::InstallResolver;
use super::keyvalues;
use crate::error::{Error, Result};
use crate::platform::{APP_ID, Platform};

const LIBRARY_FOLDERS: &str = "libraryfolders.vdf";

/// Steam root from `HKLM\SOFTWARE\WOW6432Node\Valve\Steam\InstallPath`.
#[cfg(target_os = "windows")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrySteamRoot;

#[cfg(target_os = "windows")]
impl InstallResolver for RegistrySteamRoot {
    fn resolve_install_path(&self) -> Result<PathBuf> {
        use windows::Win32::System::Registry::{HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ, RegGetValueW};
        use windows::core::HSTRING;

        let subkey = HSTRING::from(r"SOFTWARE\WOW6432Node\Valve\Steam");
        let value_name = HSTRING::from("InstallPath");

        // First call to get the required buffer size
        let mut size: u32 = 0;
        // SAFETY: RegGetValueW with null buffer queries the required size.
        unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                &subkey,
                &value_name,
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut size),
            )
            .ok()
            .map_err(|e| Error::SteamNotFound(format!("registry value size query failed: {e}")))?;
        }

        let mut buffer = vec![0u16; (size as usize) / 2];
        // SAFETY: RegGetValueW reads the registry value into the provided buffer.
        unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                &subkey,
                &value_name,
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr().cast()),
                Some(&mut size),
            )
            .ok()
            .map_err(|e| Error::SteamNotFound(format!("registry value read failed: {e}")))?;
        }

        // Trim null terminator
        if buffer.last() == Some(&0) {
            buffer.pop();
        }

        let install_path = String::from_utf16(&buffer)
            .map_err(|e| Error::SteamNotFound(format!("invalid UTF-16 in registry value: {e}")))?;
        debug!("Retrieved Steam path: {} from registry", install_path);

        Ok(PathBuf::from(install_path))
    }
}

/// Steam root at a fixed location under the user's home directory.
#[derive(Debug, Clone)]
pub struct HomeSteamRoot {
    relative: PathBuf,
}

impl HomeSteamRoot {
    pub fn new<P: Into<PathBuf>>(relative: P) -> Self {
        Self {
            relative: relative.into(),
        }
    }

    pub fn linux() -> Self {
        Self::new(Path::new(".steam").join("steam"))
    }

    pub fn macos() -> Self {
        Self::new(
            Path::new("Library")
                .join("Application Support")
                .join("Steam"),
        )
    }
}

impl InstallResolver for HomeSteamRoot {
    fn resolve_install_path(&self) -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::SteamNotFound("home directory is unknown".to_string()))?;
        let path = home.join(&self.relative);
        debug!("Retrieved Steam path: {}", path.display());
        Ok(path)
    }
}

/// Default Steam root resolver for `platform`.
pub fn steam_root_resolver(platform: Platform) -> Box<dyn InstallResolver> {
    match platform {
        #[cfg(target_os = "windows")]
        Platform::Windows => Box::new(RegistrySteamRoot),
        #[cfg(not(target_os = "windows"))]
        Platform::Windows => Box::new(super::Unsupported(
            "the Steam registry is only readable on Windows",
        )),
        Platform::Linux => Box::new(HomeSteamRoot::linux()),
        Platform::MacOs => Box::new(HomeSteamRoot::macos()),
    }
}

/// Find the library folder holding `app_id` in `libraryfolders.vdf`.
///
/// The game and Steam can live on different drives, so the Steam root is not
/// necessarily the right library.
pub fn find_library_for_app(steam_root: &Path, app_id: &str) -> Result<PathBuf> {
    let vdf_path = steam_root.join("steamapps").join(LIBRARY_FOLDERS);
    let library = keyvalues::read_with(&vdf_path, |vdf| {
        let folders = keyvalues::root(vdf, "libraryfolders")
            .ok_or_else(|| keyvalues::malformed(&vdf_path, "missing 'libraryfolders' section"))?;

        for (key, entries) in folders.iter() {
            for folder in entries.iter().filter_map(Value::get_obj) {
                let has_app = keyvalues::obj_value(folder, "apps")
                    .is_some_and(|apps| apps.contains_key(app_id));
                if has_app && let Some(path) = keyvalues::str_value(folder, "path") {
                    debug!("Found app {} in library {}: {}", app_id, key, path);
                    return Ok(Some(PathBuf::from(path)));
                }
            }
        }
        Ok(None)
    })?;
    debug!("Read {}", vdf_path.display());

    library.ok_or_else(|| Error::GameNotInstalled {
        app_id: app_id.to_string(),
    })
}

/// Resolves the Steam library holding the game, given a Steam root resolver.
pub struct SteamLibrary<R> {
    steam_root: R,
}

impl<R: InstallResolver> SteamLibrary<R> {
    pub fn new(steam_root: R) -> Self {
        Self { steam_root }
    }
}

impl<R: InstallResolver> InstallResolver for SteamLibrary<R> {
    fn resolve_install_path(&self) -> Result<PathBuf> {
        let steam_root = self.steam_root.resolve_install_path()?;
        find_library_for_app(&steam_root, APP_ID)
    }
}

/// Resolves the client library file inside a Steam library.
pub struct SharedLibrary<R> {
    library: R,
    platform: Platform,
}

impl<R: InstallResolver> SharedLibrary<R> {
    pub fn new(library: R, platform: Platform) -> Self {
        Self { library, platform }
    }
}

impl<R: InstallResolver> InstallResolver for SharedLibrary<R> {
    fn resolve_install_path(&self) -> Result<PathBuf> {
        let library = self.library.resolve_install_path()?;
        Ok(library.join(self.platform.shared_library_path()))
    }
}

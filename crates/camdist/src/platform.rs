//! Per-platform defaults for the patched game.

use std::path::PathBuf;

use strum::{Display, EnumString};

/// Steam app id of the game whose client library is patched.
pub const APP_ID: &str = "570";

/// Base URL anchors are published under.
pub const ANCHOR_BASE_URL: &str =
    "https://raw.githubusercontent.com/searayeah/dota-camera-distance/main/";

/// Game directory under `steamapps/common`.
const GAME_DIR: &str = "dota 2 beta";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    Windows,
    Linux,
    #[strum(to_string = "macos", serialize = "darwin")]
    MacOs,
}

impl Platform {
    /// Platform this binary was compiled for, if supported.
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Platform::Windows)
        } else if cfg!(target_os = "linux") {
            Some(Platform::Linux)
        } else if cfg!(target_os = "macos") {
            Some(Platform::MacOs)
        } else {
            None
        }
    }

    /// Anchor shipped with this release, used when no fresher one is available.
    pub fn default_anchor(&self) -> &'static str {
        match self {
            Platform::Windows => "00 00 AE 42 00 00 96 44 00 00 C8 44 00 40 9C 45",
            Platform::Linux => "00 00 AF 43 00 80 3B 44 00 00 96 44 33 33 33 3F",
            Platform::MacOs => "00 00 7A 43 00 80 09 44 00 96 44 00 00 C8 44",
        }
    }

    /// Name of the remotely published anchor file.
    pub fn anchor_file(&self) -> &'static str {
        match self {
            Platform::Windows => "current_hex_string",
            Platform::Linux => "current_hex_string_linux",
            Platform::MacOs => "current_hex_string_macos",
        }
    }

    pub fn anchor_url(&self) -> String {
        format!("{}{}", ANCHOR_BASE_URL, self.anchor_file())
    }

    /// Client library path relative to a Steam library folder.
    pub fn shared_library_path(&self) -> PathBuf {
        let bin = PathBuf::from("steamapps")
            .join("common")
            .join(GAME_DIR)
            .join("game")
            .join("dota")
            .join("bin");
        match self {
            Platform::Windows => bin.join("win64").join("client.dll"),
            Platform::Linux => bin.join("linuxsteamrt64").join("libclient.so"),
            Platform::MacOs => bin.join("osx64").join("libclient.dylib"),
        }
    }
}

/// URL that asks Steam to launch the game.
pub fn launch_url() -> String {
    format!("steam://rungameid/{}", APP_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{DEFAULT_BASELINE, build};
    use std::str::FromStr;

    #[test]
    fn test_platform_from_str() {
        assert_eq!(Platform::from_str("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_str("Windows").unwrap(), Platform::Windows);
        assert_eq!(Platform::from_str("darwin").unwrap(), Platform::MacOs);
        assert!(Platform::from_str("beos").is_err());
        assert_eq!(Platform::MacOs.to_string(), "macos");
    }

    #[test]
    fn test_default_anchors_contain_baseline() {
        for platform in [Platform::Windows, Platform::Linux] {
            assert!(build(platform.default_anchor(), DEFAULT_BASELINE, 1400.0).is_ok());
        }
    }

    #[test]
    fn test_shared_library_path() {
        let path = Platform::Linux.shared_library_path();
        assert!(path.ends_with("linuxsteamrt64/libclient.so"));
        assert!(path.starts_with("steamapps/common/dota 2 beta"));
    }

    #[test]
    fn test_anchor_url() {
        assert_eq!(
            Platform::Linux.anchor_url(),
            "https://raw.githubusercontent.com/searayeah/dota-camera-distance/main/current_hex_string_linux"
        );
        assert_eq!(launch_url(), "steam://rungameid/570");
    }
}

//! Locating the image to patch on the host.
//!
//! Every lookup sits behind [`InstallResolver`] so callers can swap the
//! OS-specific discovery for a configured path.

pub mod keyvalues;
pub mod manifest;
mod steam;

use std::path::PathBuf;

use crate::error::{Error, Result};

pub use steam::*;

/// Something that knows where a file or directory lives.
pub trait InstallResolver {
    fn resolve_install_path(&self) -> Result<PathBuf>;
}

impl<T: InstallResolver + ?Sized> InstallResolver for Box<T> {
    fn resolve_install_path(&self) -> Result<PathBuf> {
        (**self).resolve_install_path()
    }
}

/// A path that is already known, e.g. from the config file.
#[derive(Debug, Clone)]
pub struct FixedPath(PathBuf);

impl FixedPath {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }
}

impl InstallResolver for FixedPath {
    fn resolve_install_path(&self) -> Result<PathBuf> {
        Ok(self.0.clone())
    }
}

/// Resolver for a platform without a discovery method.
#[derive(Debug, Clone, Copy)]
pub struct Unsupported(pub &'static str);

impl InstallResolver for Unsupported {
    fn resolve_install_path(&self) -> Result<PathBuf> {
        Err(Error::SteamNotFound(self.0.to_string()))
    }
}

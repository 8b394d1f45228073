//! # camdist
//!
//! Rewrites a single `f32` field inside a compiled client library without
//! relying on a fixed offset.
//!
//! The field is found through an anchor: a run of bytes around it that
//! contains a known baseline value. [`PatternBuilder`] turns the anchor into a
//! search pattern with a 4-byte wildcard, and [`ImagePatcher`] requires that
//! pattern to occur exactly once before writing the new value.
//!
//! ```no_run
//! use camdist::{PatternBuilder, patch};
//!
//! let pattern = PatternBuilder::new(1200.0)
//!     .build("00 00 AE 42 00 00 96 44 00 00 C8 44 00 40 9C 45", 1400.0)?;
//! let outcome = patch("client.dll", &pattern)?;
//! println!("patched at 0x{:X}", outcome.field_offset);
//! # Ok::<(), camdist::Error>(())
//! ```
//!
//! The rest of the crate supplies inputs to that core: Steam install discovery,
//! the published anchor, persisted settings, and polling helpers.
//!
//! ## Feature Flags
//!
//! - `remote`: fetch the published anchor over HTTP.

pub mod anchor;
pub mod config;
pub mod error;
pub mod image;
pub mod install;
pub mod platform;
pub mod remote;
pub mod retry;

pub use anchor::{Advisory, DEFAULT_BASELINE, PatchPattern, PatternBuilder, build};
pub use config::{CameraConfig, Config, PathsConfig};
pub use error::{AnchorDefect, Error, Result};
pub use image::{FieldMatch, ImagePatcher, PatchOutcome, ScanReport, WildcardMatcher, patch, scan};
pub use install::{FixedPath, InstallResolver, SharedLibrary, SteamLibrary, steam_root_resolver};
pub use platform::Platform;
pub use remote::{AnchorOrigin, ResolvedAnchor, fetch_or_default};
pub use retry::{Attempts, PollOutcome, PollPolicy, poll, poll_sleeping};

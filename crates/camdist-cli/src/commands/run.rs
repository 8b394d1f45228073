//! Default command: configure, patch the installed client, launch the game.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use camdist::install::manifest;
use camdist::platform::APP_ID;
use camdist::remote::{self, AnchorOrigin, ResolvedAnchor};
use camdist::{
    Config, DEFAULT_BASELINE, FixedPath, InstallResolver, PatchOutcome, PatternBuilder, Platform,
    PollOutcome, PollPolicy, SharedLibrary, SteamLibrary, poll, steam_root_resolver,
};
use tracing::{debug, info, warn};

use crate::interrupt::Interrupt;
use crate::launcher;
use crate::prompter::LinePrompter;

/// Interval between app manifest checks while Steam updates the game
const UPDATE_POLL_INTERVAL: Duration = Duration::from_secs(3);

pub struct RunOptions {
    pub config_path: PathBuf,
    pub distance: Option<f32>,
    pub platform: Option<Platform>,
    pub launch: bool,
}

/// Everything the patch step needs, resolved from config, discovery, and prompts.
#[derive(Debug)]
struct Setup {
    platform: Platform,
    distance: f32,
    anchor: ResolvedAnchor,
    library_path: PathBuf,
    image_path: PathBuf,
}

/// Run the default command
pub fn run(options: &RunOptions, interrupt: &Interrupt) -> Result<()> {
    let platform = options
        .platform
        .or_else(Platform::current)
        .context("OS not supported")?;
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("OS: {}", platform);

    let mut config = Config::load_or_default(&options.config_path);
    let setup = configure(&mut config, platform, options.distance)?;
    config.save(&options.config_path)?;

    let builder = PatternBuilder::new(config.camera.baseline).strict(config.camera.strict_anchor);
    let mut anchor = setup.anchor.clone();
    patch_with_refresh(&builder, &mut anchor, &setup)?;
    if anchor != setup.anchor {
        config.camera.hex_string = Some(anchor.hex.clone());
        config.save(&options.config_path)?;
    }

    if !(options.launch && config.camera.autostart_game) || interrupt.is_raised() {
        return Ok(());
    }

    launcher::launch_game()?;
    info!("Launching Dota 2 ...");

    // A first launch can trigger an update that replaces the client library
    if wait_for_update(&setup.library_path, interrupt)? {
        patch_once(&builder, &anchor, &setup)?;
        info!("Press \"Play game\"");
    }

    Ok(())
}

/// Fill in missing config values and resolve the paths to patch.
fn configure(config: &mut Config, platform: Platform, distance: Option<f32>) -> Result<Setup> {
    info!("Logging level: {}", config.camera.logging_level);

    let distance = match distance.or(config.camera.distance) {
        Some(distance) => distance,
        None => LinePrompter::stdio().prompt_f32(
            &format!(
                "Enter distance[default {}, recommended 1400]: ",
                DEFAULT_BASELINE
            ),
            DEFAULT_BASELINE,
        ),
    };
    config.camera.distance = Some(distance);
    info!("Distance: {}", distance);

    info!("Receive anchor from remote: {}", config.camera.fetch_anchor);
    let anchor = match (&config.camera.hex_string, config.camera.fetch_anchor) {
        (Some(hex), false) => ResolvedAnchor {
            hex: hex.clone(),
            origin: AnchorOrigin::Config,
        },
        _ => remote::fetch_or_default(platform),
    };
    config.camera.hex_string = Some(anchor.hex.clone());
    info!("Hex string: {} ({})", anchor.hex, anchor.origin);
    info!("Autostart game: {}", config.camera.autostart_game);

    let steam_path = resolve_or(&config.paths.steam_path, || {
        steam_root_resolver(platform).resolve_install_path()
    })?;
    info!("Steam path: {}", steam_path.display());

    let library_path = resolve_or(&config.paths.steam_library_path, || {
        SteamLibrary::new(FixedPath::new(&steam_path)).resolve_install_path()
    })?;
    info!("Steam library path: {}", library_path.display());

    let image_path = resolve_or(&config.paths.shared_library_path, || {
        SharedLibrary::new(FixedPath::new(&library_path), platform).resolve_install_path()
    })?;
    info!("Shared library path: {}", image_path.display());

    config.paths.steam_path = Some(steam_path);
    config.paths.steam_library_path = Some(library_path.clone());
    config.paths.shared_library_path = Some(image_path.clone());

    Ok(Setup {
        platform,
        distance,
        anchor,
        library_path,
        image_path,
    })
}

/// Configured path if present, otherwise discover it.
fn resolve_or<F>(configured: &Option<PathBuf>, discover: F) -> Result<PathBuf>
where
    F: FnOnce() -> camdist::Result<PathBuf>,
{
    match configured {
        Some(path) => Ok(path.clone()),
        None => Ok(discover()?),
    }
}

fn patch_once(
    builder: &PatternBuilder,
    anchor: &ResolvedAnchor,
    setup: &Setup,
) -> camdist::Result<PatchOutcome> {
    let pattern = builder.build(&anchor.hex, setup.distance)?;
    camdist::patch(&setup.image_path, &pattern)
}

/// Patch, and if the anchor turns out to be stale, fetch the published one and
/// try exactly once more. `anchor` is updated to the anchor that worked.
fn patch_with_refresh(
    builder: &PatternBuilder,
    anchor: &mut ResolvedAnchor,
    setup: &Setup,
) -> Result<PatchOutcome> {
    match patch_once(builder, anchor, setup) {
        Ok(outcome) => Ok(outcome),
        Err(e) if e.is_stale_anchor() && anchor.origin != AnchorOrigin::Remote => {
            warn!("Anchor from {} is outdated: {}", anchor.origin, e);
            let fresh = match remote::fetch_anchor(&setup.platform.anchor_url()) {
                Ok(hex) => hex,
                Err(fetch_err) => {
                    debug!("Refreshing the anchor failed: {}", fetch_err);
                    return Err(e.into());
                }
            };
            if fresh == anchor.hex {
                return Err(e.into());
            }

            info!("Retrying with the published anchor: {}", fresh);
            let retry = ResolvedAnchor {
                hex: fresh,
                origin: AnchorOrigin::Remote,
            };
            let outcome = patch_once(builder, &retry, setup)?;
            *anchor = retry;
            Ok(outcome)
        }
        Err(e) => Err(e.into()),
    }
}

/// Wait until Steam reports the game as fully installed.
///
/// Returns `true` if an update was in progress, meaning the client library may
/// have been replaced and must be patched again.
fn wait_for_update(library: &Path, interrupt: &Interrupt) -> Result<bool> {
    if manifest::is_ready(library, APP_ID)? {
        return Ok(false);
    }

    let policy = PollPolicy::unbounded(UPDATE_POLL_INTERVAL);
    let outcome = poll(
        &policy,
        |_| {
            let flags = manifest::read_state_flags(library, APP_ID)?;
            if flags == manifest::STATE_FULLY_INSTALLED {
                Ok(Some(()))
            } else {
                info!("Waiting for Dota 2 to get updates, status: {}", flags);
                Ok(None)
            }
        },
        |interval| interrupt.sleep(interval),
    )?;

    match outcome {
        PollOutcome::Ready(()) => Ok(true),
        PollOutcome::Cancelled => bail!("Interrupted while waiting for the update"),
        PollOutcome::Exhausted { attempts } => {
            bail!("Game still updating after {} checks", attempts)
        }
    }
}

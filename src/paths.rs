//! XDG-style path resolution for profile files, and the startup
//! installation-detection check.

use crate::hid::{self, KNOWN_DEVICES};
use std::path::{Path, PathBuf};

const APP_PREFIX: &str = "opensd";
const DEFAULT_PROFILE_NAME: &str = "default";

fn base_dirs() -> xdg::BaseDirectories {
    // `with_prefix` never fails on Unix: it only fails if $HOME can't be
    // resolved, which `xdg` treats as a logic error, not ours to recover from.
    xdg::BaseDirectories::with_prefix(APP_PREFIX).expect("failed to resolve XDG base directories")
}

/// Every directory searched for a named profile, in priority order: the
/// user's XDG config dir first, then the read-only system default.
pub fn profile_search_dirs() -> Vec<PathBuf> {
    let dirs = base_dirs();
    let mut search = vec![dirs.get_config_home()];
    search.extend(dirs.get_config_dirs());
    search.into_iter().map(|d| d.join("profiles")).collect()
}

/// Resolves a bare profile name (no `.ini` extension, no path separators)
/// against [`profile_search_dirs`], returning the first existing match.
pub fn find_profile(name: &str) -> Option<PathBuf> {
    let file_name = format!("{name}.ini");
    profile_search_dirs().into_iter().map(|d| d.join(&file_name)).find(|p| p.exists())
}

/// The profile loaded at startup when `-p/--profile` is not given.
pub fn default_profile_path() -> Option<PathBuf> {
    find_profile(DEFAULT_PROFILE_NAME)
}

/// Non-fatal startup check: is `/dev/uinput` present and writable, and can a
/// known gamepad hidraw node be located? Logs a warning either way but never
/// blocks the daemon from attempting to run.
pub fn is_installed() -> bool {
    let uinput_ok = check_uinput();
    let hidraw_ok = check_hidraw();
    uinput_ok && hidraw_ok
}

fn check_uinput() -> bool {
    let path = Path::new("/dev/uinput");
    if !path.exists() {
        tracing::warn!("'/dev/uinput' does not exist; synthetic devices cannot be created");
        return false;
    }
    match std::fs::OpenOptions::new().write(true).open(path) {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "'/dev/uinput' is not writable");
            false
        }
    }
}

fn check_hidraw() -> bool {
    for dev in KNOWN_DEVICES {
        if hid::find_dev_node(dev.vendor_id, dev.product_id, dev.interface_num).is_some() {
            return true;
        }
    }
    tracing::warn!("no known gamepad hidraw device was found");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_dirs_end_in_profiles() {
        for dir in profile_search_dirs() {
            assert!(dir.ends_with("profiles"));
        }
    }
}

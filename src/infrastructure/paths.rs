//! Path handling for the Zellij plugin sandbox.
//!
//! Inside the sandbox the host working directory is mounted at `/host`.
//! Commands started with `run_command` execute on the host in that same
//! directory, so paths handed to them must be relative to it.

use std::path::{Path, PathBuf};

/// Sandbox mount point of the host working directory.
const HOST_ROOT: &str = "/host";

/// Returns the data directory for medshelf files.
///
/// Resolves to `/host/.local/share/zellij/medshelf`, which is
/// `~/.local/share/zellij/medshelf` when Zellij was started from the home
/// directory.
///
/// # Examples
///
/// ```
/// use medshelf::infrastructure::get_data_dir;
///
/// let data_dir = get_data_dir();
/// assert_eq!(data_dir.to_str().unwrap(), "/host/.local/share/zellij/medshelf");
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    PathBuf::from(HOST_ROOT).join(".local/share/zellij").join("medshelf")
}

/// Location of the cached catalog.
#[must_use]
pub fn catalog_file() -> PathBuf {
    get_data_dir().join("catalog.json")
}

/// Directory receiving locally uploaded media.
#[must_use]
pub fn media_dir() -> PathBuf {
    get_data_dir().join("media")
}

/// Maps a host-relative path into the sandbox.
///
/// Absolute paths already inside the sandbox are returned unchanged.
///
/// # Examples
///
/// ```
/// use medshelf::infrastructure::sandbox_path;
///
/// assert_eq!(sandbox_path("scans/femur.stl").to_str(), Some("/host/scans/femur.stl"));
/// assert_eq!(sandbox_path("~/scans").to_str(), Some("/host/scans"));
/// assert_eq!(sandbox_path("/host/a").to_str(), Some("/host/a"));
/// ```
#[must_use]
pub fn sandbox_path(path: &str) -> PathBuf {
    if Path::new(path).starts_with(HOST_ROOT) {
        return PathBuf::from(path);
    }
    let relative = path
        .strip_prefix("~/")
        .or_else(|| path.strip_prefix('/'))
        .unwrap_or(if path == "~" { "" } else { path });
    Path::new(HOST_ROOT).join(relative)
}

/// Turns a sandbox path into one usable by host commands.
///
/// # Examples
///
/// ```
/// use medshelf::infrastructure::host_relative;
/// use std::path::Path;
///
/// assert_eq!(host_relative(Path::new("/host/downloads/a.stl")), "downloads/a.stl");
/// assert_eq!(host_relative(Path::new("downloads")), "downloads");
/// ```
#[must_use]
pub fn host_relative(path: &Path) -> String {
    path.strip_prefix(HOST_ROOT)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

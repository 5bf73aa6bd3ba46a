//! Where the configuration file lives
//!
//! `CROSSGRAPH_CONFIG_DIR` wins. Otherwise Unix systems (macOS included)
//! follow XDG and Windows uses the roaming AppData folder.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "CROSSGRAPH_CONFIG_DIR";

const APP: &str = "crossgraph";

/// Configuration directory
pub fn config_dir() -> PathBuf {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => platform_config_dir().unwrap_or_else(|| Path::new(".config").join(APP)),
    }
}

#[cfg(windows)]
fn platform_config_dir() -> Option<PathBuf> {
    use directories::ProjectDirs;
    ProjectDirs::from("", "", APP).map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(not(windows))]
fn platform_config_dir() -> Option<PathBuf> {
    use directories::BaseDirs;
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => BaseDirs::new()?.home_dir().join(".config"),
    };
    Some(base.join(APP))
}

/// The configuration file
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Create `path` and its parents if missing
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

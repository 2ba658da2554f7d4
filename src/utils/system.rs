//! System utilities: environment lookup and the generated-config directory.

use std::env;
use std::fs;
use std::path::PathBuf;

use log::warn;

/// Get an environment variable, or an empty string if not set.
pub fn get_env(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

/// The invoking user's home directory, if known.
pub fn home_dir() -> Option<PathBuf> {
    let home = get_env("HOME");
    if !home.is_empty() {
        return Some(PathBuf::from(home));
    }
    let profile = get_env("USERPROFILE");
    if !profile.is_empty() {
        return Some(PathBuf::from(profile));
    }
    None
}

/// Per-user config directory (`~/.config/<tool>`), created on demand.
/// Falls back to a tool-named directory under the shared temp dir when the
/// home directory is unavailable or not writable.
pub fn ensure_config_dir(tool: &str) -> PathBuf {
    if let Some(home) = home_dir() {
        let dir = home.join(".config").join(tool);
        match fs::create_dir_all(&dir) {
            Ok(()) => return dir,
            Err(e) => {
                warn!("cannot create {}: {}, falling back to temp dir", dir.display(), e);
            }
        }
    }
    let dir = env::temp_dir().join(tool);
    let _ = fs::create_dir_all(&dir);
    dir
}

/// Rewrites the home-directory prefix of a path to the portable `$HOME`
/// token, so emitted config lines survive being moved between users.
pub fn portable_home(path: &str) -> String {
    if let Some(home) = home_dir() {
        let home = home.to_string_lossy();
        if !home.is_empty() && path.starts_with(home.as_ref()) {
            return format!("$HOME{}", &path[home.len()..]);
        }
    }
    path.to_string()
}

//! Locations of garg's files on disk.

use std::path::PathBuf;

use dirs_next::{cache_dir, config_dir, home_dir};

/// Directory name used under the platform config and cache directories.
pub const APP_DIR_NAME: &str = "garg";

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    if let Some(rest) = trimmed.strip_prefix("~\\") {
        // Windows-style
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}

/// `<config_dir>/garg`, or `./garg` when the platform has no config dir.
pub fn app_config_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME)
}

/// `<cache_dir>/garg`, falling back to the system temp directory.
pub fn app_cache_dir() -> PathBuf {
    cache_dir().unwrap_or_else(std::env::temp_dir).join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_home_prefixes_only() {
        let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde(" ~/logs/garg.log "), home.join("logs/garg.log"));
        assert_eq!(expand_tilde("/tmp/~/x"), PathBuf::from("/tmp/~/x"));
        assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
    }

    #[test]
    fn app_directories_end_with_the_app_name() {
        assert!(app_config_dir().ends_with(APP_DIR_NAME));
        assert!(app_cache_dir().ends_with(APP_DIR_NAME));
    }
}

//! Locations the CLI reads from and writes to
//!
//! Configuration follows XDG on Unix-like systems. Saved quotes live in the
//! platform data directory so they survive configuration resets.

use std::path::PathBuf;

/// Directory name used under both the config and data roots
const APP_DIR: &str = "cncquote";

const CONFIG_FILE: &str = "config.toml";

const QUOTES_SUBDIR: &str = "quotes";

/// Returns the configuration directory
///
/// `XDG_CONFIG_HOME` wins when set (Unix only), then the platform config
/// directory, then `.cncquote` in the working directory.
pub fn get_config_dir() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join(APP_DIR);
    }

    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".cncquote"))
}

pub fn get_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE)
}

/// Returns the base data directory
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".cncquote"))
}

/// Default directory for `quote --save` without an explicit path
pub fn get_quotes_dir() -> PathBuf {
    get_data_dir().join(QUOTES_SUBDIR)
}

/// Default file for a saved quote
pub fn default_quote_path(quote_id: &str) -> PathBuf {
    get_quotes_dir().join(format!("{quote_id}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_app_dir() {
        assert!(get_config_path().ends_with("cncquote/config.toml"));
        assert!(get_quotes_dir().ends_with("cncquote/quotes"));
    }

    #[test]
    fn test_quote_file_named_after_id() {
        let path = default_quote_path("QT-1-ABCDEF");
        assert_eq!(path.file_name().unwrap(), "QT-1-ABCDEF.json");
        assert_eq!(path.parent().unwrap(), get_quotes_dir());
    }
}

//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Locate the platform config file (~/.config/onair/config.toml on Linux,
/// platform config dir elsewhere)
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("onair").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    let system_config = PathBuf::from("/etc/onair/config.toml");
    if cfg!(target_os = "linux") && system_config.exists() {
        return Ok(system_config);
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("onair"))
        .unwrap_or_else(|| PathBuf::from("./onair_data"))
}

/// Service configuration loaded from `<root>/onair.toml` (all fields optional)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServiceConfig {
    /// HTTP bind host (default 127.0.0.1)
    pub host: Option<String>,
    /// HTTP bind port (default 5790)
    pub port: Option<u16>,
    /// Role store seeds, merged into the database on startup
    #[serde(default)]
    pub roles: RoleSeeds,
}

/// Seed rows for the role store. The allow-lists live in the database; these
/// entries are upserted at startup so deployments can manage roles without
/// touching the database by hand.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RoleSeeds {
    /// Emails granted the "artist" badge
    #[serde(default)]
    pub artist_emails: Vec<String>,
    /// Auth-provider user ids granted admin
    #[serde(default)]
    pub admin_user_ids: Vec<String>,
}

impl ServiceConfig {
    /// Load configuration from the root folder, tolerating absence.
    ///
    /// A missing file yields the default config; a malformed file is a
    /// startup error (misconfiguration should be loud, not silently ignored).
    pub fn load(root_folder: &Path) -> Result<Self> {
        let path = root_folder.join("onair.toml");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(5790)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_takes_priority() {
        let root = resolve_root_folder(Some("/tmp/onair-test"), "ONAIR_TEST_UNSET_VAR");
        assert_eq!(root, PathBuf::from("/tmp/onair-test"));
    }

    #[test]
    fn test_default_when_nothing_set() {
        let root = resolve_root_folder(None, "ONAIR_TEST_UNSET_VAR_2");
        assert!(!root.as_os_str().is_empty());
    }

    #[test]
    fn test_load_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load(dir.path()).unwrap();
        assert_eq!(config.port(), 5790);
        assert_eq!(config.host(), "127.0.0.1");
        assert!(config.roles.artist_emails.is_empty());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("onair.toml"),
            r#"
port = 6001

[roles]
artist_emails = ["artist@example.com"]
admin_user_ids = ["auth0|admin1"]
"#,
        )
        .unwrap();

        let config = ServiceConfig::load(dir.path()).unwrap();
        assert_eq!(config.port(), 6001);
        assert_eq!(config.roles.artist_emails, vec!["artist@example.com"]);
        assert_eq!(config.roles.admin_user_ids, vec!["auth0|admin1"]);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("onair.toml"), "port = \"not a number").unwrap();
        assert!(ServiceConfig::load(dir.path()).is_err());
    }
}

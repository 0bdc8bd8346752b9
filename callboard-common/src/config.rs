//! Configuration loading and store URL resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Default port the performance store listens on
pub const DEFAULT_STORE_PORT: u16 = 5780;

/// Resolve the performance store base URL, priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`store_url` key)
/// 4. Compiled default (localhost, default port)
pub fn resolve_store_url(cli_arg: Option<&str>, env_var_name: &str) -> Result<String> {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        return Ok(normalize_base_url(url));
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(env_var_name) {
        return Ok(normalize_base_url(&url));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(url) = config.get("store_url").and_then(|v| v.as_str()) {
                    return Ok(normalize_base_url(url));
                }
            }
        }
    }

    // Priority 4: Compiled default
    Ok(format!("http://127.0.0.1:{}", DEFAULT_STORE_PORT))
}

/// Strip a trailing slash so joined paths don't double up
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Locate the platform config file (`callboard/config.toml`)
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/callboard/config.toml first, then /etc/callboard/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("callboard").join("config.toml"));
        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/callboard/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("callboard").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

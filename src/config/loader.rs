// Configuration loader
// Loads settings from ~/.hotkeyndq/config.toml with environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;

/// Environment variable overriding `connection.ip`
pub const ENV_SERVER_IP: &str = "HOTKEYNDQ_SERVER_IP";
/// Environment variable overriding `connection.port`
pub const ENV_SERVER_PORT: &str = "HOTKEYNDQ_SERVER_PORT";

/// Directory holding config.toml and catalog.toml
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".hotkeyndq"))
}

/// Path of the main configuration file
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration from the default location or fall back to defaults
pub fn load_config() -> Result<Config> {
    load_config_at(&config_path()?)
}

/// Load `path`, apply environment overrides and validate the result
pub fn load_config_at(path: &Path) -> Result<Config> {
    let mut config = load_config_from(path)?;
    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Load configuration from a specific file; a missing file yields defaults
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Persist configuration to the default location
pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &config_path()?)
}

/// Persist configuration to a specific file, creating parent directories
pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Apply HOTKEYNDQ_SERVER_IP / HOTKEYNDQ_SERVER_PORT on top of file settings
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(ip) = std::env::var(ENV_SERVER_IP) {
        if !ip.trim().is_empty() {
            config.connection.ip = ip.trim().to_string();
        }
    }

    if let Ok(port) = std::env::var(ENV_SERVER_PORT) {
        match port.trim().parse::<u32>() {
            Ok(port) => config.connection.port = port,
            Err(_) => tracing::warn!("Ignoring {}={:?}: not a number", ENV_SERVER_PORT, port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.connection.ip = "10.0.0.5".to_string();
        config.connection.port = 6000;
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.connection.ip, "10.0.0.5");
        assert_eq!(loaded.connection.port, 6000);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[connection\nip = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    /// Runs `f` with the server overrides set, restoring the previous values after
    fn with_server_env(ip: Option<&str>, port: Option<&str>, f: impl FnOnce()) {
        let saved_ip = std::env::var(ENV_SERVER_IP).ok();
        let saved_port = std::env::var(ENV_SERVER_PORT).ok();
        let set = |key: &str, value: Option<&str>| match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        };

        set(ENV_SERVER_IP, ip);
        set(ENV_SERVER_PORT, port);
        f();
        set(ENV_SERVER_IP, saved_ip.as_deref());
        set(ENV_SERVER_PORT, saved_port.as_deref());
    }

    // One test owns the process environment so parallel tests cannot race on it
    #[test]
    fn test_env_overrides() {
        with_server_env(Some(" 10.1.1.1 "), Some("6001"), || {
            let mut config = Config::default();
            apply_env_overrides(&mut config);
            assert_eq!(config.connection.ip, "10.1.1.1");
            assert_eq!(config.connection.port, 6001);
        });

        with_server_env(Some("  "), Some("not-a-port"), || {
            let mut config = Config::default();
            apply_env_overrides(&mut config);
            assert_eq!(config.connection.ip, "192.168.0.100");
            assert_eq!(config.connection.port, 5555);
        });

        with_server_env(None, Some("6002"), || {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("config.toml");
            fs::write(&path, "[connection]\nip = \"10.0.0.9\"\nport = 5000\n").unwrap();

            let config = load_config_at(&path).unwrap();
            assert_eq!(config.connection.ip, "10.0.0.9");
            assert_eq!(config.connection.port, 6002);
        });
    }

    #[test]
    fn test_load_config_at_validates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[discovery]\ntimeout_ms = 0\n").unwrap();

        let err = load_config_at(&path).unwrap_err();
        assert!(err.to_string().contains("discovery.timeout_ms"));
    }
}

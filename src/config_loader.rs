use crate::config::Config;
use crate::settings::SettingsSource;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let config = read_config(config_path)?;
    config.validate()?;

    Ok(config)
}

fn read_config(config_path: &Path) -> Result<Config> {
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open config file '{}'", config_path.display()))?;

    let mut config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse config file '{}'", config_path.display()))?;

    config.nodes = resolve_relative(config_path, &config.nodes);
    Ok(config)
}

/// Resolve `path` against the directory holding the config file
fn resolve_relative(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub interval: Option<String>,
}

/// Apply CLI overrides to a configuration
pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(api_key) = &overrides.api_key {
        config.api_key = api_key.clone();
    }

    if let Some(interval) = &overrides.interval {
        config.interval = interval.clone();
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}

/// Settings re-read from the config file on every access.
///
/// Editing `api_key` or `interval` in the file takes effect at the next pass
/// or toggle. A file that no longer loads is reported and the last values that
/// did load stay in effect.
pub struct ConfigFileSettings {
    path: PathBuf,
    overrides: CliOverrides,
    last_good: RefCell<Config>,
}

impl ConfigFileSettings {
    /// `initial` is the configuration loaded at startup, with overrides applied.
    pub fn new(path: impl Into<PathBuf>, overrides: CliOverrides, initial: Config) -> Self {
        Self { path: path.into(), overrides, last_good: RefCell::new(initial) }
    }

    /// Reload the file, falling back to the last good configuration.
    pub fn current(&self) -> Config {
        let reloaded = read_config(&self.path).and_then(|mut config| {
            apply_cli_overrides(&mut config, &self.overrides)?;
            Ok(config)
        });

        match reloaded {
            Ok(config) => {
                *self.last_good.borrow_mut() = config.clone();
                config
            }
            Err(e) => {
                warn!("Keeping previous settings, config reload failed: {:#}", e);
                self.last_good.borrow().clone()
            }
        }
    }
}

impl SettingsSource for ConfigFileSettings {
    fn api_key(&self) -> String {
        self.current().api_key
    }

    fn interval_secs(&self) -> i64 {
        // Validation already ran on every config that reached here
        self.current().interval_secs().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_resolves_nodes_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("fleet.yaml");
        std::fs::write(&config_path, "nodes: data/nodes.json\ninterval: 5s\n").unwrap();

        let config = load_config(&config_path).unwrap();

        assert_eq!(config.nodes, dir.path().join("data/nodes.json"));
        assert_eq!(config.interval_secs().unwrap(), 5);
    }

    #[test]
    fn test_load_config_rejects_invalid_interval() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "nodes: /tmp/nodes.json\ninterval: whenever\n").unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "nodes: /tmp/nodes.json\napi_key: from-file\n").unwrap();

        let mut config = load_config(temp_file.path()).unwrap();
        let overrides = CliOverrides {
            api_key: Some("from-cli".to_string()),
            interval: Some("1m".to_string()),
        };
        apply_cli_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.api_key, "from-cli");
        assert_eq!(config.interval_secs().unwrap(), 60);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "nodes: /tmp/nodes.json\n").unwrap();

        let mut config = load_config(temp_file.path()).unwrap();
        let overrides = CliOverrides { api_key: None, interval: Some("never".to_string()) };

        assert!(apply_cli_overrides(&mut config, &overrides).is_err());
    }

    #[test]
    fn test_file_settings_follow_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.yaml");
        std::fs::write(&path, "nodes: n.json\napi_key: old\ninterval: 5\n").unwrap();
        let initial = load_config(&path).unwrap();
        let settings = ConfigFileSettings::new(&path, CliOverrides::default(), initial);

        assert_eq!(settings.api_key(), "old");
        assert_eq!(settings.interval_secs(), 5);

        std::fs::write(&path, "nodes: n.json\napi_key: new\ninterval: 0\n").unwrap();
        assert_eq!(settings.api_key(), "new");
        assert_eq!(settings.interval_secs(), 0);

        // A broken edit keeps the last good values
        std::fs::write(&path, "nodes: [unterminated\n").unwrap();
        assert_eq!(settings.api_key(), "new");
        assert_eq!(settings.poll_context().api_key, "new");
    }

    #[test]
    fn test_file_settings_keep_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.yaml");
        std::fs::write(&path, "nodes: n.json\napi_key: file\n").unwrap();
        let overrides = CliOverrides { api_key: Some("cli".to_string()), interval: None };
        let mut initial = load_config(&path).unwrap();
        apply_cli_overrides(&mut initial, &overrides).unwrap();
        let settings = ConfigFileSettings::new(&path, overrides, initial);

        std::fs::write(&path, "nodes: n.json\napi_key: rotated\n").unwrap();
        assert_eq!(settings.api_key(), "cli");
    }
}

//! YAML file loading into typed configuration models.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::error::{ConfigManagerError, Result};
use crate::utils::env_map;

pub const DEFAULT_CONFIG_FILE: &str = "app.yaml";
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Load a YAML file and deserialize it into `T`.
///
/// Relative lookups resolve `filename` under `$CONFIG_DIR` (default `config`);
/// with `abs_path` set, `filename` is used as given.
pub fn load_yaml_config<T: DeserializeOwned>(filename: &str, abs_path: bool) -> Result<T> {
    load_yaml_config_with_env(filename, abs_path, &env_map())
}

/// Load a YAML file using a provided env map.
pub fn load_yaml_config_with_env<T: DeserializeOwned>(
    filename: &str,
    abs_path: bool,
    env: &HashMap<String, String>,
) -> Result<T> {
    let path = resolve_config_path(filename, abs_path, env);
    info!(path = %path.display(), "Loading configuration");

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(path = %path.display(), "Configuration file not found");
            return Err(ConfigManagerError::ConfigFileNotFound(path));
        }
        Err(e) => return Err(ConfigManagerError::Io(e)),
    };

    let config = serde_yaml::from_str(&contents).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to validate configuration");
        ConfigManagerError::InvalidConfig {
            path: path.clone(),
            message: e.to_string(),
        }
    })?;

    info!(path = %path.display(), "Configuration loaded successfully");
    Ok(config)
}

fn resolve_config_path(filename: &str, abs_path: bool, env: &HashMap<String, String>) -> PathBuf {
    if abs_path {
        return PathBuf::from(filename);
    }
    let dir = env
        .get("CONFIG_DIR")
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CONFIG_DIR);
    Path::new(dir).join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct AppConfig {
        service_name: String,
        port: u16,
        #[serde(default)]
        providers: Vec<String>,
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn env_with_dir(dir: &Path) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("CONFIG_DIR".to_string(), dir.to_string_lossy().to_string());
        env
    }

    #[test]
    fn test_resolve_default_dir() {
        let path = resolve_config_path(DEFAULT_CONFIG_FILE, false, &HashMap::new());
        assert_eq!(path, Path::new("config").join("app.yaml"));
    }

    #[test]
    fn test_resolve_abs_path_ignores_config_dir() {
        let mut env = HashMap::new();
        env.insert("CONFIG_DIR".to_string(), "/etc/service".to_string());
        let path = resolve_config_path("/tmp/other.yaml", true, &env);
        assert_eq!(path, PathBuf::from("/tmp/other.yaml"));
    }

    #[test]
    fn test_load_from_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "app.yaml",
            "service_name: srv-ocr\nport: 8080\nproviders:\n  - local\n  - aws\n",
        );

        let config: AppConfig = load_yaml_config_with_env("app.yaml", false, &env_with_dir(dir.path())).unwrap();
        assert_eq!(
            config,
            AppConfig {
                service_name: "srv-ocr".to_string(),
                port: 8080,
                providers: vec!["local".to_string(), "aws".to_string()],
            }
        );
    }

    #[test]
    fn test_load_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "custom.yaml", "service_name: srv-llm\nport: 9000\n");

        let config: AppConfig =
            load_yaml_config_with_env(path.to_str().unwrap(), true, &HashMap::new()).unwrap();
        assert_eq!(config.service_name, "srv-llm");
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_yaml_config_with_env::<AppConfig>("absent.yaml", false, &env_with_dir(dir.path())).unwrap_err();
        match err {
            ConfigManagerError::ConfigFileNotFound(path) => assert!(path.ends_with("absent.yaml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "app.yaml", "service_name: srv-ocr\nport: not-a-port\n");

        let err = load_yaml_config_with_env::<AppConfig>("app.yaml", false, &env_with_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigManagerError::InvalidConfig { .. }));
    }

    #[test]
    fn test_missing_required_field() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "app.yaml", "port: 8080\n");

        let err = load_yaml_config_with_env::<AppConfig>("app.yaml", false, &env_with_dir(dir.path())).unwrap_err();
        assert!(err.to_string().contains("service_name"));
    }
}

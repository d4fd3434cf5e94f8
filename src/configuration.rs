use config::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

/// Settings file used when nothing else is specified.
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";

/// Environment variable that points the album selectors at another settings file.
pub const SETTINGS_PATH_VAR: &str = "ALBUMLINKS_SETTINGS";

/// Prefix for environment overrides, e.g. `ALBUMLINKS__MODULES__QOBUZ__PASSWORD`.
const ENV_PREFIX: &str = "ALBUMLINKS";

#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleSettings>,
}

/// Per-module section of the settings file.
///
/// Every field is optional because each module only uses a subset: Qobuz
/// needs the app credentials, Subsonic needs a server URL.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ModuleSettings {
    pub backend: Option<String>,
    pub service_name: Option<String>,
    pub netlocation: Option<String>,
    pub base_url: Option<String>,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl ModuleSettings {
    /// Backend that serves this module: the explicit `backend` key, else the module name.
    pub fn backend_for<'a>(&'a self, module: &'a str) -> &'a str {
        self.backend.as_deref().unwrap_or(module)
    }
}

/// Loads the JSON settings file, layering `ALBUMLINKS__*` environment overrides on top.
pub fn get_configuration(cfg_file: &str) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::new(cfg_file, config::FileFormat::Json))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    tracing::debug!(file = cfg_file, "settings loaded");
    settings.try_deserialize::<Settings>()
}

/// Settings path for the album selectors: `$ALBUMLINKS_SETTINGS` or the default.
pub fn settings_path() -> PathBuf {
    env::var(SETTINGS_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_settings(content: &str) -> (TempDir, String) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, content).unwrap();
        let path = path.to_str().unwrap().to_string();
        (temp_dir, path)
    }

    #[test]
    fn test_get_configuration_reads_modules() {
        let (_dir, path) = write_settings(
            r#"{
                "modules": {
                    "qobuz": {"app_id": "123456789", "app_secret": "s3cr3t", "username": "me@example.com", "password": "pw"},
                    "subsonic": {"base_url": "http://localhost:4533/rest", "username": "me", "password": "pw", "hidden": true}
                }
            }"#,
        );

        let settings = get_configuration(&path).unwrap();

        let qobuz = &settings.modules["qobuz"];
        assert_eq!(qobuz.app_id.as_deref(), Some("123456789"));
        assert_eq!(qobuz.username.as_deref(), Some("me@example.com"));
        assert!(!qobuz.hidden);

        let subsonic = &settings.modules["subsonic"];
        assert_eq!(subsonic.base_url.as_deref(), Some("http://localhost:4533/rest"));
        assert!(subsonic.hidden);
        assert_eq!(subsonic.backend_for("subsonic"), "subsonic");
    }

    #[test]
    fn test_get_configuration_without_modules() {
        let (_dir, path) = write_settings("{}");
        let settings = get_configuration(&path).unwrap();
        assert!(settings.modules.is_empty());
    }

    #[test]
    fn test_get_configuration_missing_file() {
        assert!(get_configuration("/definitely/not/here/settings.json").is_err());
    }

    #[test]
    fn test_get_configuration_malformed_json() {
        let (_dir, path) = write_settings("{ not json");
        assert!(get_configuration(&path).is_err());
    }
}

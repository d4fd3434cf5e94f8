use crate::configuration::{get_configuration, ModuleSettings};
use std::fmt;
use std::path::{Path, PathBuf};

/// Values shipped in the settings template that must be replaced before use.
const PLACEHOLDERS: [(&str, &str); 4] = [
    ("app_id", "YOUR_APP_ID"),
    ("app_secret", "YOUR_APP_SECRET"),
    ("username", "YOUR_QOBUZ_EMAIL"),
    ("password", "YOUR_QOBUZ_PASSWORD"),
];

/// The four values a login needs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum CredentialsError {
    SettingsNotFound(PathBuf),
    ParseError { path: PathBuf, message: String },
    ModuleMissing { module: String, path: PathBuf },
    MissingFields { path: PathBuf, fields: Vec<&'static str> },
    Placeholders { path: PathBuf, fields: Vec<&'static str> },
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CredentialsError::SettingsNotFound(path) => {
                write!(f, "Settings file not found at {}", path.display())
            }
            CredentialsError::ParseError { path, message } => {
                write!(f, "Could not parse {}: {}", path.display(), message)
            }
            CredentialsError::ModuleMissing { module, path } => {
                write!(f, "'{}' module settings not found in {}", module, path.display())
            }
            CredentialsError::MissingFields { path, fields } => write!(
                f,
                "Missing credentials in {}: {}",
                path.display(),
                fields.join(", ")
            ),
            CredentialsError::Placeholders { path, fields } => write!(
                f,
                "Placeholder credentials found in {}: {}. Please fill them in.",
                path.display(),
                fields.join(", ")
            ),
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Checks that every field is filled in and none still holds its template value.
pub fn validate_credentials(
    settings: &ModuleSettings,
    path: &Path,
) -> Result<Credentials, CredentialsError> {
    let fields = [
        ("app_id", settings.app_id.as_deref()),
        ("app_secret", settings.app_secret.as_deref()),
        ("username", settings.username.as_deref()),
        ("password", settings.password.as_deref()),
    ];

    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(CredentialsError::MissingFields {
            path: path.to_path_buf(),
            fields: missing,
        });
    }

    let placeholders: Vec<&'static str> = fields
        .iter()
        .zip(PLACEHOLDERS.iter())
        .filter(|((_, value), (_, placeholder))| value.map(str::trim) == Some(*placeholder))
        .map(|((name, _), _)| *name)
        .collect();
    if !placeholders.is_empty() {
        return Err(CredentialsError::Placeholders {
            path: path.to_path_buf(),
            fields: placeholders,
        });
    }

    let value = |i: usize| fields[i].1.unwrap_or_default().trim().to_string();
    Ok(Credentials {
        app_id: value(0),
        app_secret: value(1),
        username: value(2),
        password: value(3),
    })
}

/// Reads the credentials of `module` from the JSON settings file at `path`.
pub fn load_credentials(path: &Path, module: &str) -> Result<Credentials, CredentialsError> {
    if !path.is_file() {
        return Err(CredentialsError::SettingsNotFound(path.to_path_buf()));
    }

    let settings = get_configuration(&path.to_string_lossy()).map_err(|e| {
        CredentialsError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    let module_settings =
        settings
            .modules
            .get(module)
            .ok_or_else(|| CredentialsError::ModuleMissing {
                module: module.to_string(),
                path: path.to_path_buf(),
            })?;

    validate_credentials(module_settings, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings_file(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_load_credentials() {
        let (_dir, path) = settings_file(
            r#"{"modules": {"qobuz": {"app_id": "950096963", "app_secret": "abc", "username": "me@example.com", "password": "hunter2"}}}"#,
        );

        let credentials = load_credentials(&path, "qobuz").unwrap();

        assert_eq!(credentials.app_id, "950096963");
        assert_eq!(credentials.username, "me@example.com");
        assert_eq!(credentials.password, "hunter2");
    }

    #[test]
    fn test_missing_fields_are_all_named() {
        let (_dir, path) = settings_file(
            r#"{"modules": {"qobuz": {"app_id": "", "username": "me@example.com", "password": " "}}}"#,
        );

        match load_credentials(&path, "qobuz") {
            Err(CredentialsError::MissingFields { fields, .. }) => {
                assert_eq!(fields, vec!["app_id", "app_secret", "password"]);
            }
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn test_placeholders_are_all_named() {
        let (_dir, path) = settings_file(
            r#"{"modules": {"qobuz": {"app_id": "YOUR_APP_ID", "app_secret": "real", "username": "me@example.com", "password": "YOUR_QOBUZ_PASSWORD"}}}"#,
        );

        let err = load_credentials(&path, "qobuz").unwrap_err();

        match &err {
            CredentialsError::Placeholders { fields, .. } => {
                assert_eq!(fields, &vec!["app_id", "password"]);
            }
            other => panic!("expected placeholders, got {:?}", other),
        }
        assert!(err.to_string().contains("app_id, password"));
    }

    #[test]
    fn test_missing_module() {
        let (_dir, path) = settings_file(r#"{"modules": {"tidal": {}}}"#);

        assert!(matches!(
            load_credentials(&path, "qobuz"),
            Err(CredentialsError::ModuleMissing { .. })
        ));
    }

    #[test]
    fn test_missing_settings_file() {
        let temp_dir = TempDir::new().unwrap();

        assert!(matches!(
            load_credentials(&temp_dir.path().join("nope.json"), "qobuz"),
            Err(CredentialsError::SettingsNotFound(_))
        ));
    }

    #[test]
    fn test_unparseable_settings_file() {
        let (_dir, path) = settings_file("{\"modules\": ");

        assert!(matches!(
            load_credentials(&path, "qobuz"),
            Err(CredentialsError::ParseError { .. })
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let credentials = Credentials {
            app_id: "1".to_string(),
            app_secret: "topsecret".to_string(),
            username: "me".to_string(),
            password: "hunter2".to_string(),
        };

        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("hunter2"));
    }
}

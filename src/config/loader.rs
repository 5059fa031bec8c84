//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::env::EnvOverrides;
use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse settings from a TOML file without validating them.
pub fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the final settings: defaults, then the optional file, then overrides.
pub fn load_settings(
    path: Option<&Path>,
    overrides: EnvOverrides,
) -> Result<Settings, ConfigError> {
    let mut settings = match path {
        Some(path) => read_settings(path)?,
        None => Settings::default(),
    };
    overrides.apply(&mut settings);

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "cors-proxy-{}-{}.toml",
            name,
            uuid::Uuid::new_v4()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_overrides_win_over_file() {
        let path = temp_file(
            "override",
            r#"
            [listener]
            port = 4000

            [access]
            origin_whitelist = ["http://file.com"]
            "#,
        );

        let settings = load_settings(
            Some(&path),
            EnvOverrides {
                origin_whitelist: Some("http://env.com".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(settings.listener.port, 4000);
        assert_eq!(settings.access.origin_whitelist, vec!["http://env.com"]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let path = temp_file("invalid", "[forwarding]\nhop_timeout_secs = 0\n");
        let err = load_settings(Some(&path), EnvOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file() {
        let err = load_settings(
            Some(Path::new("/definitely/not/here.toml")),
            EnvOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

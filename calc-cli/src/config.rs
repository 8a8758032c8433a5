//! Settings for the `fincalc` binary.
//!
//! Resolution order, highest priority first:
//!
//! | source                         | example                          |
//! |--------------------------------|----------------------------------|
//! | command line flags             | `--backend sqlite --db calc.db`  |
//! | TOML file                      | `--config`, `$FINCALC_CONFIG`, `./fincalc.toml` |
//! | built-in defaults              | memory store, `info` level       |
//!
//! ```toml
//! locale = "it"
//! log_level = "debug"
//! log_file = "fincalc.log"
//!
//! [store]
//! backend = "sqlite"
//! connection_string = "fincalc.db"
//! ```

use std::path::{Path, PathBuf};

use calc_core::Locale;
use calc_core::store::StoreConfig;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "FINCALC_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "fincalc.toml";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown locale '{0}'; expected es, it or en")]
    UnknownLocale(String),
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub store: StoreSection,
    pub locale: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
    pub locale: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreConfig,
    /// Display locale; `None` renders each calculator in its own language.
    pub locale: Option<Locale>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the config file chosen by `explicit`, `$FINCALC_CONFIG` or
    /// `./fincalc.toml`. Only an explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => PathBuf::from(path),
                None => {
                    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                    if !local.is_file() {
                        return Ok(Self::default());
                    }
                    local
                }
            },
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let defaults = StoreConfig::default();
        let store = StoreConfig {
            backend: overrides
                .backend
                .or(file.store.backend)
                .unwrap_or(defaults.backend),
            connection_string: overrides
                .connection_string
                .or(file.store.connection_string)
                .unwrap_or(defaults.connection_string),
        };

        let locale = overrides
            .locale
            .or(file.locale)
            .map(|raw| Locale::parse(&raw).ok_or(ConfigError::UnknownLocale(raw)))
            .transpose()?;

        Ok(Self {
            store,
            locale,
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: overrides.log_file.or(file.log_file),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(text: &str) -> FileConfig {
        FileConfig::parse(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = Settings::resolve(FileConfig::default(), Overrides::default()).unwrap();

        assert_eq!(settings.store, StoreConfig::default());
        assert_eq!(settings.locale, None);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn file_values_apply() {
        let file = parse(
            r#"
            locale = "es"
            log_level = "debug"

            [store]
            backend = "sqlite"
            connection_string = "calc.db"
            "#,
        );

        let settings = Settings::resolve(file, Overrides::default()).unwrap();

        assert_eq!(settings.store.backend, "sqlite");
        assert_eq!(settings.store.connection_string, "calc.db");
        assert_eq!(settings.locale, Some(Locale::Es));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn flags_override_file() {
        let file = parse("locale = \"es\"\n[store]\nbackend = \"sqlite\"\n");
        let overrides = Overrides {
            backend: Some("memory".to_string()),
            locale: Some("en".to_string()),
            ..Overrides::default()
        };

        let settings = Settings::resolve(file, overrides).unwrap();

        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.locale, Some(Locale::En));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::parse("colour = \"red\"", Path::new("bad.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn unknown_locale_is_rejected() {
        let overrides = Overrides {
            locale: Some("fr".to_string()),
            ..Overrides::default()
        };

        let err = Settings::resolve(FileConfig::default(), overrides).unwrap_err();

        assert!(matches!(err, ConfigError::UnknownLocale(l) if l == "fr"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = FileConfig::load(Some(Path::new("/nonexistent/fincalc.toml"))).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

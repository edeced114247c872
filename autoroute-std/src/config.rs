//! Configuration loading using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Values merged programmatically with [`ConfigLoader::merge`]
//! 3. Config file (`autoroute.toml` in the working directory, or the file
//!    given to [`ConfigLoader::file`])
//! 4. Environment variables (`AUTOROUTE_*`)
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `AUTOROUTE_` prefix with `__` as separator:
//!
//! - `AUTOROUTE_NAMESPACE=my_app::routes` → `namespace = "my_app::routes"`
//! - `AUTOROUTE_OVERVIEW_PATH=/_routes` → `overview_path = "/_routes"`
//! - `AUTOROUTE_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//!
//! # Example
//!
//! ```rust,ignore
//! use autoroute::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//! autoroute::logging::init(&config.logging)?;
//! let mut router = Autorouter::from_config(&config, engine);
//! router.route()?;
//! ```

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, trace};

/// The file searched for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "autoroute.toml";

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The merged sources could not be deserialized.
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// The values deserialized but make no sense together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Scan progress and generated adapters.
    Debug,
    /// Bind summaries.
    #[default]
    Info,
    /// Skipped handlers.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// The level as an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One short line per event.
    #[default]
    Compact,
    /// The default `fmt` layout.
    Full,
    /// Multi-line, human oriented.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level, used when `RUST_LOG` is not set.
    pub level: LogLevel,
    /// Output layout.
    pub format: LogFormat,
    /// Per-target overrides, e.g. `autoroute_std = "debug"`.
    pub filters: BTreeMap<String, LogLevel>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutorouteConfig {
    /// The module path to scan.
    pub namespace: String,
    /// Where to mount the route overview, if anywhere.
    pub overview_path: Option<String>,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Layered configuration loader.
pub struct ConfigLoader {
    figment: Figment,
    config_file: Option<PathBuf>,
    load_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader reading defaults, `autoroute.toml` and the environment.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            config_file: None,
            load_env: true,
        }
    }

    /// Read `path` instead of searching for `autoroute.toml`.
    ///
    /// Loading fails if the file does not exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read `AUTOROUTE_*` environment variables (the default).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Ignore the environment.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merge values below any file and environment source.
    pub fn merge(mut self, config: AutorouteConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Load and validate the configuration.
    pub fn load(self) -> Result<AutorouteConfig, ConfigError> {
        let figment = self.build_figment()?;
        let config: AutorouteConfig = figment.extract().map_err(Box::new)?;

        if let Some(path) = config
            .overview_path
            .as_deref()
            .filter(|path| !path.starts_with('/'))
        {
            return Err(ConfigError::Invalid(format!(
                "overview_path must start with '/': {path}"
            )));
        }

        debug!(
            namespace = %config.namespace,
            logging_level = %config.logging.level,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(self) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AutorouteConfig::default()))
            .merge(self.figment);

        match self.config_file {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration file");
                figment = figment.merge(Toml::file(path));
            }
            Some(path) => return Err(ConfigError::FileNotFound(path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    info!(path = %path.display(), "Loading configuration file");
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        if self.load_env {
            trace!("Loading environment variables with AUTOROUTE_ prefix");
            figment = figment.merge(Env::prefixed("AUTOROUTE_").split("__"));
        }

        Ok(figment)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::new().without_env().load().unwrap();
            assert_eq!(config, AutorouteConfig::default());
            assert_eq!(config.logging.level, LogLevel::Info);
            Ok(())
        });
    }

    #[test]
    fn file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "autoroute.toml",
                r#"
                namespace = "shop::routes"
                overview_path = "/_routes"

                [logging]
                level = "warn"
                format = "json"

                [logging.filters]
                autoroute_std = "trace"
                "#,
            )?;
            jail.set_env("AUTOROUTE_LOGGING__LEVEL", "debug");

            let config = ConfigLoader::new().load().unwrap();
            assert_eq!(config.namespace, "shop::routes");
            assert_eq!(config.overview_path.as_deref(), Some("/_routes"));
            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.logging.format, LogFormat::Json);
            assert_eq!(
                config.logging.filters.get("autoroute_std"),
                Some(&LogLevel::Trace)
            );
            Ok(())
        });
    }

    #[test]
    fn explicit_file_must_exist() {
        Jail::expect_with(|_jail| {
            let err = ConfigLoader::new().file("missing.toml").load().unwrap_err();
            assert!(matches!(err, ConfigError::FileNotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn merged_values_sit_below_the_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("AUTOROUTE_NAMESPACE", "from_env");
            let config = ConfigLoader::new()
                .merge(AutorouteConfig {
                    namespace: "merged".into(),
                    ..AutorouteConfig::default()
                })
                .load()
                .unwrap();
            assert_eq!(config.namespace, "from_env");
            Ok(())
        });
    }

    #[test]
    fn relative_overview_path_is_invalid() {
        Jail::expect_with(|jail| {
            jail.set_env("AUTOROUTE_OVERVIEW_PATH", "routes");
            let err = ConfigLoader::new().load().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
            Ok(())
        });
    }
}

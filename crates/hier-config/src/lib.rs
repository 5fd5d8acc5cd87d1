//! Configuration for hierarchy builds.
//!
//! Configuration is read from TOML (`hier.toml` or `.hier/config.toml` in a
//! workspace root). Every field has a default, so an empty file is a valid
//! config.

use std::path::{Path, PathBuf};
use std::sync::Once;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod schema;

pub use schema::{json_schema, json_schema_string};

/// Environment variable that overrides config discovery.
pub const HIER_CONFIG_ENV_VAR: &str = "HIER_CONFIG_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HierarchyConfig {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Number of units or classes processed between cancellation checks.
    #[serde(default = "BuildConfig::default_cancel_check_interval")]
    #[schemars(range(min = 1))]
    pub cancel_check_interval: u32,

    /// Connect compiled classes before sources are entered, so compiled
    /// classes can never resolve to source declarations.
    ///
    /// When disabled, all units are entered first and connected in one pass.
    #[serde(default = "BuildConfig::default_connect_compiled_first")]
    pub connect_compiled_first: bool,
}

impl BuildConfig {
    fn default_cancel_check_interval() -> u32 {
        256
    }

    fn default_connect_compiled_first() -> bool {
        true
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cancel_check_interval: Self::default_cancel_check_interval(),
            connect_compiled_first: Self::default_connect_compiled_first(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Upper bound for the payload of one encoded stub unit, in bytes.
    #[serde(default = "CodecConfig::default_max_payload_bytes")]
    #[schemars(range(min = 1))]
    pub max_payload_bytes: u64,
}

impl CodecConfig {
    fn default_max_payload_bytes() -> u64 {
        16 * 1024 * 1024
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: Self::default_max_payload_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level merged with `RUST_LOG`.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` quotes a snippet of the input; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl HierarchyConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    /// Parse and validate a TOML config.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: HierarchyConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.cancel_check_interval == 0 {
            return Err(ConfigError::Invalid {
                field: "build.cancel_check_interval",
                message: "must be at least 1".to_owned(),
            });
        }
        if self.codec.max_payload_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "codec.max_payload_bytes",
                message: "must be at least 1".to_owned(),
            });
        }
        let directives = LoggingConfig::normalize_level_directives(&self.logging.level);
        if let Err(err) = tracing_subscriber::EnvFilter::try_new(&directives) {
            return Err(ConfigError::Invalid {
                field: "logging.level",
                message: err.to_string(),
            });
        }
        Ok(())
    }
}

/// Discover the config file for a workspace root.
///
/// Search order:
/// 1) `HIER_CONFIG_PATH` (absolute or relative to `workspace_root`)
/// 2) `hier.toml` in `workspace_root`
/// 3) `.hier/config.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(HIER_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path);
    }

    ["hier.toml", ".hier/config.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
}

/// Load the config for a workspace root, falling back to defaults when no
/// config file exists.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(HierarchyConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((HierarchyConfig::default(), None));
    };
    let config = HierarchyConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Install a global `fmt` subscriber for the process.
///
/// Only the first call has an effect. A subscriber installed by someone else
/// is left in place.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true);
        let result = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if result.is_err() {
            tracing::debug!(
                target = "hier.config",
                "global tracing subscriber already installed"
            );
        }
    });
}

//! Layered application configuration and typed module sections.
//!
//! Layers, lowest to highest: built-in defaults, optional YAML file,
//! `PHARMACY__*` environment variables, CLI overrides.
//!
//! Module sections live under `modules.<name>.config` and are read through
//! [`ConfigProvider`] with either a lenient or a strict loader.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides, e.g. `PHARMACY__SERVER__BIND_ADDR`
pub const ENV_PREFIX: &str = "PHARMACY__";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to load configuration: {0}")]
    Load(#[source] Box<figment::Error>),
    #[error("module '{module}' not found")]
    ModuleNotFound { module: String },
    #[error("module '{module}' config must be an object")]
    InvalidModuleStructure { module: String },
    #[error("missing 'config' section in module '{module}'")]
    MissingConfigSection { module: String },
    #[error("invalid config for module '{module}': {source}")]
    InvalidConfig {
        module: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to render configuration: {0}")]
    Render(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Upper bound on draining the background worker at shutdown
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_owned(),
            shutdown_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,pharmacy=debug`
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Raw per-module sections, `{ config: {...} }`
    pub modules: BTreeMap<String, serde_json::Value>,
}

impl AppConfig {
    /// Merge defaults, the optional YAML file and the environment.
    ///
    /// # Errors
    /// [`ConfigError::FileNotFound`] for a missing file, [`ConfigError::Load`]
    /// when a layer cannot be parsed into the schema.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Replace the port of `server.bind_addr`, keeping the host.
    pub fn override_port(&mut self, port: u16) {
        self.server.bind_addr = match self.server.bind_addr.parse::<SocketAddr>() {
            Ok(mut addr) => {
                addr.set_port(port);
                addr.to_string()
            }
            Err(_) => {
                let host = self
                    .server
                    .bind_addr
                    .rsplit_once(':')
                    .map_or(self.server.bind_addr.as_str(), |(host, _)| host);
                format!("{host}:{port}")
            }
        };
    }

    /// Pretty JSON of the effective configuration
    ///
    /// # Errors
    /// [`ConfigError::Render`] if a module section cannot be serialized.
    pub fn to_pretty_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Render)
    }
}

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    /// Raw section for the module, if any
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

impl ConfigProvider for AppConfig {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.modules.get(module_name)
    }
}

fn config_section<'a>(
    provider: &'a dyn ConfigProvider,
    module_name: &str,
) -> Option<&'a serde_json::Value> {
    provider
        .get_module_config(module_name)?
        .as_object()?
        .get("config")
}

fn parse_section<T: DeserializeOwned>(
    module_name: &str,
    section: &serde_json::Value,
) -> Result<T, ConfigError> {
    T::deserialize(section).map_err(|e| ConfigError::InvalidConfig {
        module: module_name.to_owned(),
        source: e,
    })
}

/// Lenient loader: a missing module, a non-object module or a missing
/// `config` key all yield `T::default()`.
///
/// # Errors
/// [`ConfigError::InvalidConfig`] when the section exists but does not parse.
pub fn module_config_or_default<T: DeserializeOwned + Default>(
    provider: &dyn ConfigProvider,
    module_name: &str,
) -> Result<T, ConfigError> {
    match config_section(provider, module_name) {
        Some(section) => parse_section(module_name, section),
        None => Ok(T::default()),
    }
}

/// Strict loader: the module and its `config` section must exist and parse.
///
/// # Errors
/// Returns the first structural problem found, or
/// [`ConfigError::InvalidConfig`].
pub fn module_config_required<T: DeserializeOwned>(
    provider: &dyn ConfigProvider,
    module_name: &str,
) -> Result<T, ConfigError> {
    let module_raw =
        provider
            .get_module_config(module_name)
            .ok_or_else(|| ConfigError::ModuleNotFound {
                module: module_name.to_owned(),
            })?;

    let obj = module_raw
        .as_object()
        .ok_or_else(|| ConfigError::InvalidModuleStructure {
            module: module_name.to_owned(),
        })?;

    let section = obj
        .get("config")
        .ok_or_else(|| ConfigError::MissingConfigSection {
            module: module_name.to_owned(),
        })?;

    parse_section(module_name, section)
}

//! Startup configuration loading.
//!
//! The sandbox configuration is loaded exactly once, validated, and then
//! shared read-only for the process lifetime. Sources, in order: an optional
//! TOML file named by `CRUCIBLE_CONFIG`, falling back to built-in defaults.
//! The listen address comes from `CRUCIBLE_LISTEN_ADDR`.

use crucible_core::{CoreError, SandboxConfig};

/// Default bind address when `CRUCIBLE_LISTEN_ADDR` is unset.
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Everything the gateway needs to start.
#[derive(Debug)]
pub struct GatewaySettings {
    /// Address to bind the HTTP listener to.
    pub listen_addr: String,
    /// The process-wide sandbox configuration.
    pub sandbox: SandboxConfig,
}

/// Errors while loading startup configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SettingsError {
    /// The config file named by `CRUCIBLE_CONFIG` could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`SandboxConfig`].
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The loaded configuration failed validation.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// Load and validate settings from the environment.
///
/// # Errors
/// Returns [`SettingsError`] when the config file is unreadable, malformed,
/// or fails validation.
pub fn load() -> Result<GatewaySettings, SettingsError> {
    let listen_addr = std::env::var("CRUCIBLE_LISTEN_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_owned());

    let sandbox = match std::env::var("CRUCIBLE_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|source| SettingsError::Read { path: path.clone(), source })?;
            let config: SandboxConfig = toml::from_str(&raw)
                .map_err(|source| SettingsError::Parse { path: path.clone(), source })?;
            tracing::info!(%path, "sandbox configuration loaded from file");
            config
        }
        Err(_) => SandboxConfig::default(),
    };

    sandbox.validate()?;
    Ok(GatewaySettings { listen_addr, sandbox })
}

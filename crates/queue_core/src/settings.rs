use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_SERVER_BASE: &str = "http://localhost:5283";
pub const DEFAULT_DEVICE_NAME: &str = "Browser";

pub const APPEND_QUEUE_PATH: &str = "/append-queue";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Server must start with http:// or https://")]
    UnsupportedScheme,
    #[error("invalid server address {input:?}: {reason}")]
    InvalidServerBase { input: String, reason: String },
}

/// User configuration as kept by the external settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub server_base: String,
    pub device_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_base: DEFAULT_SERVER_BASE.to_string(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Builds validated settings from raw form input.
    pub fn from_input(server_base: &str, device_name: &str) -> Result<Self, SettingsError> {
        let server_base = server_base.trim();
        parse_server_base(server_base)?;
        let device_name = device_name.trim();
        Ok(Self {
            server_base: server_base.to_string(),
            device_name: if device_name.is_empty() {
                DEFAULT_DEVICE_NAME.to_string()
            } else {
                device_name.to_string()
            },
        })
    }

    /// Blank values in a stored record fall back to the defaults.
    pub fn with_defaults(self) -> Self {
        let server_base = self.server_base.trim();
        let device_name = self.device_name.trim();
        Self {
            server_base: if server_base.is_empty() {
                DEFAULT_SERVER_BASE.to_string()
            } else {
                server_base.to_string()
            },
            device_name: if device_name.is_empty() {
                DEFAULT_DEVICE_NAME.to_string()
            } else {
                device_name.to_string()
            },
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        parse_server_base(&self.server_base).map(|_| ())
    }
}

/// Joins `path` onto the server base. The path is absolute, so any path on
/// the base is replaced (`http://h/api` + `/health` = `http://h/health`).
pub fn endpoint(server_base: &str, path: &str) -> Result<Url, SettingsError> {
    let base = parse_server_base(server_base.trim())?;
    base.join(path)
        .map_err(|err| SettingsError::InvalidServerBase {
            input: server_base.to_string(),
            reason: err.to_string(),
        })
}

fn parse_server_base(input: &str) -> Result<Url, SettingsError> {
    let lowered = input.to_ascii_lowercase();
    if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
        return Err(SettingsError::UnsupportedScheme);
    }
    let url = Url::parse(input).map_err(|err| SettingsError::InvalidServerBase {
        input: input.to_string(),
        reason: err.to_string(),
    })?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(SettingsError::InvalidServerBase {
            input: input.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}

use std::sync::{PoisonError, RwLock};

use queue_core::{Settings, SettingsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] SettingsError),
    #[error("could not save settings: {0}")]
    Persist(String),
}

/// Settings store read on every submission and written by the options page.
#[async_trait::async_trait]
pub trait SettingsSource: Send + Sync {
    /// Current settings with defaults filled in.
    async fn load(&self) -> Settings;

    async fn save(&self, settings: Settings) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct SharedSettings {
    current: RwLock<Settings>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: RwLock::new(settings.with_defaults()),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, settings: Settings) -> Result<(), StoreError> {
        let settings = settings.with_defaults();
        settings.validate()?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = settings;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SettingsSource for SharedSettings {
    async fn load(&self) -> Settings {
        self.snapshot()
    }

    async fn save(&self, settings: Settings) -> Result<(), StoreError> {
        self.replace(settings)
    }
}

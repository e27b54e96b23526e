use std::path::{Path, PathBuf};

use queue_core::Settings;
use queue_engine::{read_optional, AtomicFileWriter, SettingsSource, SharedSettings, StoreError};
use queue_logging::{queue_info, queue_warn};

pub(crate) const SETTINGS_FILENAME: &str = ".cosmos_queue_settings.ron";

/// Reads the settings file. A missing file gives the defaults, an unreadable
/// one is logged and also gives the defaults.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let content = match read_optional(path) {
        Ok(Some(text)) => text,
        Ok(None) => return Settings::default(),
        Err(err) => {
            queue_warn!("Failed to read settings from {:?}: {}", path, err);
            return Settings::default();
        }
    };

    match ron::from_str::<Settings>(&content) {
        Ok(settings) => {
            queue_info!("Loaded settings from {:?}", path);
            settings.with_defaults()
        }
        Err(err) => {
            queue_warn!("Failed to parse settings from {:?}: {}", path, err);
            Settings::default()
        }
    }
}

pub(crate) fn save_settings(path: &Path, settings: &Settings) -> Result<(), StoreError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(settings, pretty)
        .map_err(|err| StoreError::Persist(err.to_string()))?;
    AtomicFileWriter::new(path)
        .write(&content)
        .map_err(|err| StoreError::Persist(err.to_string()))
}

/// Settings kept in memory and mirrored to a RON file on every save.
pub(crate) struct FileSettings {
    path: PathBuf,
    current: SharedSettings,
}

impl FileSettings {
    pub(crate) fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = SharedSettings::new(load_settings(&path));
        Self { path, current }
    }

    pub(crate) fn snapshot(&self) -> Settings {
        self.current.snapshot()
    }
}

#[async_trait::async_trait]
impl SettingsSource for FileSettings {
    async fn load(&self) -> Settings {
        self.current.snapshot()
    }

    async fn save(&self, settings: Settings) -> Result<(), StoreError> {
        let settings = settings.with_defaults();
        settings.validate()?;
        save_settings(&self.path, &settings)?;
        self.current.replace(settings)?;
        queue_info!("Saved settings to {:?}", self.path);
        Ok(())
    }
}

// # Settings File
//
// YAML persistence for [`Settings`] between runs.
//
// ## File Format
//
// ```yaml
// gateway: 192.168.1.1
// address: 192.168.88.1:8728
// username: admin
// ```
//
// ## Failure Handling
//
// - Missing file: defaults, not an error
// - Unparsable file: error from `load()`; callers usually log it and use defaults
// - Writes go to a temporary file that is then renamed over the real one, so
//   a crash mid-write never leaves a truncated file behind

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::config::Settings;
use crate::{Error, Result};

/// A settings file at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Point at `path`; nothing is read or created yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings, or defaults if the file does not exist
    pub async fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            tracing::debug!("Settings file does not exist: {}", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read settings file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_yaml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse settings file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Write the settings atomically, creating the directory if needed
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            create_private_dir(parent).await?;
        }

        let yaml = serde_yaml::to_string(settings)?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(yaml.as_bytes()).await?;
            file.flush().await?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::config(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!("Settings written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[cfg(unix)]
async fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true).mode(0o700);
    builder.create(dir).await.map_err(|e| {
        Error::config(format!(
            "Failed to create settings directory {}: {}",
            dir.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
async fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).await.map_err(|e| {
        Error::config(format!(
            "Failed to create settings directory {}: {}",
            dir.display(),
            e
        ))
    })
}

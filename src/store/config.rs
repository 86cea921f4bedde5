use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HubError;
use crate::model::ClientConfig;

const CONFIG_FILE: &str = "config.toml";

/// `config.toml` in the prompthub config directory.
pub struct ConfigStore {
    root: PathBuf,
    config: ClientConfig,
}

impl ConfigStore {
    pub fn open(config_dir: Option<&Path>) -> Result<Self, HubError> {
        let root = match config_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_config_dir()?,
        };
        let config = load_config(&root)?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn save_config(&self) -> Result<(), HubError> {
        fs::create_dir_all(&self.root).map_err(|source| HubError::DirCreate {
            path: self.root.clone(),
            source,
        })?;
        let path = self.path();
        let content = toml::to_string_pretty(&self.config)?;
        fs::write(&path, content).map_err(|source| HubError::FileWrite { path, source })?;
        Ok(())
    }
}

fn default_config_dir() -> Result<PathBuf, HubError> {
    dirs::config_dir()
        .map(|d| d.join("prompthub"))
        .ok_or(HubError::ConfigDirNotFound)
}

fn load_config(root: &Path) -> Result<ClientConfig, HubError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let content = fs::read_to_string(&path).map_err(|source| HubError::FileRead {
        path: path.clone(),
        source,
    })?;
    let config: ClientConfig = toml::from_str(&content)?;
    Ok(config)
}

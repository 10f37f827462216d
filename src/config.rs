use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub recording: RecordingConfig,
    pub log: LogConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RecordingConfig {
    // Used when -d is not given
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    // Base verbosity; each -v on the command line adds one
    pub verbosity: u8,
}

impl Config {
    /// Loads `~/.exerec/config.toml`, or the defaults when there is none.
    pub fn new() -> Result<Self> {
        Self::load(&Self::get_config_path())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn get_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".exerec")
            .join("config.toml")
    }

    pub fn effective_verbosity(&self, flags: u8) -> u8 {
        self.log.verbosity.saturating_add(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::load(&dir.path().join("config.toml"))?;
        assert_eq!(config, Config::default());
        assert_eq!(config.recording.dir, None);
        assert_eq!(config.effective_verbosity(2), 2);
        Ok(())
    }

    #[test]
    fn reads_partial_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "[recording]\ndir = \"/tmp/recordings\"\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.recording.dir, Some(PathBuf::from("/tmp/recordings")));
        assert_eq!(config.log.verbosity, 0);
        Ok(())
    }

    #[test]
    fn verbosity_adds_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "[log]\nverbosity = 1\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.effective_verbosity(0), 1);
        assert_eq!(config.effective_verbosity(2), 3);
        assert_eq!(config.effective_verbosity(u8::MAX), u8::MAX);
        Ok(())
    }

    #[test]
    fn rejects_invalid_toml() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "[log\nverbosity = ")?;
        assert!(Config::load(&path).is_err());
        Ok(())
    }
}

//! Build configuration loaded from `dvhc.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matching::MatchWeights;

/// Environment variable naming the config file when `--config` is not given.
pub const CONFIG_ENV: &str = "DVHC_CONFIG";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Paths of the three source documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    /// Pre-merger tabular catalog (`.json` or `.csv`).
    pub catalog: PathBuf,
    /// New-unit dump.
    pub units: PathBuf,
    /// Per-new-province merger records.
    pub provinces: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("excelData.json"),
            units: PathBuf::from("rawApiData.json"),
            provinces: PathBuf::from("rawProvinceData.json"),
        }
    }
}

impl InputPaths {
    /// Resolves relative paths against `base`.
    pub fn relative_to(&self, base: &Path) -> Self {
        let join = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { base.join(p) };
        Self {
            catalog: join(&self.catalog),
            units: join(&self.units),
            provinces: join(&self.provinces),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("web/data"),
        }
    }
}

/// Full build configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub inputs: InputPaths,
    pub output: OutputConfig,
    pub scoring: MatchWeights,
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a config file. Relative input and output paths are taken
    /// relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.inputs = config.inputs.relative_to(base);
            if config.output.dir.is_relative() {
                config.output.dir = base.join(&config.output.dir);
            }
        }
        Ok(config)
    }

    /// Loads the file named by `explicit`, else by [`CONFIG_ENV`], else
    /// returns the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => Self::load(Path::new(&path)),
                None => Ok(Self::default()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.inputs.catalog, PathBuf::from("excelData.json"));
        assert_eq!(config.output.dir, PathBuf::from("web/data"));
        assert_eq!(config.scoring, MatchWeights::default());
    }

    #[test]
    fn test_partial_config() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [inputs]
            catalog = "catalog.csv"

            [scoring]
            parent_match = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.inputs.catalog, PathBuf::from("catalog.csv"));
        assert_eq!(config.inputs.units, PathBuf::from("rawApiData.json"));
        assert_eq!(config.scoring.parent_match, 5);
        assert_eq!(config.scoring.named_fragment, 1);
    }

    #[test]
    fn test_invalid_config() {
        let err = PipelineConfig::from_toml_str("[scoring]\nparent_match = \"high\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dvhc.toml");
        std::fs::write(&path, "[output]\ndir = \"out\"\n").unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.output.dir, dir.path().join("out"));
        assert_eq!(config.inputs.units, dir.path().join("rawApiData.json"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/dvhc.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

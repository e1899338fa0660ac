use crate::fetch::DEFAULT_ENDPOINT;
use crate::render::{self, OutputFormat};
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// One config file. Unset keys leave the lower layer alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content)?;
        Ok(file)
    }
}

/// Effective configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub format: OutputFormat,
    /// `None` means detect from the environment
    pub locale: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            format: OutputFormat::default(),
            locale: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default paths.
    /// Priority: local (.userlist/config.local.toml) > project (.userlist/config.toml)
    /// > user (~/.userlist/config.toml) > built-in defaults
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir();
        Self::load_layers(home.as_deref(), Path::new("."))
    }

    fn load_layers(home: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let mut paths = Vec::new();
        if let Some(home) = home {
            paths.push(home.join(".userlist").join("config.toml"));
        }
        let project_dir = project_root.join(".userlist");
        paths.push(project_dir.join("config.toml"));
        // Should be gitignored
        paths.push(project_dir.join("config.local.toml"));

        for path in paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                config.merge(ConfigFile::load_from(&path)?);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific path, over the built-in defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(ConfigFile::load_from(path)?);
        Ok(config)
    }

    /// Merge a config file into this one (the file takes priority)
    pub fn merge(&mut self, other: ConfigFile) {
        if let Some(endpoint) = other.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(format) = other.format {
            self.format = format;
        }
        if other.locale.is_some() {
            self.locale = other.locale;
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file;
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let endpoint = self.endpoint.trim();
        let scheme_ok = ["http://", "https://"]
            .iter()
            .any(|scheme| endpoint.starts_with(scheme) && endpoint.len() > scheme.len());
        if !scheme_ok {
            errors.push(ValidationError {
                field: "endpoint".to_string(),
                message: format!("Expected an http(s) URL, got '{}'", self.endpoint),
            });
        }

        if let Some(locale) = &self.locale {
            if render::parse_locale(locale).is_none() {
                errors.push(ValidationError {
                    field: "locale".to_string(),
                    message: format!("Unknown locale '{}'", locale),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

//! Configuration management for img2fig.
//!
//! Parses `img2fig.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [figure]
//! source_attr = "title"
//! remove_attr = true
//! force_convert = true
//! empty_as_none = true
//!
//! [markdown]
//! attr_list = true
//! gfm = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the caption source attribute.
    pub source_attr: Option<String>,
    /// Override whether the caption attribute is removed from the image.
    pub remove_attr: Option<bool>,
    /// Override whether uncaptioned images still become figures.
    pub force_convert: Option<bool>,
    /// Override whether empty captions count as missing.
    pub empty_as_none: Option<bool>,
    /// Override attribute-list support.
    pub attr_list: Option<bool>,
    /// Override GitHub Flavored Markdown support.
    pub gfm: Option<bool>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "img2fig.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Figure conversion options.
    pub figure: FigureConfig,
    /// Markdown rendering options.
    pub markdown: MarkdownConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Figure conversion options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Image attribute used as the caption (`"title"` or `"alt"`).
    pub source_attr: String,
    /// Drop the caption attribute from the `<img>` once it is used.
    pub remove_attr: bool,
    /// Wrap images in a figure even when there is no caption.
    pub force_convert: bool,
    /// Treat an empty caption as no caption.
    pub empty_as_none: bool,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            source_attr: "title".to_owned(),
            remove_attr: true,
            force_convert: true,
            empty_as_none: true,
        }
    }
}

/// Markdown rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Enable `{: ...}` attribute-list annotations.
    pub attr_list: bool,
    /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists).
    pub gfm: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            attr_list: true,
            gfm: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `img2fig.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_attr) = &settings.source_attr {
            self.figure.source_attr.clone_from(source_attr);
        }
        if let Some(remove_attr) = settings.remove_attr {
            self.figure.remove_attr = remove_attr;
        }
        if let Some(force_convert) = settings.force_convert {
            self.figure.force_convert = force_convert;
        }
        if let Some(empty_as_none) = settings.empty_as_none {
            self.figure.empty_as_none = empty_as_none;
        }
        if let Some(attr_list) = settings.attr_list {
            self.markdown.attr_list = attr_list;
        }
        if let Some(gfm) = settings.gfm {
            self.markdown.gfm = gfm;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file starting at `start` and walking up.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        tracing::info!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI settings
    /// are applied. Whether `figure.source_attr` names a supported attribute
    /// is checked by the renderer when the rewriter is built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.figure.source_attr, "figure.source_attr")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.figure.source_attr, "title");
        assert!(config.figure.remove_attr);
        assert!(config.figure.force_convert);
        assert!(config.figure.empty_as_none);
        assert!(config.markdown.attr_list);
        assert!(config.markdown.gfm);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.figure.source_attr, "title");
        assert!(config.markdown.attr_list);
    }

    #[test]
    fn test_parse_figure_config() {
        let toml = r#"
[figure]
source_attr = "alt"
remove_attr = false
force_convert = false
empty_as_none = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.figure.source_attr, "alt");
        assert!(!config.figure.remove_attr);
        assert!(!config.figure.force_convert);
        assert!(!config.figure.empty_as_none);
    }

    #[test]
    fn test_parse_partial_section_keeps_defaults() {
        let toml = r"
[figure]
force_convert = false

[markdown]
gfm = false
";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.figure.source_attr, "title");
        assert!(config.figure.remove_attr);
        assert!(!config.figure.force_convert);
        assert!(config.markdown.attr_list);
        assert!(!config.markdown.gfm);
    }

    #[test]
    fn test_parse_wrong_type_fails() {
        let result: Result<Config, _> = toml::from_str("[figure]\nremove_attr = \"yes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_source_attr() {
        let mut config = Config::default();
        config.figure.source_attr = "  ".to_owned();

        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(err.to_string().contains("figure.source_attr"));
    }

    #[test]
    fn test_apply_cli_settings_source_attr() {
        let mut config = Config::default();
        let overrides = CliSettings {
            source_attr: Some("alt".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.figure.source_attr, "alt");
        assert!(config.figure.remove_attr); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default();
        let overrides = CliSettings {
            remove_attr: Some(false),
            force_convert: Some(false),
            empty_as_none: Some(false),
            attr_list: Some(false),
            gfm: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.figure.source_attr, "title");
        assert!(!config.figure.remove_attr);
        assert!(!config.figure.force_convert);
        assert!(!config.figure.empty_as_none);
        assert!(!config.markdown.attr_list);
        assert!(!config.markdown.gfm);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.figure.source_attr, "title");
        assert!(config.figure.force_convert);
        assert!(config.markdown.gfm);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[figure]\nsource_attr = \"alt\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.figure.source_attr, "alt");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[figure\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[figure]\nsource_attr = \"\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[markdown]\ngfm = false\nattr_list = false\n").unwrap();

        let overrides = CliSettings {
            gfm: Some(true),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&overrides)).unwrap();

        assert!(config.markdown.gfm);
        assert!(!config.markdown.attr_list);
    }

    #[test]
    fn test_load_rejects_empty_cli_source_attr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let overrides = CliSettings {
            source_attr: Some(String::new()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&config_file, "").unwrap();

        let nested = dir.path().join("docs/chapter");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(&nested), Some(config_file));
    }

    #[test]
    fn test_discover_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let nested = dir.path().join("docs");
        std::fs::create_dir_all(&nested).unwrap();
        let nearest = nested.join(CONFIG_FILENAME);
        std::fs::write(&nearest, "").unwrap();

        assert_eq!(Config::discover_from(&nested), Some(nearest));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/nope/img2fig.toml"));
        assert_eq!(
            err.to_string(),
            "Configuration file not found: /nope/img2fig.toml"
        );
    }
}

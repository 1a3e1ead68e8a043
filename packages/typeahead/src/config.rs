//! Engine configuration loaded from TOML.
//!
//! The default configuration is embedded at compile time from
//! `typeahead.toml`; a deployment overrides it with its own file. Every
//! key is optional and falls back to the embedded defaults.

use std::path::{Path, PathBuf};

use address_typeahead_gazetteer::{FileSpec, GazetteerFormat};
use address_typeahead_models::CompleteOptions;
use serde::{Deserialize, Serialize};

use crate::TypeaheadError;

/// Embedded default configuration (compiled into the binary).
const DEFAULT_CONFIG_TOML: &str = include_str!("../typeahead.toml");

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeaheadConfig {
    /// Gazetteer snapshot to serve.
    #[serde(default)]
    pub gazetteer: Option<PathBuf>,

    /// Encoding of the gazetteer file; derived from the extension when
    /// unset.
    #[serde(default)]
    pub format: Option<GazetteerFormat>,

    /// Options applied to every `complete` call.
    #[serde(default)]
    pub complete: CompleteOptions,
}

impl TypeaheadConfig {
    /// Parses the embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded TOML is malformed.
    pub fn embedded() -> Result<Self, TypeaheadError> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TypeaheadError::Config`] if the TOML cannot be parsed or
    /// an option is out of range.
    pub fn from_toml_str(s: &str) -> Result<Self, TypeaheadError> {
        let config: Self = toml::from_str(s)
            .map_err(|e| TypeaheadError::Config(format!("Failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file. A relative `gazetteer` path is
    /// resolved against the directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TypeaheadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| TypeaheadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = Self::from_toml_str(&contents)?;
        if let Some(gazetteer) = &config.gazetteer
            && gazetteer.is_relative()
            && let Some(dir) = path.parent()
        {
            config.gazetteer = Some(dir.join(gazetteer));
        }

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Checks option ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TypeaheadError::Config`] naming the first invalid option.
    pub fn validate(&self) -> Result<(), TypeaheadError> {
        match self.complete.invalid_reason() {
            Some(reason) => Err(TypeaheadError::Config(reason.to_string())),
            None => Ok(()),
        }
    }

    /// How to read the gazetteer at `path`: the configured format if any,
    /// otherwise whatever the extension says.
    ///
    /// # Errors
    ///
    /// Returns an error if no format is configured and the extension is
    /// not recognized.
    pub fn file_spec(&self, path: &Path) -> Result<FileSpec, TypeaheadError> {
        let compressed = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zst"));
        match self.format {
            Some(format) => Ok(FileSpec { format, compressed }),
            None => Ok(FileSpec::from_path(path)?),
        }
    }
}

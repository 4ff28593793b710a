use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pipeline::services::export::ExportConfig;
use crate::pipeline::services::managers::{DEFAULT_MAX_LEAD_COLOR_ATTEMPTS, DEFAULT_SLOT_COUNT};

pub const ENV_PREFIX: &str = "CHROMA_SORT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Color slots per image.
    pub slot_count: usize,
    /// Every n-th pixel is sampled.
    pub palette_quality: usize,
    pub max_lead_color_attempts: usize,
    pub extraction_concurrency: usize,
    pub event_buffer_size: usize,
    pub export: ExportConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            palette_quality: 3,
            max_lead_color_attempts: DEFAULT_MAX_LEAD_COLOR_ATTEMPTS,
            extraction_concurrency: 4,
            event_buffer_size: 64,
            export: ExportConfig::default(),
        }
    }
}

impl Configuration {
    /// Defaults, then the optional file, then `CHROMA_SORT_*` variables
    /// (`__` separates nested keys, e.g. `CHROMA_SORT_EXPORT__KEY_CASING`).
    pub fn load(file: Option<&Path>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(true));
        }

        let configuration: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let checks = [
            ("slot_count", self.slot_count),
            ("palette_quality", self.palette_quality),
            ("max_lead_color_attempts", self.max_lead_color_attempts),
            ("extraction_concurrency", self.extraction_concurrency),
            ("event_buffer_size", self.event_buffer_size),
        ];

        match checks.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(AppError::Config(format!("{name} must be greater than 0"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::export::KeyCasing;

    #[test]
    fn test_defaults_are_valid() {
        let configuration = Configuration::default();
        assert!(configuration.validate().is_ok());
        assert_eq!(configuration.slot_count, 6);
        assert_eq!(configuration.max_lead_color_attempts, 64);
        assert_eq!(configuration.export.key_casing, KeyCasing::Camel);
    }

    #[test]
    fn test_zero_values_are_rejected() {
        let configuration = Configuration {
            extraction_concurrency: 0,
            ..Configuration::default()
        };
        let err = configuration.validate().unwrap_err();
        assert!(err.to_string().contains("extraction_concurrency"));
    }

    #[test]
    fn test_load_merges_file_over_defaults() {
        let path = std::env::temp_dir().join(format!("chroma-sort-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "slot_count = 8\n\n[export]\nkey_casing = \"snake\"\n\n[export.fields]\nhsl = false\n",
        )
        .unwrap();

        let configuration = Configuration::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(configuration.slot_count, 8);
        assert_eq!(configuration.palette_quality, 3);
        assert_eq!(configuration.export.key_casing, KeyCasing::Snake);
        assert!(!configuration.export.fields.hsl);
        assert!(configuration.export.fields.rgb);
    }

    #[test]
    fn test_load_fails_on_missing_file() {
        let missing = std::env::temp_dir().join("chroma-sort-does-not-exist.toml");
        assert!(matches!(
            Configuration::load(Some(&missing)),
            Err(AppError::ConfigSource(_))
        ));
    }
}

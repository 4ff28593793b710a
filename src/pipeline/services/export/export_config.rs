use serde::{Deserialize, Serialize};

/// Which optional color fields end up in the export. `hex` is always there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldInclusion {
    pub rgb: bool,
    pub hsl: bool,
    pub luminance: bool,
    pub rgb_array: bool,
    pub hsl_array: bool,
}

impl Default for FieldInclusion {
    fn default() -> Self {
        Self {
            rgb: true,
            hsl: true,
            luminance: true,
            rgb_array: true,
            hsl_array: true,
        }
    }
}

impl FieldInclusion {
    pub fn hex_only() -> Self {
        Self {
            rgb: false,
            hsl: false,
            luminance: false,
            rgb_array: false,
            hsl_array: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyCasing {
    #[default]
    Camel,
    Snake,
}

impl KeyCasing {
    /// Converts a camelCase key into this casing.
    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyCasing::Camel => key.to_string(),
            KeyCasing::Snake => camel_to_snake(key),
        }
    }
}

/// `rgbArray` -> `rgb_array`. Only word-internal capitals are split.
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut previous_is_word = false;

    for c in key.chars() {
        if c.is_uppercase() && previous_is_word {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        previous_is_word = c.is_alphanumeric() || c == '_';
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub fields: FieldInclusion,
    pub key_casing: KeyCasing,
}

impl ExportConfig {
    pub fn with_fields(mut self, fields: FieldInclusion) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_key_casing(mut self, key_casing: KeyCasing) -> Self {
        self.key_casing = key_casing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("rgbArray"), "rgb_array");
        assert_eq!(camel_to_snake("groupLeadColor"), "group_lead_color");
        assert_eq!(camel_to_snake("hex"), "hex");
        assert_eq!(camel_to_snake("Image"), "image");
    }

    #[test]
    fn test_key_casing_apply() {
        assert_eq!(KeyCasing::Camel.apply("imagesInGroup"), "imagesInGroup");
        assert_eq!(KeyCasing::Snake.apply("imagesInGroup"), "images_in_group");
    }

    #[test]
    fn test_export_config_deserializes_partial_input() {
        let config: ExportConfig =
            serde_json::from_str(r#"{ "key_casing": "snake", "fields": { "hsl": false } }"#).unwrap();
        assert_eq!(config.key_casing, KeyCasing::Snake);
        assert!(!config.fields.hsl);
        assert!(config.fields.rgb);
    }
}

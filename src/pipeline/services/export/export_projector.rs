use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::export_config::ExportConfig;
use crate::common::{Color, ImageId};
use crate::pipeline::services::managers::{ColorPool, GroupRegistry, ImageStore};
use crate::pipeline::types::ColorGroup;

/// Both export views, ready to be written out as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    pub images: Vec<Value>,
    pub groups: Vec<Value>,
}

impl ExportReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Read-only projection of the stores into export JSON.
pub struct ExportProjector<'a> {
    images: &'a ImageStore,
    pool: &'a ColorPool,
    groups: &'a GroupRegistry,
    config: ExportConfig,
}

impl<'a> ExportProjector<'a> {
    pub fn new(
        images: &'a ImageStore,
        pool: &'a ColorPool,
        groups: &'a GroupRegistry,
        config: ExportConfig,
    ) -> Self {
        Self {
            images,
            pool,
            groups,
            config,
        }
    }

    pub fn project(&self) -> ExportReport {
        ExportReport {
            images: self.images_view(),
            groups: self.groups_view(),
        }
    }

    /// One entry per image with extracted colors, in import order, listing
    /// every live slot.
    pub fn images_view(&self) -> Vec<Value> {
        self.images
            .iter()
            .filter_map(|image| {
                let collection = self.pool.collection(&image.id)?;
                let colors = collection
                    .live()
                    .map(|(_, slot)| self.color_value(slot.borrow().effective()))
                    .collect();
                self.image_value(&image.id, colors)
            })
            .collect()
    }

    /// One entry per group, its member colors grouped by image.
    pub fn groups_view(&self) -> Vec<Value> {
        self.groups.iter().map(|group| self.group_value(group)).collect()
    }

    fn group_value(&self, group: &ColorGroup) -> Value {
        let mut by_image: IndexMap<ImageId, Vec<Value>> = IndexMap::new();

        for pivot in group.colors.keys() {
            if !self.images.contains(&pivot.image_id) {
                continue;
            }
            let Some(slot) = self.pool.get_by_pivot(pivot) else {
                continue;
            };
            by_image
                .entry(pivot.image_id)
                .or_default()
                .push(self.color_value(slot.borrow().effective()));
        }

        let images_in_group: Vec<Value> = by_image
            .into_iter()
            .filter_map(|(image_id, colors)| self.image_value(&image_id, colors))
            .collect();

        let mut entry = Map::new();
        entry.insert(
            self.key("groupLeadColor"),
            self.color_value(&group.lead_color),
        );
        entry.insert(self.key("imagesInGroup"), Value::Array(images_in_group));
        Value::Object(entry)
    }

    fn image_value(&self, image_id: &ImageId, colors: Vec<Value>) -> Option<Value> {
        let name = self.images.display_name(image_id)?;
        let mut entry = Map::new();
        entry.insert(self.key("image"), json!(name));
        entry.insert(self.key("colors"), Value::Array(colors));
        Some(Value::Object(entry))
    }

    /// `hex` is always present, the rest follows the field selection.
    pub fn color_value(&self, color: &Color) -> Value {
        let fields = &self.config.fields;
        let mut entry = Map::new();

        entry.insert(self.key("hex"), json!(color.hex.as_str()));
        if fields.rgb {
            entry.insert(self.key("rgb"), json!(color.css_rgb()));
        }
        if fields.hsl {
            entry.insert(self.key("hsl"), json!(color.css_hsl()));
        }
        if fields.luminance {
            entry.insert(self.key("luminance"), json!(color.luminance));
        }
        if fields.rgb_array {
            entry.insert(self.key("rgbArray"), json!(color.rgb.to_array()));
        }
        if fields.hsl_array {
            entry.insert(self.key("hslArray"), json!(color.hsl.to_array()));
        }

        Value::Object(entry)
    }

    fn key(&self, key: &str) -> String {
        self.config.key_casing.apply(key)
    }
}

use indexmap::IndexMap;

use crate::common::ImageId;
use crate::pipeline::types::Image;

/// Imported images in import order.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: IndexMap<ImageId, Image>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image, replacing any previous image with the same id.
    pub fn insert(&mut self, image: Image) -> ImageId {
        let id = image.id;
        self.images.insert(id, image);
        id
    }

    pub fn get(&self, id: &ImageId) -> Option<&Image> {
        self.images.get(id)
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.images.contains_key(id)
    }

    pub fn remove(&mut self, id: &ImageId) -> Option<Image> {
        self.images.shift_remove(id)
    }

    pub fn display_name(&self, id: &ImageId) -> Option<&str> {
        self.images.get(id).map(Image::display_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.images.values()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}

use indexmap::IndexMap;
use tracing::debug;

use crate::common::{Color, ImageId, PivotId, Rgb};
use crate::pipeline::types::{ColorCollection, ImageColor, SharedImageColor};

pub const DEFAULT_SLOT_COUNT: usize = 6;

/// Owner of every extracted image color, one fixed-size collection per image.
///
/// Handpick operations evict the slot from its group (`is_sorted = false`,
/// `group_id = None`) but leave the group's membership map alone; the sort
/// engine's invalidate pass reconciles those afterwards.
#[derive(Debug)]
pub struct ColorPool {
    collections: IndexMap<ImageId, ColorCollection>,
    slot_count: usize,
}

impl Default for ColorPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorPool {
    pub fn new() -> Self {
        Self {
            collections: IndexMap::new(),
            slot_count: DEFAULT_SLOT_COUNT,
        }
    }

    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count;
        self
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Builds the collection for freshly sampled colors and stores it.
    /// Returns how many slots ended up filled.
    pub fn create_color_collection(&mut self, image_id: ImageId, raw_colors: &[Rgb]) -> usize {
        let collection = ColorCollection::from_raw(image_id, raw_colors, self.slot_count);
        let amount = collection.amount_of_colors();
        self.insert_collection(image_id, collection);
        debug!("Created {} color slots for image {}", amount, image_id);
        amount
    }

    /// Stores a collection, replacing the previous one of the image if any.
    pub fn insert_collection(&mut self, image_id: ImageId, collection: ColorCollection) {
        self.collections.insert(image_id, collection);
    }

    pub fn contains(&self, image_id: &ImageId) -> bool {
        self.collections.contains_key(image_id)
    }

    pub fn collection(&self, image_id: &ImageId) -> Option<&ColorCollection> {
        self.collections.get(image_id)
    }

    pub fn get(&self, image_id: &ImageId, slot: usize) -> Option<&SharedImageColor> {
        self.collections.get(image_id)?.get(slot)
    }

    pub fn get_by_pivot(&self, pivot: &PivotId) -> Option<&SharedImageColor> {
        self.get(&pivot.image_id, pivot.slot)
    }

    /// Collections in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ImageId, &ColorCollection)> {
        self.collections.iter()
    }

    /// Every live slot of every image, images in insertion order, slots ascending.
    pub fn live_slots(&self) -> impl Iterator<Item = (PivotId, &SharedImageColor)> {
        self.collections.iter().flat_map(|(image_id, collection)| {
            collection
                .live()
                .map(move |(slot, color)| (PivotId::new(*image_id, slot), color))
        })
    }

    /// Overrides the sampled color of a slot. Returns false when the slot
    /// does not exist or already shows this exact color.
    pub fn set_handpicked(&mut self, image_id: &ImageId, slot: usize, color: Color) -> bool {
        let Some(shared) = self.get(image_id, slot) else {
            return false;
        };
        let mut image_color = shared.borrow_mut();

        if image_color.effective_hex() == &color.hex {
            return false;
        }

        debug!(
            "Handpicked {} for slot {} of image {}",
            color.hex, slot, image_id
        );
        image_color.handpicked = Some(color);
        image_color.mark_unsorted();
        true
    }

    /// Drops the handpicked override of a slot. No-op without one.
    pub fn clear_handpicked(&mut self, image_id: &ImageId, slot: usize) -> bool {
        let Some(shared) = self.get(image_id, slot) else {
            return false;
        };
        let mut image_color = shared.borrow_mut();

        if image_color.handpicked.take().is_none() {
            return false;
        }

        image_color.mark_unsorted();
        true
    }

    /// Clears every handpicked override of an image, returning how many were reset.
    pub fn clear_all_handpicked(&mut self, image_id: &ImageId) -> usize {
        let Some(collection) = self.collections.get(image_id) else {
            return 0;
        };

        collection
            .live()
            .filter(|(_, shared)| {
                let mut image_color = shared.borrow_mut();
                if image_color.handpicked.take().is_some() {
                    image_color.mark_unsorted();
                    true
                } else {
                    false
                }
            })
            .count()
    }

    /// Tombstones a slot. Callers are responsible for detaching the pivot
    /// from any group still referencing it.
    pub fn remove_slot(&mut self, image_id: &ImageId, slot: usize) -> Option<ImageColor> {
        let removed = self.collections.get_mut(image_id)?.remove(slot)?;
        debug!("Removed slot {} of image {}", slot, image_id);
        let image_color = removed.borrow().clone();
        Some(image_color)
    }

    pub fn remove_collection(&mut self, image_id: &ImageId) -> Option<ColorCollection> {
        self.collections.shift_remove(image_id)
    }

    pub fn amount_of_colors(&self, image_id: &ImageId) -> usize {
        self.collections
            .get(image_id)
            .map_or(0, ColorCollection::amount_of_colors)
    }

    pub fn has_handpicked(&self, image_id: &ImageId) -> bool {
        self.collections.get(image_id).is_some_and(|collection| {
            collection
                .live()
                .any(|(_, shared)| shared.borrow().handpicked.is_some())
        })
    }

    /// Nothing handpicked and nothing removed, so there is nothing to reset.
    pub fn is_pristine(&self, image_id: &ImageId) -> bool {
        self.collections.get(image_id).map_or(true, |collection| {
            !collection.has_removed_slots()
                && collection
                    .live()
                    .all(|(_, shared)| shared.borrow().handpicked.is_none())
        })
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn clear(&mut self) {
        self.collections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::GroupId;

    fn pool_with(raw: &[Rgb]) -> (ColorPool, ImageId) {
        let mut pool = ColorPool::new();
        let image_id = ImageId::new();
        pool.create_color_collection(image_id, raw);
        (pool, image_id)
    }

    fn red() -> Rgb {
        Rgb::new(255, 0, 0)
    }

    fn green() -> Rgb {
        Rgb::new(0, 255, 0)
    }

    #[test]
    fn test_collection_has_configured_length() {
        let mut pool = ColorPool::new().with_slot_count(4);
        let image_id = ImageId::new();
        let amount = pool.create_color_collection(image_id, &[red(), red(), green()]);

        assert_eq!(amount, 2);
        assert_eq!(pool.amount_of_colors(&image_id), 2);
        assert_eq!(pool.collection(&image_id).unwrap().slot_count(), 4);
        assert!(pool.get(&image_id, 2).is_none());
    }

    #[test]
    fn test_set_handpicked_evicts_and_ignores_same_color() {
        let (mut pool, image_id) = pool_with(&[red(), green()]);
        let group_id = GroupId::new();
        pool.get(&image_id, 0).unwrap().borrow_mut().mark_sorted(group_id);

        // Same as the current effective color.
        assert!(!pool.set_handpicked(&image_id, 0, Color::from_rgb(red())));
        assert!(pool.get(&image_id, 0).unwrap().borrow().is_sorted);

        assert!(pool.set_handpicked(&image_id, 0, Color::from_rgb(Rgb::new(1, 2, 3))));
        let slot = pool.get(&image_id, 0).unwrap().borrow();
        assert!(!slot.is_sorted);
        assert_eq!(slot.group_id, None);
        assert_eq!(slot.effective_hex().as_str(), "#010203");
    }

    #[test]
    fn test_clear_handpicked() {
        let (mut pool, image_id) = pool_with(&[red()]);

        assert!(!pool.clear_handpicked(&image_id, 0));
        pool.set_handpicked(&image_id, 0, Color::from_rgb(green()));
        assert!(pool.has_handpicked(&image_id));

        pool.get(&image_id, 0).unwrap().borrow_mut().mark_sorted(GroupId::new());
        assert!(pool.clear_handpicked(&image_id, 0));

        let slot = pool.get(&image_id, 0).unwrap().borrow();
        assert_eq!(slot.effective_hex().as_str(), "#FF0000");
        assert!(!slot.is_sorted);
        drop(slot);
        assert!(!pool.has_handpicked(&image_id));
    }

    #[test]
    fn test_clear_all_handpicked() {
        let (mut pool, image_id) = pool_with(&[red(), green(), Rgb::new(0, 0, 255)]);
        pool.set_handpicked(&image_id, 0, Color::from_rgb(Rgb::new(5, 5, 5)));
        pool.set_handpicked(&image_id, 2, Color::from_rgb(Rgb::new(6, 6, 6)));

        assert_eq!(pool.clear_all_handpicked(&image_id), 2);
        assert!(!pool.has_handpicked(&image_id));
        assert_eq!(pool.clear_all_handpicked(&ImageId::new()), 0);
    }

    #[test]
    fn test_remove_slot_tombstones() {
        let (mut pool, image_id) = pool_with(&[red(), green()]);

        let removed = pool.remove_slot(&image_id, 0).unwrap();
        assert_eq!(removed.original.hex.as_str(), "#FF0000");
        assert!(pool.get(&image_id, 0).is_none());
        assert!(pool.get(&image_id, 1).is_some());
        assert_eq!(pool.amount_of_colors(&image_id), 1);
        assert!(pool.remove_slot(&image_id, 0).is_none());
    }

    #[test]
    fn test_is_pristine() {
        let (mut pool, image_id) = pool_with(&[red(), green()]);
        assert!(pool.is_pristine(&image_id));

        pool.set_handpicked(&image_id, 1, Color::from_rgb(Rgb::new(7, 7, 7)));
        assert!(!pool.is_pristine(&image_id));

        pool.clear_handpicked(&image_id, 1);
        assert!(pool.is_pristine(&image_id));

        pool.remove_slot(&image_id, 1);
        assert!(!pool.is_pristine(&image_id));
    }

    #[test]
    fn test_live_slots_follow_insertion_order() {
        let mut pool = ColorPool::new();
        let first = ImageId::new();
        let second = ImageId::new();
        pool.create_color_collection(first, &[red(), green()]);
        pool.create_color_collection(second, &[green()]);
        pool.remove_slot(&first, 0);

        let pivots: Vec<PivotId> = pool.live_slots().map(|(pivot, _)| pivot).collect();
        assert_eq!(pivots, vec![PivotId::new(first, 1), PivotId::new(second, 0)]);
    }

    #[test]
    fn test_unknown_image_is_a_no_op() {
        let mut pool = ColorPool::new();
        let unknown = ImageId::new();

        assert_eq!(pool.amount_of_colors(&unknown), 0);
        assert!(!pool.set_handpicked(&unknown, 0, Color::from_rgb(red())));
        assert!(pool.remove_slot(&unknown, 0).is_none());
        assert!(pool.remove_collection(&unknown).is_none());
    }
}

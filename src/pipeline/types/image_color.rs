use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::common::{Color, ColorHex, GroupId, ImageId, Rgb};

/// One extracted color of an image, owned by the color pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageColor {
    pub image_id: ImageId,
    pub original: Color,
    pub handpicked: Option<Color>,
    pub is_sorted: bool,
    pub group_id: Option<GroupId>,
}

/// Sorting state of a slot as seen by the classification engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortState {
    Unsorted,
    Sorted(GroupId),
}

impl ImageColor {
    pub fn new(image_id: ImageId, original: Color) -> Self {
        Self {
            image_id,
            original,
            handpicked: None,
            is_sorted: false,
            group_id: None,
        }
    }

    /// The handpicked override if any, the sampled color otherwise.
    pub fn effective(&self) -> &Color {
        self.handpicked.as_ref().unwrap_or(&self.original)
    }

    pub fn effective_hex(&self) -> &ColorHex {
        &self.effective().hex
    }

    pub fn state(&self) -> SortState {
        match (self.is_sorted, self.group_id) {
            (true, Some(group_id)) => SortState::Sorted(group_id),
            _ => SortState::Unsorted,
        }
    }

    pub fn mark_sorted(&mut self, group_id: GroupId) {
        self.is_sorted = true;
        self.group_id = Some(group_id);
    }

    pub fn mark_unsorted(&mut self) {
        self.is_sorted = false;
        self.group_id = None;
    }

    /// Same original hex and same handpicked hex (both absent counts as same).
    pub fn has_same_colors(&self, other: &ImageColor) -> bool {
        self.original.hex == other.original.hex
            && self.handpicked.as_ref().map(|c| &c.hex) == other.handpicked.as_ref().map(|c| &c.hex)
    }
}

/// Handle shared between the pool (owner) and group membership maps.
pub type SharedImageColor = Rc<RefCell<ImageColor>>;

/// Fixed-size slot vector of one image. Removed slots stay as `None` so the
/// remaining slot indices, and the pivots derived from them, never shift.
#[derive(Debug, Clone, Default)]
pub struct ColorCollection {
    slots: Vec<Option<SharedImageColor>>,
    extracted: usize,
}

impl ColorCollection {
    /// Dedups `raw_colors` by hex (first occurrence wins, order kept) and
    /// lays them into exactly `slot_count` slots, padding with `None`.
    pub fn from_raw(image_id: ImageId, raw_colors: &[Rgb], slot_count: usize) -> Self {
        let mut seen = HashSet::new();

        let mut slots: Vec<Option<SharedImageColor>> = raw_colors
            .iter()
            .map(|rgb| Color::from_rgb(*rgb))
            .filter(|color| seen.insert(color.hex.clone()))
            .take(slot_count)
            .map(|color| Some(Rc::new(RefCell::new(ImageColor::new(image_id, color)))))
            .collect();

        let extracted = slots.len();
        slots.resize_with(slot_count, || None);

        Self { slots, extracted }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: usize) -> Option<&SharedImageColor> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Live (non-removed) slots with their index.
    pub fn live(&self) -> impl Iterator<Item = (usize, &SharedImageColor)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, color)| color.as_ref().map(|color| (slot, color)))
    }

    pub fn amount_of_colors(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True once any extracted color was removed again.
    pub fn has_removed_slots(&self) -> bool {
        self.amount_of_colors() < self.extracted
    }

    /// Tombstones a slot, returning what was there.
    pub fn remove(&mut self, slot: usize) -> Option<SharedImageColor> {
        self.slots.get_mut(slot).and_then(Option::take)
    }
}

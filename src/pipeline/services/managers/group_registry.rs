use std::collections::HashSet;

use indexmap::IndexMap;
use rand::Rng;
use tracing::{debug, info};

use crate::common::color_space::generate_random_rgb;
use crate::common::{Color, ColorHex, GroupId};
use crate::error::RegistryError;
use crate::pipeline::types::ColorGroup;

pub const DEFAULT_MAX_LEAD_COLOR_ATTEMPTS: usize = 64;

/// User-defined color groups in creation order.
///
/// Lead colors are unique by hex across all groups at any time.
#[derive(Debug)]
pub struct GroupRegistry {
    groups: IndexMap<GroupId, ColorGroup>,
    lead_colors: HashSet<ColorHex>,
    max_lead_color_attempts: usize,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            groups: IndexMap::new(),
            lead_colors: HashSet::new(),
            max_lead_color_attempts: DEFAULT_MAX_LEAD_COLOR_ATTEMPTS,
        }
    }

    pub fn with_max_lead_color_attempts(mut self, attempts: usize) -> Self {
        self.max_lead_color_attempts = attempts;
        self
    }

    /// Creates a group with a random, unused lead color.
    pub fn create_group(&mut self) -> Result<GroupId, RegistryError> {
        let mut rng = rand::rng();
        self.create_group_with(&mut rng)
    }

    pub fn create_group_with<R: Rng>(&mut self, rng: &mut R) -> Result<GroupId, RegistryError> {
        for attempt in 1..=self.max_lead_color_attempts {
            let lead_color = Color::from_rgb(generate_random_rgb(rng));

            if self.lead_colors.contains(&lead_color.hex) {
                debug!(
                    "Lead color {} already taken (attempt {})",
                    lead_color.hex, attempt
                );
                continue;
            }

            let group = ColorGroup::new(lead_color);
            let id = group.id;
            self.lead_colors.insert(group.lead_color.hex.clone());
            info!("Created group {} with lead color {}", id, group.lead_color.hex);
            self.groups.insert(id, group);
            return Ok(id);
        }

        Err(RegistryError::ColorSpaceExhausted {
            attempts: self.max_lead_color_attempts,
        })
    }

    /// Unsorts every member, then drops the group and frees its lead color.
    pub fn delete_group(&mut self, id: &GroupId) -> bool {
        let Some(group) = self.groups.get(id) else {
            return false;
        };
        Self::unsort_members(group);

        if let Some(group) = self.groups.shift_remove(id) {
            self.lead_colors.remove(&group.lead_color.hex);
            info!("Deleted group {} ({} members)", id, group.len());
        }
        true
    }

    /// Unsorts every member but keeps the group and its lead color.
    pub fn clear_group(&mut self, id: &GroupId) -> bool {
        let Some(group) = self.groups.get_mut(id) else {
            return false;
        };
        Self::unsort_members(group);
        group.colors.clear();
        true
    }

    fn unsort_members(group: &ColorGroup) {
        for member in group.colors.values() {
            let mut member = member.borrow_mut();
            if member.group_id == Some(group.id) {
                member.mark_unsorted();
            }
        }
    }

    /// Swaps the lead color of a group. Members keep their membership.
    ///
    /// Returns `Ok(false)` for an unknown group or when the hex is already
    /// the group's own lead color.
    pub fn change_lead_color(&mut self, hex: &str, id: &GroupId) -> Result<bool, RegistryError> {
        let lead_color = Color::from_hex(hex)?;

        let Some(group) = self.groups.get_mut(id) else {
            return Ok(false);
        };
        if group.lead_color.hex == lead_color.hex {
            return Ok(false);
        }
        if self.lead_colors.contains(&lead_color.hex) {
            return Err(RegistryError::LeadColorInUse(lead_color.hex));
        }

        self.lead_colors.remove(&group.lead_color.hex);
        self.lead_colors.insert(lead_color.hex.clone());
        debug!(
            "Group {} lead color {} -> {}",
            id, group.lead_color.hex, lead_color.hex
        );
        group.lead_color = lead_color;
        Ok(true)
    }

    pub fn is_lead_color_taken(&self, hex: &ColorHex) -> bool {
        self.lead_colors.contains(hex)
    }

    pub fn get(&self, id: &GroupId) -> Option<&ColorGroup> {
        self.groups.get(id)
    }

    pub fn get_mut(&mut self, id: &GroupId) -> Option<&mut ColorGroup> {
        self.groups.get_mut(id)
    }

    pub fn contains(&self, id: &GroupId) -> bool {
        self.groups.contains_key(id)
    }

    /// Groups in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorGroup> {
        self.groups.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ColorGroup> {
        self.groups.values_mut()
    }

    pub fn non_empty_groups(&self) -> impl Iterator<Item = &ColorGroup> {
        self.groups.values().filter(|group| !group.is_empty())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ImageId, PivotId, Rgb};
    use crate::pipeline::types::ImageColor;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Always yields zero bytes, so every lead color is black.
    struct ConstantRng;

    impl RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn test_lead_colors_are_unique() {
        let mut registry = GroupRegistry::new();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            registry.create_group_with(&mut rng).unwrap();
        }

        let hexes: HashSet<&ColorHex> = registry.iter().map(|g| &g.lead_color.hex).collect();
        assert_eq!(hexes.len(), 50);
        assert_eq!(registry.len(), 50);
    }

    #[test]
    fn test_exhausted_color_space_fails_after_bounded_retries() {
        let mut registry = GroupRegistry::new().with_max_lead_color_attempts(5);

        let first = registry.create_group_with(&mut ConstantRng).unwrap();
        assert_eq!(registry.get(&first).unwrap().lead_color.hex.as_str(), "#000000");

        let err = registry.create_group_with(&mut ConstantRng).unwrap_err();
        assert_eq!(err, RegistryError::ColorSpaceExhausted { attempts: 5 });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_delete_group_releases_lead_color_and_unsorts_members() {
        let mut registry = GroupRegistry::new();
        let id = registry.create_group_with(&mut ConstantRng).unwrap();

        let member = Rc::new(RefCell::new(ImageColor::new(
            ImageId::new(),
            Color::from_rgb(Rgb::new(10, 20, 30)),
        )));
        member.borrow_mut().mark_sorted(id);
        let pivot = PivotId::new(member.borrow().image_id, 0);
        registry.get_mut(&id).unwrap().colors.insert(pivot, member.clone());

        assert!(registry.delete_group(&id));
        assert!(!member.borrow().is_sorted);
        assert_eq!(member.borrow().group_id, None);
        assert!(!registry.is_lead_color_taken(&ColorHex::from_rgb(Rgb::new(0, 0, 0))));

        // Black is free again.
        assert!(registry.create_group_with(&mut ConstantRng).is_ok());
        assert!(!registry.delete_group(&GroupId::new()));
    }

    #[test]
    fn test_clear_group_keeps_group() {
        let mut registry = GroupRegistry::new();
        let id = registry.create_group_with(&mut ConstantRng).unwrap();
        let member = Rc::new(RefCell::new(ImageColor::new(
            ImageId::new(),
            Color::from_rgb(Rgb::new(1, 1, 1)),
        )));
        member.borrow_mut().mark_sorted(id);
        let pivot = PivotId::new(member.borrow().image_id, 0);
        registry.get_mut(&id).unwrap().colors.insert(pivot, member.clone());

        assert!(registry.clear_group(&id));
        assert!(registry.get(&id).unwrap().is_empty());
        assert!(!member.borrow().is_sorted);
        assert_eq!(registry.non_empty_groups().count(), 0);
    }

    #[test]
    fn test_change_lead_color() {
        let mut registry = GroupRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);
        let a = registry.create_group_with(&mut rng).unwrap();
        let b = registry.create_group_with(&mut rng).unwrap();
        let a_hex = registry.get(&a).unwrap().lead_color.hex.clone();
        let b_hex = registry.get(&b).unwrap().lead_color.hex.clone();

        assert_eq!(
            registry.change_lead_color(b_hex.as_str(), &a),
            Err(RegistryError::LeadColorInUse(b_hex.clone()))
        );
        assert_eq!(registry.change_lead_color(a_hex.as_str(), &a), Ok(false));
        assert_eq!(registry.change_lead_color("#123456", &GroupId::new()), Ok(false));
        assert!(matches!(
            registry.change_lead_color("nope", &a),
            Err(RegistryError::InvalidColor(_))
        ));

        assert_eq!(registry.change_lead_color("#abcdef", &a), Ok(true));
        assert_eq!(registry.get(&a).unwrap().lead_color.hex.as_str(), "#ABCDEF");
        assert!(!registry.is_lead_color_taken(&a_hex));
        assert!(registry.is_lead_color_taken(&"#ABCDEF".parse::<ColorHex>().unwrap()));
    }

    #[test]
    fn test_iteration_follows_creation_order() {
        let mut registry = GroupRegistry::new();
        let mut rng = StdRng::seed_from_u64(3);
        let ids: Vec<GroupId> = (0..4)
            .map(|_| registry.create_group_with(&mut rng).unwrap())
            .collect();
        registry.delete_group(&ids[1]);

        let order: Vec<GroupId> = registry.iter().map(|g| g.id).collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[3]]);
    }
}

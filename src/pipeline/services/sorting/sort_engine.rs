use std::rc::Rc;

use tracing::{debug, info};

use crate::common::{delta_e_2000, GroupId, ImageId, Lab, PivotId};
use crate::pipeline::services::managers::{ColorPool, GroupRegistry};
use crate::pipeline::types::SharedImageColor;

/// State machine moving pool slots between `Unsorted` and `Sorted(group)`.
///
/// The pool is the source of truth; group membership maps are an index over
/// it that [`SortEngine::invalidate`] can always rebuild consistency for.
pub struct SortEngine<'a> {
    pool: &'a ColorPool,
    groups: &'a mut GroupRegistry,
}

impl<'a> SortEngine<'a> {
    pub fn new(pool: &'a ColorPool, groups: &'a mut GroupRegistry) -> Self {
        Self { pool, groups }
    }

    /// Moves a slot from `origin` to `target`. `None` as origin means the
    /// slot was dragged out of the pool view, `None` as target means it was
    /// dropped outside any group.
    ///
    /// Returns false when nothing was done.
    pub fn transfer(
        &mut self,
        pivot: PivotId,
        origin: Option<GroupId>,
        target: Option<GroupId>,
    ) -> bool {
        if target == origin {
            return false;
        }

        let Some(slot) = self.pool.get_by_pivot(&pivot).map(Rc::clone) else {
            debug!("Transfer of unknown pivot {} ignored", pivot);
            return false;
        };

        let unknown_group = [origin, target]
            .into_iter()
            .flatten()
            .find(|group_id| !self.groups.contains(group_id));
        if let Some(group_id) = unknown_group {
            debug!("Transfer of {} involving unknown group {} ignored", pivot, group_id);
            return false;
        }

        if let (Some(target), None) = (target, origin) {
            if slot.borrow().is_sorted {
                self.purge_except(&pivot, target);
            }
        }

        if target.is_none() {
            slot.borrow_mut().mark_unsorted();
        }

        if let Some(group) = origin.and_then(|origin| self.groups.get_mut(&origin)) {
            group.colors.shift_remove(&pivot);
        }

        if let Some(target) = target {
            if let Some(group) = self.groups.get_mut(&target) {
                group.colors.insert(pivot, Rc::clone(&slot));
                slot.borrow_mut().mark_sorted(target);
            }
        }

        debug!("Moved {} from {:?} to {:?}", pivot, origin, target);
        true
    }

    fn purge_except(&mut self, pivot: &PivotId, keep: GroupId) {
        for group in self.groups.iter_mut().filter(|group| group.id != keep) {
            group.colors.shift_remove(pivot);
        }
    }

    /// Assigns every live slot to the group whose lead color is nearest by
    /// CIEDE2000. On equal distance the group created last wins.
    ///
    /// Returns how many slots were assigned.
    pub fn auto_sort(&mut self) -> usize {
        if self.groups.is_empty() {
            return 0;
        }

        let leads: Vec<(GroupId, Lab)> = self
            .groups
            .iter()
            .map(|group| (group.id, group.lead_color.lab()))
            .collect();

        let slots: Vec<(PivotId, SharedImageColor)> = self
            .pool
            .live_slots()
            .map(|(pivot, slot)| (pivot, Rc::clone(slot)))
            .collect();

        let mut assigned = 0;
        for (pivot, slot) in slots {
            let lab = slot.borrow().effective().lab();

            let mut nearest: Option<(GroupId, f64)> = None;
            for (group_id, lead) in &leads {
                let distance = delta_e_2000(lab, *lead);
                // `<=`: a later group at equal distance replaces the earlier one
                if nearest.map_or(true, |(_, best)| distance <= best) {
                    nearest = Some((*group_id, distance));
                }
            }
            let Some((group_id, distance)) = nearest else {
                continue;
            };

            let previous = slot.borrow().group_id;
            if let Some(previous) = previous.filter(|previous| *previous != group_id) {
                if let Some(group) = self.groups.get_mut(&previous) {
                    group.colors.shift_remove(&pivot);
                }
            }

            if let Some(group) = self.groups.get_mut(&group_id) {
                group.colors.insert(pivot, Rc::clone(&slot));
                slot.borrow_mut().mark_sorted(group_id);
                debug!("Sorted {} into {} (ΔE {:.2})", pivot, group_id, distance);
                assigned += 1;
            }
        }

        info!("Auto-sorted {} colors into {} groups", assigned, leads.len());
        assigned
    }

    /// Unsorts every member and every pool slot and empties all groups.
    pub fn reset_sorting(&mut self) {
        for group in self.groups.iter_mut() {
            for member in group.colors.values() {
                member.borrow_mut().mark_unsorted();
            }
            group.colors.clear();
        }

        for (_, slot) in self.pool.live_slots() {
            slot.borrow_mut().mark_unsorted();
        }
    }

    /// Reconciles group membership with the pool.
    ///
    /// A member is dropped when it is no longer sorted, its pivot no longer
    /// resolves, or the live slot's original or handpicked color differs
    /// from the member's. Survivors re-mark their live slot as sorted into
    /// the group. Returns how many memberships were dropped.
    pub fn invalidate(&mut self) -> usize {
        let pool = self.pool;
        let mut dropped = 0;

        for group in self.groups.iter_mut() {
            let group_id = group.id;

            group.colors.retain(|pivot, member| {
                let Some(live) = pool.get_by_pivot(pivot) else {
                    dropped += 1;
                    return false;
                };

                let keep = {
                    let member = member.borrow();
                    member.is_sorted && live.borrow().has_same_colors(&member)
                };
                if !keep {
                    dropped += 1;
                    return false;
                }

                if !Rc::ptr_eq(member, live) {
                    *member = Rc::clone(live);
                }
                live.borrow_mut().mark_sorted(group_id);
                true
            });
        }

        if dropped > 0 {
            debug!("Invalidate dropped {} stale memberships", dropped);
        }
        dropped
    }

    /// Removes a pivot from every group and unsorts its slot. Used before a
    /// slot disappears from the pool.
    pub fn detach_slot(&mut self, pivot: &PivotId) -> bool {
        if let Some(slot) = self.pool.get_by_pivot(pivot) {
            slot.borrow_mut().mark_unsorted();
        }

        let mut detached = false;
        for group in self.groups.iter_mut() {
            if let Some(member) = group.colors.shift_remove(pivot) {
                member.borrow_mut().mark_unsorted();
                detached = true;
            }
        }
        detached
    }

    /// Detaches every slot of an image, including members whose slot was
    /// already tombstoned. Returns how many memberships were removed.
    pub fn unsort_image(&mut self, image_id: &ImageId) -> usize {
        if let Some(collection) = self.pool.collection(image_id) {
            for (_, slot) in collection.live() {
                slot.borrow_mut().mark_unsorted();
            }
        }

        let mut removed = 0;
        for group in self.groups.iter_mut() {
            group.colors.retain(|pivot, member| {
                if pivot.image_id != *image_id {
                    return true;
                }
                member.borrow_mut().mark_unsorted();
                removed += 1;
                false
            });
        }
        removed
    }
}

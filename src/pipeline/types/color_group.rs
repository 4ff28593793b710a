use indexmap::IndexMap;

use super::image_color::SharedImageColor;
use crate::common::{Color, GroupId, PivotId};

/// A user-defined color group. `colors` is an index over pool entries,
/// the pool stays the owner of the sorting state.
#[derive(Debug, Clone)]
pub struct ColorGroup {
    pub id: GroupId,
    pub lead_color: Color,
    pub colors: IndexMap<PivotId, SharedImageColor>,
}

impl ColorGroup {
    pub fn new(lead_color: Color) -> Self {
        Self {
            id: GroupId::new(),
            lead_color,
            colors: IndexMap::new(),
        }
    }

    pub fn contains(&self, pivot: &PivotId) -> bool {
        self.colors.contains_key(pivot)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

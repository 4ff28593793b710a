use serde::Serialize;

use crate::common::{ColorHex, GroupId, ImageId, PivotId};

/// Published after every mutation of the stores, for UI layers to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StoreEvent {
    ImageAdded { image_id: ImageId },
    ImageRemoved { image_id: ImageId },
    ColorsExtracted { image_id: ImageId, amount: usize },
    ColorRemoved { pivot_id: PivotId },
    HandpickedChanged { pivot_id: PivotId },
    GroupCreated { group_id: GroupId, lead_color: ColorHex },
    GroupDeleted { group_id: GroupId },
    GroupCleared { group_id: GroupId },
    LeadColorChanged { group_id: GroupId, lead_color: ColorHex },
    MembershipChanged,
}

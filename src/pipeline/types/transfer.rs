use serde::{Deserialize, Serialize};

use crate::common::{GroupId, PivotId};

/// What a drag carries from the drag source to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub pivot_id: PivotId,
    pub origin_group_id: Option<GroupId>,
}

impl TransferPayload {
    pub fn new(pivot_id: PivotId, origin_group_id: Option<GroupId>) -> Self {
        Self {
            pivot_id,
            origin_group_id,
        }
    }
}

/// Text channel standing in for a platform drag-and-drop data transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferChannel {
    data: Option<String>,
}

impl TransferChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = Some(data.into());
    }

    pub fn get_data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ImageId;

    #[test]
    fn test_payload_wire_shape() {
        let pivot = PivotId::new(ImageId::new(), 3);
        let payload = TransferPayload::new(pivot, None);

        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(value["pivotId"], serde_json::json!(pivot.to_string()));
        assert!(value["originGroupId"].is_null());

        let parsed: TransferPayload = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, payload);
    }
}

use tracing::{debug, warn};

use super::sort_engine::SortEngine;
use crate::common::{GroupId, PivotId};
use crate::pipeline::types::{TransferChannel, TransferPayload};

/// Writes the drag payload for `pivot` into the channel.
pub fn drag_start(
    channel: &mut TransferChannel,
    pivot: PivotId,
    origin_group_id: Option<GroupId>,
) -> Result<(), serde_json::Error> {
    channel.clear();
    let payload = serde_json::to_string(&TransferPayload::new(pivot, origin_group_id))?;
    debug!("Drag started: {}", payload);
    channel.set_data(payload);
    Ok(())
}

/// Reads the pending payload. Missing or malformed data is logged and
/// treated as no payload at all.
pub fn read_payload(channel: &TransferChannel) -> Option<TransferPayload> {
    let Some(data) = channel.get_data() else {
        warn!("Drop without transfer data");
        return None;
    };

    match serde_json::from_str::<TransferPayload>(data) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Ignoring malformed transfer payload {:?}: {}", data, e);
            None
        }
    }
}

/// Completes a drag on `target` (`None` = outside any group). The channel
/// is empty afterwards whatever the outcome.
pub fn drop_on(
    engine: &mut SortEngine<'_>,
    channel: &mut TransferChannel,
    target: Option<GroupId>,
) -> bool {
    let payload = read_payload(channel);
    channel.clear();

    match payload {
        Some(payload) => engine.transfer(payload.pivot_id, payload.origin_group_id, target),
        None => false,
    }
}

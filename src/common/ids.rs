use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PivotIdError;

/// Identifies an ingested image for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ImageId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for ImageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifies a color group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for GroupId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for GroupId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

const PIVOT_SEPARATOR: &str = "__";

/// Stable reference to one pool slot, rendered as `{image_id}__{slot}`.
///
/// Groups key their members by pivot so membership can always be resolved
/// back to the exact slot of the pool that owns the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PivotId {
    pub image_id: ImageId,
    pub slot: usize,
}

impl PivotId {
    pub fn new(image_id: ImageId, slot: usize) -> Self {
        Self { image_id, slot }
    }
}

impl fmt::Display for PivotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.image_id, PIVOT_SEPARATOR, self.slot)
    }
}

impl FromStr for PivotId {
    type Err = PivotIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (image, slot) = s
            .split_once(PIVOT_SEPARATOR)
            .ok_or_else(|| PivotIdError::MissingSeparator(s.to_string()))?;

        let image_id = image
            .parse::<ImageId>()
            .map_err(|_| PivotIdError::InvalidImageId(image.to_string()))?;
        let slot = slot
            .parse::<usize>()
            .map_err(|_| PivotIdError::InvalidSlot(slot.to_string()))?;

        Ok(Self { image_id, slot })
    }
}

impl TryFrom<String> for PivotId {
    type Error = PivotIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PivotId> for String {
    fn from(pivot: PivotId) -> Self {
        pivot.to_string()
    }
}

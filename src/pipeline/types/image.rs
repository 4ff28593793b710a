use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ImageId;

/// Where an image came from. Also decides its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "camelCase")]
pub enum ImageOrigin {
    #[serde(rename_all = "camelCase")]
    File { file_name: String },
    #[serde(rename_all = "camelCase")]
    Link { original_src: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: ImageId,
    #[serde(flatten)]
    pub origin: ImageOrigin,
    pub blob_src: String,
    pub cropped_src: Option<String>,
    pub imported_at: DateTime<Utc>,
}

impl Image {
    pub fn from_file(file_name: impl Into<String>, blob_src: impl Into<String>) -> Self {
        Self::new(
            ImageOrigin::File {
                file_name: file_name.into(),
            },
            blob_src,
        )
    }

    pub fn from_link(original_src: impl Into<String>, blob_src: impl Into<String>) -> Self {
        Self::new(
            ImageOrigin::Link {
                original_src: original_src.into(),
            },
            blob_src,
        )
    }

    fn new(origin: ImageOrigin, blob_src: impl Into<String>) -> Self {
        Self {
            id: ImageId::new(),
            origin,
            blob_src: blob_src.into(),
            cropped_src: None,
            imported_at: Utc::now(),
        }
    }

    pub fn with_cropped_src(mut self, cropped_src: impl Into<String>) -> Self {
        self.cropped_src = Some(cropped_src.into());
        self
    }

    /// File name for uploads, original URL for links.
    pub fn display_name(&self) -> &str {
        match &self.origin {
            ImageOrigin::File { file_name } => file_name,
            ImageOrigin::Link { original_src } => original_src,
        }
    }

    /// The source colors are sampled from: the crop when there is one.
    pub fn render_src(&self) -> &str {
        self.cropped_src.as_deref().unwrap_or(&self.blob_src)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TagType;

/// Tag attached to an image, with the tagger confidence when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTagDto {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TagType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDto {
    pub id: u64,
    pub title: String,
    pub file_name: String,
    pub extension: String,
    /// Size in bytes.
    pub size: u64,
    pub width: u32,
    pub height: u32,
    /// SHA-256 of the original file.
    pub hash: String,
    #[serde(default)]
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(alias = "imageUrl")]
    pub url: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub tags: Vec<ImageTagDto>,
}

impl ImageDto {
    #[must_use]
    pub fn tags_of(&self, kind: &TagType) -> Vec<&ImageTagDto> {
        self.tags.iter().filter(|t| &t.kind == kind).collect()
    }
}

/// Partial update of an image; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ImageUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.file_name.is_none()
    }
}

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::listing::VideoLister;

/// A stored object as reported by the blob store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    pub url: String,
    pub pathname: String,
    pub size: u64,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// One page of a prefix listing. `cursor` is set while more pages remain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlobPage {
    pub blobs: Vec<BlobRecord>,
    pub cursor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PutBlobResult {
    pub url: String,
    pub pathname: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
        }
    }
}

/// A video as served by `GET /api/videos`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    pub src: String,
    pub category: String,
    pub category_order: u64,
    pub file_name: String,
    pub size: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub videos: VideoLister,
    pub config: Config,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub local_path: String,
    pub blob_url: String,
    pub pathname: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompressionStats {
    pub original: u64,
    pub compressed: u64,
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl CompressionStats {
    pub fn savings(&self) -> i64 {
        self.original as i64 - self.compressed as i64
    }

    pub fn savings_percent(&self) -> f64 {
        if self.original == 0 {
            return 0.0;
        }
        self.savings() as f64 * 100.0 / self.original as f64
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

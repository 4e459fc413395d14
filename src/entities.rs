use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response envelope from the Synology web API
#[derive(Deserialize, Debug)]
pub struct SynologyResponse<D> {
    pub success: bool,
    pub data: Option<D>,
    pub error: Option<ApiError>,
}

/// Error information from the Synology web API
#[derive(Deserialize, Debug)]
pub struct ApiError {
    pub code: i32,
}

/// File listing returned by the `SYNO.FileStation.List` operation
#[derive(Deserialize, Debug)]
pub struct FileList {
    pub files: Vec<RemoteFileEntry>,
    #[serde(default)]
    pub offset: i32,
    #[serde(default)]
    pub total: i32,
}

/// One entry of a sharing-link file listing
#[derive(Deserialize, Debug, Clone)]
pub struct RemoteFileEntry {
    /// File or directory name
    pub name: String,
    /// Path within the shared folder, used for download requests
    pub path: String,
    #[serde(default)]
    pub isdir: bool,
    /// Size/time metadata, present when requested via the `additional` parameter
    pub additional: Option<FileAdditional>,
}

/// Extra metadata for a listed file
#[derive(Deserialize, Debug, Clone, Default)]
pub struct FileAdditional {
    pub size: Option<u64>,
    pub time: Option<FileTime>,
}

/// File timestamps, reported by the API as unix seconds
#[derive(Deserialize, Debug, Clone)]
pub struct FileTime {
    #[serde(with = "ts_seconds")]
    pub mtime: DateTime<Utc>,
    #[serde(with = "ts_seconds")]
    pub crtime: DateTime<Utc>,
}

/// One configured synchronization unit: a sharing link plus the
/// destination subfolder it syncs into
#[derive(Deserialize, Debug, Clone)]
pub struct Source {
    /// Synology sharing link, e.g. `https://nas.example.com/mo/sharing/dRCQK2EDv`
    pub url: String,
    /// Destination subfolder beneath the data directory; identifies the source
    pub folder_name: String,
}

/// Outcome of syncing a single source
#[derive(Serialize, Debug, Clone)]
pub struct SyncResult {
    pub success: bool,
    pub files_downloaded: u32,
    pub error: Option<String>,
}

/// Outcome of syncing all configured sources
#[derive(Serialize, Debug, Clone)]
pub struct AggregateSyncResult {
    /// False if any attempted source failed
    pub success: bool,
    pub total_downloaded: u32,
    /// Per-source results, keyed by folder name; skipped sources are absent
    pub sources: HashMap<String, SyncResult>,
    /// Last failure message seen, if any
    pub error: Option<String>,
}

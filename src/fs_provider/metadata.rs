//! Filesystem metadata records handed back to the host

use crate::onedrive_service::onedrive_models::RemoteItem;
use serde::{Deserialize, Serialize};

/// Result of `stat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    pub path: String,
    pub size: u64,
    pub last_modified: Option<i64>,
    pub is_directory: bool,
}

/// One entry of a `browse` answer; folders carry their direct children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseEntry {
    pub full_path: Option<String>,
    pub exists: bool,
    pub directory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BrowseEntry>>,
}

impl BrowseEntry {
    /// Answer for a path that is neither a file nor a folder
    pub fn missing() -> Self {
        Self {
            full_path: None,
            exists: false,
            directory: false,
            size: None,
            last_modified: None,
            children: None,
        }
    }

    /// Entry describing `item`, without children. Folders report size 0.
    pub fn from_item(full_path: String, item: &RemoteItem) -> Self {
        let directory = item.is_directory();
        Self {
            full_path: Some(full_path),
            exists: true,
            directory,
            size: Some(if directory { 0 } else { item.size().unwrap_or(0) }),
            last_modified: item.last_modified(),
            children: None,
        }
    }

    pub fn folder(full_path: String, item: &RemoteItem, children: Vec<BrowseEntry>) -> Self {
        Self {
            children: Some(children),
            ..Self::from_item(full_path, item)
        }
    }
}

/// One file produced by `enumerate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumeratedFile {
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

impl EnumeratedFile {
    pub fn from_item(path: String, item: &RemoteItem) -> Self {
        Self {
            path,
            size: item.size().unwrap_or(0),
            last_modified: item.last_modified(),
        }
    }
}

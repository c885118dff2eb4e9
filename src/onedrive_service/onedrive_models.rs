use crate::operations::retry::RetryConfig;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timestamp layout of `lastModifiedDateTime` accepted by the item model
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Upload chunk alignment required by the upload session API (320 KiB)
pub const CHUNK_ALIGNMENT: u64 = 320 * 1024;

/// Kind of a remote item, derived from its facets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Folder,
    Unknown,
}

/// RemoteItem: the service's description of a file, a folder, or an absent object.
/// Wraps the raw JSON as returned by the API and never performs I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteItem {
    description: Value,
}

impl RemoteItem {
    pub fn new(description: Value) -> Self {
        let description = if description.is_object() {
            description
        } else {
            Value::Object(Default::default())
        };
        Self { description }
    }

    /// Item standing for a path the service does not know
    pub fn missing() -> Self {
        Self::new(Value::Null)
    }

    /// True iff the description carries the service context marker
    pub fn exists(&self) -> bool {
        self.description.get("@odata.context").is_some()
    }

    pub fn kind(&self) -> ItemKind {
        if self.description.get("file").is_some() {
            ItemKind::File
        } else if self.description.get("folder").is_some() {
            ItemKind::Folder
        } else {
            ItemKind::Unknown
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind() == ItemKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind() == ItemKind::Folder
    }

    /// Size in bytes. Folders report `None` here.
    pub fn size(&self) -> Option<u64> {
        if self.is_directory() {
            return None;
        }
        self.description.get("size").and_then(Value::as_u64)
    }

    pub fn id(&self) -> Option<&str> {
        self.description.get("id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.description.get("name").and_then(Value::as_str)
    }

    /// Last modification as epoch milliseconds (UTC), `None` when absent or not in `TIME_FORMAT`
    pub fn last_modified(&self) -> Option<i64> {
        self.description
            .get("lastModifiedDateTime")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
    }
}

/// Parse a `TIME_FORMAT` timestamp into epoch milliseconds, truncated to the second.
/// Values the format rejects (some API variants add sub-second digits) are reported as unknown.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp() * 1000)
}

/// One page of a children listing
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ChildrenPage {
    #[serde(default)]
    pub value: Vec<Value>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// ParentReference: where an item lives, including the drive that hosts it
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct ParentReference {
    pub id: Option<String>,
    #[serde(rename = "driveId")]
    pub drive_id: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RemoteItemFacet {
    #[serde(rename = "parentReference")]
    pub parent_reference: Option<ParentReference>,
}

/// An entry of the "shared with me" listing
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SharedItem {
    pub name: Option<String>,
    #[serde(rename = "remoteItem")]
    pub remote_item: Option<RemoteItemFacet>,
    #[serde(rename = "parentReference")]
    pub parent_reference: Option<ParentReference>,
}

impl SharedItem {
    /// Drive hosting the shared item, read from the nested remote item first
    pub fn drive_id(&self) -> Option<&str> {
        self.remote_item
            .as_ref()
            .and_then(|r| r.parent_reference.as_ref())
            .and_then(|p| p.drive_id.as_deref())
            .or_else(|| {
                self.parent_reference
                    .as_ref()
                    .and_then(|p| p.drive_id.as_deref())
            })
    }
}

/// Upload session response from the createUploadSession call
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct UploadSessionResponse {
    #[serde(rename = "uploadUrl")]
    pub upload_url: Option<String>,
    #[serde(rename = "expirationDateTime")]
    pub expiration_date_time: Option<String>,
    #[serde(rename = "nextExpectedRanges", default)]
    pub next_expected_ranges: Vec<String>,
}

/// Error envelope returned by the API on failures
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GraphErrorResponse {
    pub error: GraphErrorBody,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GraphErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Upload session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSessionConfig {
    pub chunk_size: u64,
    /// Budget for createUploadSession calls racing a preceding delete
    pub create_session_retry: RetryConfig,
}

impl Default for UploadSessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_ALIGNMENT,
            create_session_retry: RetryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_item_accessors() {
        let item = RemoteItem::new(json!({
            "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#drives('x')/root/$entity",
            "id": "01ABC",
            "name": "report.csv",
            "size": 2048,
            "lastModifiedDateTime": "2024-01-15T10:30:00Z",
            "file": { "mimeType": "text/csv" }
        }));
        assert!(item.exists());
        assert!(item.is_file());
        assert!(!item.is_directory());
        assert_eq!(item.size(), Some(2048));
        assert_eq!(item.id(), Some("01ABC"));
        assert_eq!(item.name(), Some("report.csv"));
        assert_eq!(item.last_modified(), Some(1_705_314_600_000));
    }

    #[test]
    fn test_folder_item_has_no_size_at_model_layer() {
        let item = RemoteItem::new(json!({
            "@odata.context": "ctx",
            "name": "Documents",
            "size": 99999,
            "folder": { "childCount": 3 }
        }));
        assert!(item.is_directory());
        assert_eq!(item.kind(), ItemKind::Folder);
        assert_eq!(item.size(), None);
    }

    #[test]
    fn test_not_found_payload() {
        let item = RemoteItem::new(json!({
            "error": { "code": "itemNotFound", "message": "The resource could not be found." }
        }));
        assert!(!item.exists());
        assert_eq!(item.kind(), ItemKind::Unknown);
        assert_eq!(item.id(), None);
        assert_eq!(item.last_modified(), None);
    }

    #[test]
    fn test_missing_and_non_object_descriptions() {
        assert!(!RemoteItem::missing().exists());
        assert_eq!(RemoteItem::new(json!([1, 2])).kind(), ItemKind::Unknown);
    }

    #[test]
    fn test_listing_child_is_typed_without_context() {
        let child = RemoteItem::new(json!({ "name": "a.txt", "size": 3, "file": {} }));
        assert!(!child.exists());
        assert!(child.is_file());
        assert_eq!(child.size(), Some(3));
    }

    #[test]
    fn test_timestamp_with_fraction_is_unknown() {
        assert_eq!(parse_timestamp("2024-01-15T10:30:00.123Z"), None);
        assert_eq!(parse_timestamp("garbage"), None);
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z"), Some(1000));
    }

    #[test]
    fn test_shared_item_drive_id_lookup() {
        let nested: SharedItem = serde_json::from_value(json!({
            "name": "Team",
            "remoteItem": { "parentReference": { "driveId": "b!remote" } },
            "parentReference": { "driveId": "b!outer" }
        }))
        .unwrap();
        assert_eq!(nested.drive_id(), Some("b!remote"));

        let outer: SharedItem = serde_json::from_value(json!({
            "name": "Team",
            "parentReference": { "driveId": "b!outer" }
        }))
        .unwrap();
        assert_eq!(outer.drive_id(), Some("b!outer"));
    }

    #[test]
    fn test_children_page_deserialization() {
        let page: ChildrenPage = serde_json::from_value(json!({
            "value": [{ "name": "a" }, { "name": "b" }],
            "@odata.nextLink": "https://next"
        }))
        .unwrap();
        assert_eq!(page.value.len(), 2);
        assert_eq!(page.next_link.as_deref(), Some("https://next"));
    }

    #[test]
    fn test_upload_session_config_default() {
        let config = UploadSessionConfig::default();
        assert_eq!(config.chunk_size, 327_680);
        assert_eq!(config.create_session_retry.max_attempts, 2);
    }
}

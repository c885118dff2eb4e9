use onedrive_fs_bridge::config::BridgeConfig;
use onedrive_fs_bridge::onedrive_service::onedrive_client::OneDriveClient;
use serde_json::{json, Value};

pub const API_BASE: &str = "https://graph.test/v1.0";
pub const TOKEN: &str = "test-token";
pub const MODIFIED: &str = "2024-01-02T03:04:05Z";
pub const MODIFIED_MS: i64 = 1_704_164_645_000;

/// Config pointing at the mock endpoint, with no delay between session retries
pub fn test_config(root: &str) -> BridgeConfig {
    let mut config = BridgeConfig::new(root, TOKEN);
    config.api_base_url = API_BASE.to_string();
    config.upload.create_session_retry.delay_ms = 0;
    config
}

pub fn item_url(path: &str) -> String {
    format!("{}/me/drive/{}", API_BASE, OneDriveClient::onedrive_path(path))
}

pub fn children_url(path: &str) -> String {
    format!("{}/children", item_url(path))
}

pub fn content_url(path: &str) -> String {
    format!("{}/content", item_url(path))
}

pub fn mutation_url(path: &str) -> String {
    format!(
        "{}/me/drive/items/{}",
        API_BASE,
        OneDriveClient::onedrive_path(path)
    )
}

pub fn create_session_url(path: &str) -> String {
    format!("{}/createUploadSession", mutation_url(path))
}

pub fn shared_with_me_url() -> String {
    format!("{}/me/drive/sharedWithMe", API_BASE)
}

pub fn drive_item_url(drive_id: &str, path: &str) -> String {
    format!(
        "{}/drives/{}/{}",
        API_BASE,
        drive_id,
        OneDriveClient::onedrive_path(path)
    )
}

/// Item description as returned by a path lookup
pub fn file_item(id: &str, name: &str, size: u64) -> Value {
    json!({
        "@odata.context": "https://graph.test/v1.0/$metadata#items/$entity",
        "id": id,
        "name": name,
        "size": size,
        "lastModifiedDateTime": MODIFIED,
        "file": { "mimeType": "application/octet-stream" }
    })
}

pub fn folder_item(id: &str, name: &str) -> Value {
    json!({
        "@odata.context": "https://graph.test/v1.0/$metadata#items/$entity",
        "id": id,
        "name": name,
        "size": 4096,
        "lastModifiedDateTime": MODIFIED,
        "folder": { "childCount": 0 }
    })
}

/// Child entry as returned inside a listing page
pub fn file_child(name: &str, size: u64) -> Value {
    json!({
        "id": format!("id-{}", name),
        "name": name,
        "size": size,
        "lastModifiedDateTime": MODIFIED,
        "file": {}
    })
}

pub fn folder_child(name: &str) -> Value {
    json!({
        "id": format!("id-{}", name),
        "name": name,
        "size": 0,
        "lastModifiedDateTime": MODIFIED,
        "folder": { "childCount": 1 }
    })
}

pub fn page(items: Vec<Value>, next_link: Option<&str>) -> Value {
    match next_link {
        Some(link) => json!({ "value": items, "@odata.nextLink": link }),
        None => json!({ "value": items }),
    }
}

/// Entry of the "shared with me" listing for a folder hosted on `drive_id`
pub fn shared_item(name: &str, drive_id: &str) -> Value {
    json!({ "name": name, "remoteItem": { "parentReference": { "driveId": drive_id } } })
}

pub fn upload_session(upload_url: &str) -> Value {
    json!({ "uploadUrl": upload_url, "expirationDateTime": "2030-01-01T00:00:00Z" })
}

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::onedrive_service::http_client::{ApiRequest, ApiResponse, GraphTransport, HttpClient};
use crate::onedrive_service::onedrive_models::{
    RemoteItem, SharedItem, UploadSessionConfig, UploadSessionResponse,
};
use crate::onedrive_service::pager::ItemPager;
use crate::onedrive_service::upload_session::UploadSession;
use crate::operations::path_utils::split_path;
use crate::operations::retry::retry_flat;
use crate::safe_logger::SafeLogger;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;

const ITEM_NOT_FOUND: &str = "itemNotFound";

/// Drive a bridge talks to, resolved once at construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedDriveContext {
    pub drive_id: Option<String>,
}

/// OneDrive API client: item lookup, listing, content transfer and mutations by path
pub struct OneDriveClient {
    transport: Arc<dyn GraphTransport>,
    access_token: String,
    api_base_url: String,
    upload_config: UploadSessionConfig,
    shared_drive: SharedDriveContext,
    logger: SafeLogger,
}

impl OneDriveClient {
    /// Build a client over the reqwest transport
    pub async fn new(config: &BridgeConfig, logger: SafeLogger) -> Result<Self> {
        let transport = HttpClient::new(config.request_timeout(), config.connect_timeout())?;
        Self::with_transport(Arc::new(transport), config, logger).await
    }

    /// Build a client over any transport, resolving the shared drive when one is configured
    pub async fn with_transport(
        transport: Arc<dyn GraphTransport>,
        config: &BridgeConfig,
        logger: SafeLogger,
    ) -> Result<Self> {
        config.validate()?;
        let mut client = Self {
            transport,
            access_token: config.access_token.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_config: config.upload.clone(),
            shared_drive: SharedDriveContext::default(),
            logger,
        };

        let shared_folder = config.shared_folder_root();
        if !shared_folder.is_empty() {
            client.shared_drive = client.resolve_shared_drive(shared_folder).await?;
        }
        Ok(client)
    }

    pub fn shared_drive(&self) -> &SharedDriveContext {
        &self.shared_drive
    }

    /// Authorization header value
    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request = request.header("Authorization", self.auth_header());
        self.transport.execute(request).await
    }

    /// `{api}/me/drive/` or, once a shared drive is resolved, `{api}/drives/{id}/`
    fn drive_root(&self) -> String {
        match &self.shared_drive.drive_id {
            Some(drive_id) => format!("{}/drives/{}/", self.api_base_url, drive_id),
            None => format!("{}/me/drive/", self.api_base_url),
        }
    }

    /// Path addressing segment: `root` for the drive root, `root:/<encoded path>:` otherwise
    pub fn onedrive_path(path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        if encoded.is_empty() {
            "root".to_string()
        } else {
            format!("root:/{}:", encoded.join("/"))
        }
    }

    /// Endpoint for a path; `is_item` selects the `items/` flavour used for mutations
    pub fn path_endpoint(&self, path: &str, is_item: bool) -> String {
        let items = if is_item { "items/" } else { "" };
        format!("{}{}{}", self.drive_root(), items, Self::onedrive_path(path))
    }

    async fn resolve_shared_drive(&self, shared_folder: &str) -> Result<SharedDriveContext> {
        let url = format!("{}/me/drive/sharedWithMe", self.api_base_url);
        self.logger
            .info(format!("Resolving shared folder '{}'", shared_folder));

        let mut pager = ItemPager::new(
            self.transport.clone(),
            self.auth_header(),
            url,
            self.logger.clone(),
        );
        while let Some(raw) = pager.next_item().await? {
            let shared: SharedItem = match serde_json::from_value(raw) {
                Ok(shared) => shared,
                Err(e) => {
                    self.logger
                        .debug(format!("Skipping unreadable shared item: {}", e));
                    continue;
                }
            };
            if shared.name.as_deref() != Some(shared_folder) {
                continue;
            }
            if let Some(drive_id) = shared.drive_id() {
                self.logger.info(format!(
                    "Shared folder '{}' lives on drive {}",
                    shared_folder, drive_id
                ));
                return Ok(SharedDriveContext {
                    drive_id: Some(drive_id.to_string()),
                });
            }
        }

        self.logger.warn(format!(
            "Shared folder '{}' not found, using the caller's own drive",
            shared_folder
        ));
        Ok(SharedDriveContext::default())
    }

    /// Describe the item at `path`. A 404 yields an item whose `exists()` is false.
    pub async fn get_item(&self, path: &str) -> Result<RemoteItem> {
        let url = self.path_endpoint(path, false);
        let response = self.send(ApiRequest::get(url)).await?;

        if response.status == 404 {
            self.logger.debug(format!("No remote item at {}", path));
            return Ok(RemoteItem::new(response.json_or_null()));
        }
        let response = response.error_for_status("get item")?;
        Ok(RemoteItem::new(response.json()?))
    }

    /// Lazy listing of the direct children of `path`
    pub fn list_children(&self, path: &str) -> ItemPager {
        let url = format!("{}/children", self.path_endpoint(path, false));
        ItemPager::new(
            self.transport.clone(),
            self.auth_header(),
            url,
            self.logger.clone(),
        )
    }

    /// Download the whole content of the file at `path`
    pub async fn get_content(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/content", self.path_endpoint(path, false));
        let response = self.send(ApiRequest::get(url)).await?;

        if response.status == 404 {
            return Err(BridgeError::NotFound(path.to_string()));
        }
        let response = response.error_for_status("get content")?;
        Ok(response.body)
    }

    /// Write `data` to `path` through a resumable upload session
    pub async fn upload(&self, path: &str, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return self.upload_empty(path).await;
        }

        let mut session = UploadSession::new(data.len() as u64);
        let session_url = match self.create_upload_session(path).await {
            Ok(url) => url,
            Err(e) => {
                session.fail();
                self.logger
                    .error(format!("Could not open upload session for {}: {}", path, e));
                return Err(e);
            }
        };
        session.start(session_url.clone())?;

        let chunk_size = self.upload_config.chunk_size;
        let mut chunks_sent = 0;
        while let Some(range) = session.next_range(chunk_size) {
            let chunk = &data[range.start as usize..=range.end as usize];
            // the session URL is pre-authenticated
            let request = ApiRequest::new(Method::PUT, session_url.as_str())
                .header("Content-Length", range.len().to_string())
                .header("Content-Range", session.content_range(&range))
                .bytes(chunk.to_vec());

            let sent = match self.transport.execute(request).await {
                Ok(response) => response.error_for_status("upload chunk").map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = sent {
                session.fail();
                self.logger.error(format!(
                    "Chunk {} of {} failed at offset {}: {}",
                    chunks_sent + 1,
                    path,
                    range.start,
                    e
                ));
                return Err(e);
            }
            session.advance(range.len());
            chunks_sent += 1;
        }

        self.logger.info(format!(
            "Uploaded {} bytes to {} in {} chunks",
            session.total_size(),
            path,
            chunks_sent
        ));
        Ok(())
    }

    /// Zero-byte files cannot be sent as a byte range; use a simple content PUT
    async fn upload_empty(&self, path: &str) -> Result<()> {
        let url = format!("{}/content", self.path_endpoint(path, false));
        let request = ApiRequest::new(Method::PUT, url)
            .header("Content-Type", "application/octet-stream")
            .bytes(Vec::new());
        self.send(request)
            .await?
            .error_for_status("upload empty file")?;
        self.logger.info(format!("Created empty file {}", path));
        Ok(())
    }

    /// Request a session URL, retrying the `itemNotFound` race that follows a delete
    async fn create_upload_session(&self, path: &str) -> Result<String> {
        let url = format!("{}/createUploadSession", self.path_endpoint(path, true));
        self.logger
            .info(format!("Creating upload session for {}", path));

        let result = retry_flat(
            &self.upload_config.create_session_retry,
            "createUploadSession",
            || self.request_upload_url(&url),
            |e| e.graph_code() == Some(ITEM_NOT_FOUND),
        )
        .await;

        match result {
            Err(e) if e.graph_code() == Some(ITEM_NOT_FOUND) => Err(BridgeError::Protocol(
                format!("can't create upload session for {}: {}", path, e),
            )),
            other => other,
        }
    }

    async fn request_upload_url(&self, url: &str) -> Result<String> {
        let response = self.send(ApiRequest::new(Method::POST, url)).await?;
        if !response.is_success() {
            return Err(response.into_error("create upload session"));
        }
        let session: UploadSessionResponse = response.json()?;
        session.upload_url.ok_or_else(|| {
            BridgeError::Protocol("upload session response carries no uploadUrl".to_string())
        })
    }

    /// Delete the item at `path`. True iff the service answered 204.
    pub async fn delete(&self, path: &str) -> Result<bool> {
        let url = self.path_endpoint(path, true);
        let response = self.send(ApiRequest::new(Method::DELETE, url)).await?;
        if response.status == 204 {
            self.logger.info(format!("Deleted {}", path));
            Ok(true)
        } else {
            self.logger.warn(format!(
                "Delete of {} answered {}, nothing deleted",
                path, response.status
            ));
            Ok(false)
        }
    }

    /// Move the item at `from_path` under the parent folder of `to_path`, keeping its name.
    /// False when the source does not exist.
    pub async fn move_item(&self, from_path: &str, to_path: &str) -> Result<bool> {
        let from_item = self.get_item(from_path).await?;
        if !from_item.exists() {
            self.logger
                .info(format!("Move source {} does not exist", from_path));
            return Ok(false);
        }

        let (_, file_name) = split_path(from_path);
        let (target_dir, _) = split_path(to_path);
        let target = self.get_item(target_dir).await?;
        let Some(parent_id) = target.id() else {
            self.logger.warn(format!(
                "Move target folder {} could not be resolved",
                target_dir
            ));
            return Ok(false);
        };

        let body = json!({
            "parentReference": { "id": parent_id },
            "name": file_name
        });
        let request = ApiRequest::new(Method::PATCH, self.path_endpoint(from_path, true))
            .header("Content-Type", "application/json")
            .json(body);
        self.send(request).await?.error_for_status("move item")?;

        self.logger
            .info(format!("Moved {} to {}", from_path, target_dir));
        Ok(true)
    }

    /// Give the item at `from_path` the basename of `to_path`. No existence check.
    pub async fn rename_item(&self, from_path: &str, to_path: &str) -> Result<bool> {
        let (_, new_name) = split_path(to_path);
        let request = ApiRequest::new(Method::PATCH, self.path_endpoint(from_path, true))
            .header("Content-Type", "application/json")
            .json(json!({ "name": new_name }));
        self.send(request).await?.error_for_status("rename item")?;

        self.logger
            .info(format!("Renamed {} to {}", from_path, new_name));
        Ok(true)
    }
}

//! Filesystem facade exposing a OneDrive root as a remote file storage

pub mod enumerator;
pub mod metadata;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::fs_provider::enumerator::DirectoryEnumerator;
use crate::fs_provider::metadata::{BrowseEntry, EnumeratedFile, FileStat};
use crate::onedrive_service::http_client::GraphTransport;
use crate::onedrive_service::onedrive_client::OneDriveClient;
use crate::operations::path_utils::{join_root, normalize, relativize, split_path};
use crate::safe_logger::SafeLogger;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub struct OneDriveFsProvider {
    root: String,
    shared_folder_root: String,
    client: OneDriveClient,
    logger: SafeLogger,
}

impl OneDriveFsProvider {
    pub async fn new(config: BridgeConfig, logger: SafeLogger) -> Result<Self> {
        Self::log_init(&config, &logger)?;
        let client = OneDriveClient::new(&config, logger.clone()).await?;
        Ok(Self::from_client(&config, client, logger))
    }

    pub async fn with_transport(
        config: BridgeConfig,
        transport: Arc<dyn GraphTransport>,
        logger: SafeLogger,
    ) -> Result<Self> {
        Self::log_init(&config, &logger)?;
        let client = OneDriveClient::with_transport(transport, &config, logger.clone()).await?;
        Ok(Self::from_client(&config, client, logger))
    }

    fn from_client(config: &BridgeConfig, client: OneDriveClient, logger: SafeLogger) -> Self {
        Self {
            root: relativize(&config.root).to_string(),
            shared_folder_root: config.shared_folder_root().to_string(),
            client,
            logger,
        }
    }

    fn log_init(config: &BridgeConfig, logger: &SafeLogger) -> Result<()> {
        let raw = serde_json::to_value(config)?;
        logger.info(format!(
            "Initializing OneDrive bridge at '{}' with {}",
            config.root,
            logger.filter_secrets(&raw)
        ));
        Ok(())
    }

    /// Drive path of a caller path: shared folder, then root, then the path itself
    pub fn get_full_path(&self, path: &str) -> String {
        join_root(&self.shared_folder_root, &self.root, path)
    }

    /// Size, modification time and kind of `path`; `None` unless it is a file or a folder
    pub async fn stat(&self, path: &str) -> Result<Option<FileStat>> {
        let full_path = self.get_full_path(relativize(path));
        let item = self.client.get_item(&full_path).await?;
        if !item.is_file() && !item.is_directory() {
            return Ok(None);
        }

        let is_directory = item.is_directory();
        Ok(Some(FileStat {
            size: if is_directory { 0 } else { item.size().unwrap_or(0) },
            last_modified: item.last_modified(),
            is_directory,
            path: full_path,
        }))
    }

    /// Modification times are owned by the service and cannot be set
    pub fn set_last_modified(&self, path: &str, last_modified: i64) -> bool {
        self.logger.debug(format!(
            "Ignoring last modified {} for {}",
            last_modified, path
        ));
        false
    }

    pub async fn browse(&self, path: &str) -> Result<BrowseEntry> {
        let full_path = self.get_full_path(path);
        DirectoryEnumerator::new(&self.client, &self.logger)
            .browse(path, &full_path)
            .await
    }

    pub async fn enumerate(
        &self,
        path: &str,
        first_non_empty_only: bool,
    ) -> Result<Option<Vec<EnumeratedFile>>> {
        let full_path = self.get_full_path(path);
        DirectoryEnumerator::new(&self.client, &self.logger)
            .enumerate(path, &full_path, first_non_empty_only)
            .await
    }

    /// Delete `path` and everything below it. `Some(1)` on success, `None` when the service
    /// did not confirm. Refuses the bridge root without contacting the service.
    pub async fn delete_recursive(&self, path: &str) -> Result<Option<u64>> {
        let relative = relativize(path);
        let full_path = self.get_full_path(relative);
        // any spelling of the root ("", "/", "///") resolves to the bridge root
        if normalize(relative) == "/" || full_path == self.get_full_path("") {
            self.logger
                .error(format!("Refusing to delete the bridge root ({:?})", path));
            return Err(BridgeError::InvalidOperation(
                "Cannot delete root path".to_string(),
            ));
        }

        let deleted = self.client.delete(&full_path).await?;
        Ok(deleted.then_some(1))
    }

    /// Same basename: move to the destination's folder. Otherwise rename in place.
    pub async fn move_path(&self, from_path: &str, to_path: &str) -> Result<bool> {
        let from_full_path = self.get_full_path(from_path);
        let to_full_path = self.get_full_path(to_path);
        let (_, from_name) = split_path(&from_full_path);
        let (_, to_name) = split_path(&to_full_path);

        if from_name == to_name {
            self.client.move_item(&from_full_path, &to_full_path).await
        } else {
            self.client.rename_item(&from_full_path, &to_full_path).await
        }
    }

    /// Copy the file at `path` into `sink`, at most `limit` bytes. A missing file writes
    /// nothing and reports 0.
    pub async fn read<W>(&self, path: &str, sink: &mut W, limit: Option<u64>) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let full_path = self.get_full_path(path);
        let data = match self.client.get_content(&full_path).await {
            Ok(data) => data,
            Err(BridgeError::NotFound(_)) => {
                self.logger.error(format!("File not found: {}", full_path));
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        let len = match limit {
            Some(limit) => data.len().min(usize::try_from(limit).unwrap_or(usize::MAX)),
            None => data.len(),
        };
        sink.write_all(&data[..len]).await?;
        sink.flush().await?;
        Ok(len as u64)
    }

    /// Buffer `source` fully, then upload it to `path`
    pub async fn write<R>(&self, path: &str, source: &mut R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let full_path = self.get_full_path(path);
        let mut buffer = Vec::new();
        source.read_to_end(&mut buffer).await?;
        self.logger.debug(format!(
            "Writing {} bytes to {}",
            buffer.len(),
            full_path
        ));
        self.client.upload(&full_path, &buffer).await
    }

    pub fn close(&self) {
        self.logger
            .info(format!("Closing OneDrive bridge at '{}'", self.root));
    }
}

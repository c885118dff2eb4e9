//! Single-level browsing and recursive file enumeration over the children pager

use crate::error::Result;
use crate::fs_provider::metadata::{BrowseEntry, EnumeratedFile};
use crate::onedrive_service::onedrive_client::OneDriveClient;
use crate::onedrive_service::onedrive_models::RemoteItem;
use crate::onedrive_service::pager::ItemPager;
use crate::operations::path_utils::{child_path, normalize};
use crate::safe_logger::SafeLogger;

/// A folder being walked: its caller-facing path, its remote path and the listing cursor
struct Frame {
    path: String,
    full_path: String,
    pager: ItemPager,
}

pub struct DirectoryEnumerator<'a> {
    client: &'a OneDriveClient,
    logger: &'a SafeLogger,
}

impl<'a> DirectoryEnumerator<'a> {
    pub fn new(client: &'a OneDriveClient, logger: &'a SafeLogger) -> Self {
        Self { client, logger }
    }

    /// Files under `full_path`, reported relative to the caller's `path`.
    ///
    /// `None` when the target is neither a file nor a folder. With `first_non_empty_only` the
    /// walk stops everywhere as soon as one file is found.
    pub async fn enumerate(
        &self,
        path: &str,
        full_path: &str,
        first_non_empty_only: bool,
    ) -> Result<Option<Vec<EnumeratedFile>>> {
        let item = self.client.get_item(full_path).await?;

        if item.is_file() {
            return Ok(Some(vec![EnumeratedFile::from_item(normalize(path), &item)]));
        }
        if !item.is_directory() {
            return Ok(None);
        }
        let files = self
            .list_recursive(normalize(path), full_path.to_string(), first_non_empty_only)
            .await?;
        Ok(Some(files))
    }

    /// Depth-first walk with folders expanded in place, in remote listing order
    async fn list_recursive(
        &self,
        path: String,
        full_path: String,
        first_non_empty_only: bool,
    ) -> Result<Vec<EnumeratedFile>> {
        let mut files = Vec::new();
        let pager = self.client.list_children(&full_path);
        let mut stack = vec![Frame {
            path,
            full_path,
            pager,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(raw) = frame.pager.next_item().await? else {
                stack.pop();
                continue;
            };
            let child = RemoteItem::new(raw);
            let Some(name) = child.name() else {
                self.logger
                    .debug(format!("Skipping unnamed child of {}", frame.full_path));
                continue;
            };
            let entry_path = child_path(&frame.path, name);
            let entry_full_path = child_path(&frame.full_path, name);

            if child.is_directory() {
                let pager = self.client.list_children(&entry_full_path);
                stack.push(Frame {
                    path: entry_path,
                    full_path: entry_full_path,
                    pager,
                });
                continue;
            }

            files.push(EnumeratedFile::from_item(entry_path, &child));
            if first_non_empty_only {
                return Ok(files);
            }
        }
        Ok(files)
    }

    /// Describe `path` and, for a folder, its direct children
    pub async fn browse(&self, path: &str, full_path: &str) -> Result<BrowseEntry> {
        let item = self.client.get_item(full_path).await?;
        let path = normalize(path);

        if item.is_file() {
            return Ok(BrowseEntry::from_item(path, &item));
        }
        if !item.is_directory() {
            return Ok(BrowseEntry::missing());
        }

        let mut children = Vec::new();
        let mut pager = self.client.list_children(full_path);
        while let Some(raw) = pager.next_item().await? {
            let child = RemoteItem::new(raw);
            match child.name() {
                Some(name) => {
                    children.push(BrowseEntry::from_item(child_path(&path, name), &child))
                }
                None => self
                    .logger
                    .debug(format!("Skipping unnamed child of {}", full_path)),
            }
        }
        Ok(BrowseEntry::folder(path, &item, children))
    }
}

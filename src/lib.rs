//! OneDrive filesystem bridge
//!
//! Exposes a folder of a OneDrive drive (optionally inside a folder shared by another account)
//! as a remote file storage: stat, browse, recursive enumeration, read, write, move and delete.

pub mod config;
pub mod error;
pub mod fs_provider;
pub mod log_appender;
pub mod onedrive_service;
pub mod operations;
pub mod safe_logger;

// Re-export main types
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use fs_provider::metadata::{BrowseEntry, EnumeratedFile, FileStat};
pub use fs_provider::OneDriveFsProvider;
pub use onedrive_service::onedrive_client::OneDriveClient;
pub use safe_logger::SafeLogger;

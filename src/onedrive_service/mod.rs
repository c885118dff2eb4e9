pub mod http_client;
pub mod onedrive_client;
pub mod onedrive_models;
pub mod pager;
pub mod upload_session;

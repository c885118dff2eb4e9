//! Path utilities and retry logic shared by the client and the provider

pub mod path_utils;
pub mod retry;

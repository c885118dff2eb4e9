use crate::error::{BridgeError, Result};
use crate::onedrive_service::http_client::{ApiRequest, GraphTransport};
use crate::onedrive_service::onedrive_models::ChildrenPage;
use crate::safe_logger::SafeLogger;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Lazy, single-pass walker over a paginated listing.
///
/// Follows `@odata.nextLink` until the service stops returning one. A next link equal to the
/// URL that produced it is a cursor loop: the walker fails and yields nothing further.
pub struct ItemPager {
    transport: Arc<dyn GraphTransport>,
    auth_header: String,
    next_url: Option<String>,
    buffer: VecDeque<Value>,
    pages_fetched: usize,
    logger: SafeLogger,
}

impl ItemPager {
    pub fn new(
        transport: Arc<dyn GraphTransport>,
        auth_header: String,
        first_url: String,
        logger: SafeLogger,
    ) -> Self {
        Self {
            transport,
            auth_header,
            next_url: Some(first_url),
            buffer: VecDeque::new(),
            pages_fetched: 0,
            logger,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetch the next page. `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };

        let response = self
            .transport
            .execute(
                ApiRequest::get(url.as_str()).header("Authorization", self.auth_header.as_str()),
            )
            .await?
            .error_for_status("list children")?;
        let page: ChildrenPage = response.json()?;
        self.pages_fetched += 1;

        if page.next_link.as_deref() == Some(url.as_str()) {
            self.buffer.clear();
            self.logger
                .error(format!("Pagination loop detected on {}", url));
            return Err(BridgeError::Protocol(format!(
                "next page link repeats the page it came from: {}",
                url
            )));
        }

        self.logger.debug(format!(
            "Fetched page {} with {} items (more: {})",
            self.pages_fetched,
            page.value.len(),
            page.next_link.is_some()
        ));
        self.next_url = page.next_link;
        Ok(Some(page.value))
    }

    /// Next raw item description, fetching pages as needed
    pub async fn next_item(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(items) => self.buffer.extend(items),
                None => return Ok(None),
            }
        }
    }
}

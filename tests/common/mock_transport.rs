use async_trait::async_trait;
use onedrive_fs_bridge::error::Result;
use onedrive_fs_bridge::onedrive_service::http_client::{ApiRequest, ApiResponse, GraphTransport};
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Scripted Graph endpoint. Each route answers its queued responses in order and keeps
/// repeating the last one; unknown routes answer 404 `itemNotFound`.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, url: &str, response: ApiResponse) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    pub fn on_json(&self, method: Method, url: &str, status: u16, body: Value) -> &Self {
        self.on(method, url, ApiResponse::json_body(status, &body))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn calls_to(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    pub fn requests_with_method(&self, method: Method) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }
}

pub fn item_not_found() -> ApiResponse {
    ApiResponse::json_body(
        404,
        &json!({
            "error": { "code": "itemNotFound", "message": "The resource could not be found." }
        }),
    )
}

#[async_trait]
impl GraphTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let key = (request.method.clone(), request.url.clone());
        self.requests.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(item_not_found))
    }
}

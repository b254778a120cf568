//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Replays queued responses in order and records every request it sees.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    stall: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, status_text: &str, body: &str) -> Self {
        self.responses.lock().push_back(Ok(HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: Vec::new(),
            body: body.to_string(),
        }));
        self
    }

    pub fn fail(self, err: ApiError) -> Self {
        self.responses.lock().push_back(Err(err));
        self
    }

    /// Sleep for `delay` before answering each request.
    pub fn stalled(mut self, delay: Duration) -> Self {
        self.stall = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.stall {
            tokio::time::sleep(delay).await;
        }
        self.responses.lock().pop_front().unwrap_or_else(|| {
            panic!("unexpected request: {:?} {}", request.method, request.path)
        })
    }
}

//! In-memory transport for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::error::TransportError;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

type Handler = Arc<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync>;

struct Route {
    method: String,
    path: String,
    handler: Handler,
}

#[derive(Default)]
struct MockState {
    routes: Vec<Route>,
    requests: Vec<ApiRequest>,
    delay: Option<Duration>,
}

/// Mock transport - answers from registered routes and records every request.
///
/// Routes match on method and path (query excluded). The most recently
/// registered route wins, so tests can change a response mid-test.
/// Unmatched requests get a 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler computing the reply from the request.
    pub fn respond_with<F>(&self, method: &str, path: &str, handler: F)
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        self.state.lock().unwrap().routes.push(Route {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            handler: Arc::new(handler),
        });
    }

    pub fn respond(&self, method: &str, path: &str, response: ApiResponse) {
        self.respond_with(method, path, move |_| Ok(response.clone()));
    }

    pub fn respond_json(&self, method: &str, path: &str, status: u16, body: serde_json::Value) {
        self.respond(method, path, ApiResponse::json(status, &body));
    }

    /// Makes a route fail without a response.
    pub fn fail(&self, method: &str, path: &str, error: TransportError) {
        self.respond_with(method, path, move |_| Err(error.clone()));
    }

    /// Delays every reply, to simulate latency.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Number of requests sent to `method path`.
    pub fn count_for(&self, method: &str, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method.as_str().eq_ignore_ascii_case(method) && r.path == path)
            .count()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let (handler, delay) = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            let handler = state
                .routes
                .iter()
                .rev()
                .find(|r| r.method == request.method.as_str() && r.path == request.path)
                .map(|r| r.handler.clone());
            (handler, state.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match handler {
            Some(handler) => handler(&request),
            None => {
                let message = format!("No mock route for {} {}", request.method, request.path);
                Ok(ApiResponse::json(404, &json!({ "message": message })))
            }
        }
    }
}

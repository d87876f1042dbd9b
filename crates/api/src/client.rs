//! API client shared by every resource service.
//!
//! The client owns the cross-cutting concerns: base URL, timeout, default
//! headers, credential injection and 401 handling. Services build
//! [`ApiRequest`]s and receive typed bodies or a uniform [`ApiError`].

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::{ApiError, Result, TransportError};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};

/// Supplies credentials attached to outgoing requests.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Bearer token for the next request, if any.
    async fn bearer_token(&self) -> Option<String>;
}

/// A fixed bearer token.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl CredentialsProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Hook invoked when the API answers 401. The error still propagates to
/// the caller afterwards.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self, error: &ApiError);
}

/// Default handler: does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUnauthorizedHandler;

impl UnauthorizedHandler for NoopUnauthorizedHandler {
    fn on_unauthorized(&self, _error: &ApiError) {}
}

/// Client for the finance REST API.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    transport: Arc<dyn HttpTransport>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a client that talks to the network through `reqwest`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            credentials: None,
            unauthorized: Arc::new(NoopUnauthorizedHandler),
        }
    }

    pub fn with_credentials(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.unauthorized = handler;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Sends a request and returns the response when it is 2xx.
    ///
    /// The configured timeout bounds the whole exchange regardless of the
    /// transport in use.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        if let Some(provider) = &self.credentials {
            if let Some(token) = provider.bearer_token().await {
                request
                    .headers
                    .push(("Authorization".to_string(), format!("Bearer {}", token)));
            }
        }

        let method = request.method.clone();
        let path = request.path.clone();
        let timeout = self.config.timeout;

        let response = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout { after: timeout }),
        }
        .map_err(|cause| {
            warn!("{} {} failed: {}", method, path, cause);
            ApiError::network(cause)
        })?;

        debug!("{} {} -> {}", method, path, response.status);
        if response.is_success() {
            return Ok(response);
        }

        let error = ApiError::from_response(response.status, &response.body);
        if error.is_unauthorized() {
            self.unauthorized.on_unauthorized(&error);
        }
        Err(error)
    }

    /// Sends a request and decodes the JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        Self::parse_response(response)
    }

    /// Parse a JSON response body. An empty body decodes as JSON `null`.
    fn parse_response<T: DeserializeOwned>(response: ApiResponse) -> Result<T> {
        let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &response.body
        };
        serde_json::from_slice(body).map_err(|e| {
            error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                response.text(),
                e
            );
            ApiError::Decode {
                status: response.status,
                message: e.to_string(),
            }
        })
    }

    fn to_json<B: Serialize>(body: &B) -> Result<serde_json::Value> {
        serde_json::to_value(body)
            .map_err(|e| ApiError::invalid_request(format!("Failed to serialize body: {}", e)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verb helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        self.send_json(ApiRequest::get(path).with_query(query)).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(ApiRequest::post(path).with_json(Self::to_json(body)?))
            .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(ApiRequest::put(path).with_json(Self::to_json(body)?))
            .await
    }

    /// DELETE, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(ApiRequest::delete(path)).await.map(|_| ())
    }
}

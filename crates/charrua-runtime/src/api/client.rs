//! Shared REST client
//!
//! Every service call goes through [`ApiClient`]: it attaches the bearer
//! token, applies the default timeout, maps non-2xx responses to
//! [`ApiError`] and decodes JSON bodies.

use charrua_core::errors::StatusOverrides;
use charrua_core::{ApiConfig, ApiError, ApiResult, ApiTransport, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Cloneable handle to the backend; clones share the bearer token
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    config: Arc<ApiConfig>,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("transport", &self.transport.name())
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.has_token())
            .finish()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn ApiTransport>, config: ApiConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Serialize a request body
    pub fn body<B: Serialize>(value: &B) -> ApiResult<Value> {
        serde_json::to_value(value).map_err(|e| ApiError::Decode {
            reason: format!("cannot encode request body: {}", e),
        })
    }

    /// Execute a request and return the raw successful response
    pub async fn execute(
        &self,
        mut request: HttpRequest,
        overrides: StatusOverrides,
    ) -> ApiResult<HttpResponse> {
        if request.bearer.is_none() {
            request.bearer = self.token();
        }
        if request.timeout.is_none() {
            request.timeout = self.config.request_timeout();
        }

        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "api request");

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(failure) => {
                warn!(%method, %path, error = %failure, "api request failed");
                return Err(failure.into());
            }
        };

        if response.is_success() {
            debug!(%method, %path, status = response.status, "api response");
            return Ok(response);
        }

        let error = ApiError::from_status(response.status, &response.body, overrides);
        warn!(%method, %path, status = response.status, error = %error, "api error response");
        Err(error)
    }

    /// Execute a request and decode the JSON response body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        overrides: StatusOverrides,
    ) -> ApiResult<T> {
        let path = request.path.clone();
        let response = self.execute(request, overrides).await?;
        serde_json::from_str(&response.body).map_err(|e| {
            warn!(%path, error = %e, "cannot decode api response");
            ApiError::Decode {
                reason: format!("{}: {}", path, e),
            }
        })
    }

    /// Execute a request whose response body is ignored
    pub async fn send_empty(&self, request: HttpRequest, overrides: StatusOverrides) -> ApiResult<()> {
        self.execute(request, overrides).await.map(|_| ())
    }
}

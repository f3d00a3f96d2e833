//! reqwest-backed transport

use async_trait::async_trait;
use charrua_core::{
    ApiConfig, ApiTransport, CharruaError, HttpMethod, HttpRequest, HttpResponse, Result,
    TransportFailure,
};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;

/// Talks to the real backend over HTTPS
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CharruaError::config_error(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn classify(error: reqwest::Error, timeout: Option<Duration>) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout {
            after_ms: timeout.map_or(0, |t| t.as_millis() as u64),
        }
    } else if error.is_connect() {
        TransportFailure::Connect(error.to_string())
    } else {
        TransportFailure::Other(error.to_string())
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportFailure> {
        let url = self.url(&request.path);
        let timeout = request.timeout;

        let mut builder = self.client.request(method(request.method), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| classify(e, timeout))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(e, timeout))?;
        debug!(%url, status, "http exchange complete");

        Ok(HttpResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let mut config = ApiConfig::default();
        config.base_url = "http://localhost:8080/api/".to_string();
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(transport.url("/viajes"), "http://localhost:8080/api/viajes");
        assert_eq!(transport.url("viajes"), "http://localhost:8080/api/viajes");
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_failure() {
        let mut config = ApiConfig::default();
        config.base_url = "http://127.0.0.1:9".to_string();
        let transport = ReqwestTransport::new(&config).unwrap();

        let result = transport
            .execute(HttpRequest::get("/localidades").with_timeout(Duration::from_secs(2)))
            .await;

        assert!(matches!(
            result,
            Err(TransportFailure::Connect(_)) | Err(TransportFailure::Timeout { .. })
        ));
    }
}

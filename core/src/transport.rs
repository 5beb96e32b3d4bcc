//! Network execution of `HttpRequest` values.
//!
//! # Design
//! A `Transport` only moves bytes. It returns every HTTP status as an
//! `HttpResponse` and fails only when no response arrived at all; status
//! interpretation belongs to `ApiClient`.

use std::future::Future;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and yields exactly one outcome.
pub trait Transport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}

/// Blocking `ureq` agent driven from Tokio's blocking pool.
///
/// Must be used from inside a Tokio runtime.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    fn execute_blocking(
        agent: &ureq::Agent,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => agent.get(request.url.as_str()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().map_err(TransportError::network)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(TransportError::network)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> {
        let agent = self.agent.clone();
        async move {
            tokio::task::spawn_blocking(move || Self::execute_blocking(&agent, &request))
                .await
                .map_err(TransportError::network)?
        }
    }
}

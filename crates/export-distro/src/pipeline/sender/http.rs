//! REST endpoint sender.

use export_types::{Addressable, Destination};
use reqwest::{Client, Method};
use tracing::debug;

use crate::config::SenderConfig;
use crate::domain::{PipelineError, Stage};

/// Sends each payload as the body of one HTTP request.
#[derive(Debug, Clone)]
pub struct HttpSender {
    client: Client,
    method: Method,
    url: String,
}

impl HttpSender {
    /// Create a sender for the addressable's URL.
    ///
    /// The method defaults to `POST`; `PUT` is also accepted.
    pub fn new(addressable: &Addressable, config: &SenderConfig) -> Result<Self, PipelineError> {
        if addressable.address.is_empty() {
            return Err(misconfigured("REST endpoint has no address".to_string()));
        }

        let method = match addressable.method.to_uppercase().as_str() {
            "" | "POST" => Method::POST,
            "PUT" => Method::PUT,
            other => return Err(misconfigured(format!("unsupported HTTP method {}", other))),
        };

        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| misconfigured(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            method,
            url: addressable.url(),
        })
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one payload. Any non-2xx status is a failure.
    pub async fn send(&self, payload: Vec<u8>) -> Result<(), PipelineError> {
        let bytes = payload.len();
        let response = self
            .client
            .request(self.method.clone(), &self.url)
            .body(payload)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("endpoint returned {}", status)));
        }

        debug!(url = %self.url, bytes, status = %status, "Payload delivered");
        Ok(())
    }
}

fn misconfigured(reason: String) -> PipelineError {
    PipelineError::Misconfigured {
        stage: Stage::Send,
        reason,
    }
}

fn failure(reason: String) -> PipelineError {
    PipelineError::Send {
        destination: Destination::Rest,
        reason,
    }
}

//! HTTP transport backed by reqwest
//!
//! Sends `POST {"query": ...}` and reads the chunked NDJSON body with
//! `Response::chunk`, one network read per pull.

use super::{ByteSource, QueryRequest, QueryTransport};
use crate::{
    config::TransportConfig,
    error::{Error, Result, TransportError, TransportResult},
};
use bytes::Bytes;
use reqwest::header::ACCEPT;

const NDJSON: &str = "application/x-ndjson";

/// reqwest-based [`QueryTransport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport from configuration
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::config(format!("HTTP client: {e}")))?;

        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    /// Use an existing client, e.g. one carrying auth middleware
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Target endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl QueryTransport for HttpTransport {
    type Source = HttpByteSource;

    async fn open(&self, request: &QueryRequest) -> TransportResult<HttpByteSource> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, NDJSON)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint = %self.endpoint, %status, "Backend rejected query");
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(HttpByteSource { response })
    }
}

/// Streaming body of an HTTP response
#[derive(Debug)]
pub struct HttpByteSource {
    response: reqwest::Response,
}

impl ByteSource for HttpByteSource {
    async fn next_chunk(&mut self) -> TransportResult<Option<Bytes>> {
        self.response.chunk().await.map_err(|e| {
            if e.is_body() || e.is_decode() {
                TransportError::PrematureClose(e.to_string())
            } else {
                TransportError::body(e.to_string())
            }
        })
    }
}

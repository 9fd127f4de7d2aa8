//! Turn transports: over HTTP, or straight into the dialogue core

use super::traits::{DialogueTransport, TransportError};
use crate::api::{ErrorResponse, ProcessRequest, ProcessResponse};
use crate::dialogue::{self, DialogueContext};
use async_trait::async_trait;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Posts turns to a running dialogue server
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns a network error if the HTTP client can't be built.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/process", base_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn classify(err: &reqwest::Error) -> TransportError {
    if err.is_decode() {
        TransportError::decode(err.to_string())
    } else {
        TransportError::network(err.to_string())
    }
}

#[async_trait]
impl DialogueTransport for HttpTransport {
    async fn turn(&self, request: &ProcessRequest) -> Result<ProcessResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map_or_else(|_| format!("HTTP {status}"), |body| body.error);
            return Err(if status.is_server_error() {
                TransportError::server(message)
            } else {
                TransportError::protocol(message)
            });
        }

        response
            .json::<ProcessResponse>()
            .await
            .map_err(|e| classify(&e))
    }
}

/// Runs the dialogue core in-process
#[derive(Debug, Default)]
pub struct LocalTransport {
    context: DialogueContext,
}

impl LocalTransport {
    #[must_use]
    pub fn new(context: DialogueContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DialogueTransport for LocalTransport {
    async fn turn(&self, request: &ProcessRequest) -> Result<ProcessResponse, TransportError> {
        let session = request
            .session()
            .map_err(|e| TransportError::protocol(e.to_string()))?;
        let (next, reply) = dialogue::advance(&session, &request.input, &self.context).into_session();
        Ok(ProcessResponse::new(next, reply))
    }
}

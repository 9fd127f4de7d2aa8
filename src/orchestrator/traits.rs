//! Trait abstractions for the call's I/O collaborators
//!
//! These traits enable testing the orchestrator with mock implementations.

use crate::api::{ProcessRequest, ProcessResponse};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// What the speech recognizer reports while listening
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A finalized utterance
    Utterance(String),
    Error(CaptureErrorKind),
    /// Recognition stopped on its own
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureErrorKind {
    NoSpeech,
    Network,
    Other,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Speech capture unavailable: {0}")]
    Unavailable(String),
}

/// Error classification for a failed turn round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection failures, timeouts - retryable
    Network,
    /// Server error (5xx) - retryable
    Server,
    /// Request rejected by the dialogue manager - not retryable
    Protocol,
    /// Response body could not be decoded
    Decode,
}

impl TransportErrorKind {
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Server, message)
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Protocol, message)
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }
}

/// Continuous speech recognition
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    /// Begin listening; events arrive on the orchestrator's channel
    async fn start(&self) -> Result<(), CaptureError>;

    async fn stop(&self);
}

/// Text-to-speech playback, fire-and-forget
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str);
}

/// Carries one turn to the dialogue manager and back
#[async_trait]
pub trait DialogueTransport: Send + Sync {
    async fn turn(&self, request: &ProcessRequest) -> Result<ProcessResponse, TransportError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SpeechCapture + ?Sized> SpeechCapture for Arc<T> {
    async fn start(&self) -> Result<(), CaptureError> {
        (**self).start().await
    }

    async fn stop(&self) {
        (**self).stop().await;
    }
}

impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Arc<T> {
    fn speak(&self, text: &str) {
        (**self).speak(text);
    }
}

#[async_trait]
impl<T: DialogueTransport + ?Sized> DialogueTransport for Arc<T> {
    async fn turn(&self, request: &ProcessRequest) -> Result<ProcessResponse, TransportError> {
        (**self).turn(request).await
    }
}

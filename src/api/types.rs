//! Wire types for the turn-taking protocol
//!
//! Shared by the server handlers and the HTTP transport so both sides agree
//! on field names.

use crate::dialogue::{AppointmentData, ConversationState, ProtocolError, Session};
use serde::{Deserialize, Serialize};

/// One turn: the caller's utterance plus the session as last returned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub input: String,
    /// Kept as text so unknown states can be reported instead of rejected
    /// by the JSON extractor
    pub state: String,
    #[serde(rename = "userData", default)]
    pub user_data: Option<AppointmentData>,
}

impl ProcessRequest {
    #[must_use]
    pub fn new(input: impl Into<String>, session: &Session) -> Self {
        Self {
            input: input.into(),
            state: session.state.as_str().to_string(),
            user_data: Some(session.data.clone()),
        }
    }

    /// Validate the round-tripped session
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::UnknownState` if `state` is not one of the
    /// five wire names.
    pub fn session(&self) -> Result<Session, ProtocolError> {
        let state = self.state.parse::<ConversationState>()?;
        Ok(Session::new(state, self.user_data.clone().unwrap_or_default()))
    }
}

/// Result of a turn: the session to send back next time and what to say
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub state: ConversationState,
    #[serde(rename = "userData")]
    pub user_data: AppointmentData,
    pub response: String,
}

impl ProcessResponse {
    #[must_use]
    pub fn new(session: Session, response: impl Into<String>) -> Self {
        Self {
            state: session.state,
            user_data: session.data,
            response: response.into(),
        }
    }

    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.state, self.user_data.clone())
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

//! Dialogue session manager
//!
//! A pure state machine: one caller utterance in, next state, updated
//! appointment data and a reply out. The session is passed in and handed
//! back on every turn; nothing is kept between turns.

pub mod departments;
pub mod hospital;
pub mod state;
mod transition;


pub use departments::{DepartmentTable, TableError};
pub use state::{AppointmentData, AppointmentSummary, ConversationState, Session, Slot};
pub use transition::{advance, reset, DialogueContext, TurnResult, OPENING_PROMPT};

use thiserror::Error;

/// A turn request the manager refuses to guess about
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown conversation state: {0:?}")]
    UnknownState(String),
    #[error("Malformed turn request: {0}")]
    MalformedUserData(String),
}

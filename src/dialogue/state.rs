//! Conversation state types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ProtocolError;

// ============================================================================
// Conversation State
// ============================================================================

/// Where the call currently is in the booking flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Call just started, nothing collected yet
    #[default]
    Greeting,
    CollectSymptoms,
    CollectName,
    CollectTime,
    /// All slots collected; stays here until the call is reset
    Confirmation,
}

impl ConversationState {
    pub const ALL: [ConversationState; 5] = [
        ConversationState::Greeting,
        ConversationState::CollectSymptoms,
        ConversationState::CollectName,
        ConversationState::CollectTime,
        ConversationState::Confirmation,
    ];

    /// Wire name of the state
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationState::Greeting => "greeting",
            ConversationState::CollectSymptoms => "collect_symptoms",
            ConversationState::CollectName => "collect_name",
            ConversationState::CollectTime => "collect_time",
            ConversationState::Confirmation => "confirmation",
        }
    }

    /// The state that follows this one in the normal flow
    #[must_use]
    pub fn successor(self) -> ConversationState {
        match self {
            ConversationState::Greeting => ConversationState::CollectSymptoms,
            ConversationState::CollectSymptoms => ConversationState::CollectName,
            ConversationState::CollectName => ConversationState::CollectTime,
            ConversationState::CollectTime | ConversationState::Confirmation => {
                ConversationState::Confirmation
            }
        }
    }

    /// The slot this state fills, if any
    #[must_use]
    pub fn slot(self) -> Option<Slot> {
        match self {
            ConversationState::CollectSymptoms => Some(Slot::Symptoms),
            ConversationState::CollectName => Some(Slot::CallerName),
            ConversationState::CollectTime => Some(Slot::RequestedTime),
            ConversationState::Greeting | ConversationState::Confirmation => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ConversationState::Confirmation)
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationState {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConversationState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownState(s.to_string()))
    }
}

// ============================================================================
// Appointment Data
// ============================================================================

/// A single field of the appointment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Symptoms, together with the department derived from them
    Symptoms,
    CallerName,
    RequestedTime,
}

/// Appointment data accumulated over the call.
///
/// Every field is either empty (not collected yet) or the trimmed text the
/// caller gave for it. Field names on the wire are kept short for the
/// browser/speech front-ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentData {
    #[serde(default)]
    pub symptoms: String,
    #[serde(default, rename = "name")]
    pub caller_name: String,
    #[serde(default, rename = "time")]
    pub requested_time: String,
    #[serde(default)]
    pub department: String,
}

/// Everything the confirmation view needs, only available once complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentSummary {
    pub name: String,
    pub department: String,
    pub time: String,
}

impl AppointmentData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
            && self.caller_name.is_empty()
            && self.requested_time.is_empty()
            && self.department.is_empty()
    }

    /// Name, department and time, if all three have been collected
    #[must_use]
    pub fn summary(&self) -> Option<AppointmentSummary> {
        if self.caller_name.is_empty()
            || self.department.is_empty()
            || self.requested_time.is_empty()
        {
            return None;
        }
        Some(AppointmentSummary {
            name: self.caller_name.clone(),
            department: self.department.clone(),
            time: self.requested_time.clone(),
        })
    }
}

// ============================================================================
// Session
// ============================================================================

/// One in-progress call: the state plus the data collected so far.
///
/// The server never stores this; it travels with every request and
/// response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: ConversationState,
    #[serde(rename = "userData")]
    pub data: AppointmentData,
}

impl Session {
    #[must_use]
    pub fn new(state: ConversationState, data: AppointmentData) -> Self {
        Self { state, data }
    }
}

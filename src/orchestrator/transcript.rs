//! Call transcript for display

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Caller,
    Receptionist,
}

impl Speaker {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Speaker::Caller => "You",
            Speaker::Receptionist => "AI Receptionist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnEntry {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for TurnEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.timestamp.with_timezone(&Local);
        write!(
            f,
            "[{}] {}: {}",
            local.format("%H:%M:%S"),
            self.speaker.label(),
            self.text
        )
    }
}

/// Ordered record of who said what
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    entries: Vec<TurnEntry>,
}

impl Transcript {
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) -> &TurnEntry {
        self.entries.push(TurnEntry {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    #[must_use]
    pub fn entries(&self) -> &[TurnEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! Voice receptionist
//!
//! A booking dialogue for a hospital phone line. The dialogue core is a pure
//! state machine; the HTTP API and the call orchestrator are thin layers
//! around it.

pub mod api;
pub mod config;
pub mod dialogue;
pub mod orchestrator;

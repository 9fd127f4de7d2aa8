//! HTTP surface of the dialogue manager
//!
//! Stateless: every request carries the whole session and every response
//! hands it back.

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::dialogue::DialogueContext;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<DialogueContext>,
}

impl AppState {
    #[must_use]
    pub fn new(context: DialogueContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }
}

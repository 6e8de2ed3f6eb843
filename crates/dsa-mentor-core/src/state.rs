//! UI-agnostic query state
//!
//! The dispatcher owns this value; views only read it through
//! [`crate::QueryDispatcher::state`].

use serde::{Deserialize, Serialize};

/// Shown in place of an answer whenever a request fails, whatever the cause.
pub const ERROR_MESSAGE: &str = "Error fetching response. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    /// Text currently in the input field
    pub query: String,
    /// Markdown answer from the last applied response (or the error message)
    pub answer: String,
    pub loading: bool,
    /// Set on the first submitted query, reset only by an explicit clear
    pub has_interacted: bool,
}

impl QueryState {
    /// True when the input holds something worth clearing.
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.query.clear();
        self.answer.clear();
        self.loading = false;
        self.has_interacted = false;
    }
}

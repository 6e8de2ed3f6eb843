pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod state;
pub mod suggestions;

// Re-export main types for convenience
pub use client::{AnswerSource, AskClient};
pub use config::Config;
pub use dispatcher::{DispatchEvent, DispatchReceiver, QueryDispatcher};
pub use error::AskError;
pub use state::{QueryState, ERROR_MESSAGE};
pub use suggestions::{Suggestion, SUGGESTIONS};

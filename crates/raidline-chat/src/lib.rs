//! Conversational interface for RAID registers.
//!
//! A [`ChatSession`] owns one project's transcript and its single active
//! conversation, and turns each incoming message into assistant replies.

pub mod error;
pub mod session;

pub use error::ChatError;
pub use session::ChatSession;

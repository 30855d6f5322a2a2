//! Conversational command interpreter for RAID registers.
//!
//! Classifies free-text chat messages into commands, collects missing
//! fields through a slot-filling dialogue, and executes the finished
//! command against an item-management API.

pub mod api;
pub mod dialogue;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod types;

pub use api::{ApiResponse, InMemoryItemApi, ItemApi};
pub use dialogue::{
    is_executable, progress, ConversationState, CreateItemState, DialogueEngine, DialogueStart,
    DialogueStep, EditItemState, FlowTable,
};
pub use error::{ApiError, GatewayError, StepError};
pub use gateway::{
    format_upstream_error, ExecutionData, ExecutionGateway, ExecutionOutcome, ItemDefaults,
};
pub use intent::{classify, IntentClassifier, PatternClassifier};
pub use types::{CommandKind, Field, Intent, IntentParams, Progress};

//! Core types for the command interpreter.
//!
//! Defines classified intents, the fields a dialogue can collect, and
//! dialogue progress.

use raidline_core::types::{ItemStatus, ItemType, Priority};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enums
// =============================================================================

/// Commands the interpreter can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    CreateItem,
    EditItem,
    ListItems,
    TransitionWorkflow,
    Unknown,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::CreateItem => write!(f, "create_item"),
            CommandKind::EditItem => write!(f, "edit_item"),
            CommandKind::ListItems => write!(f, "list_items"),
            CommandKind::TransitionWorkflow => write!(f, "transition_workflow"),
            CommandKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A slot a dialogue step fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ItemType,
    ItemId,
    Title,
    Description,
    Status,
    Priority,
    Owner,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::ItemType => write!(f, "type"),
            Field::ItemId => write!(f, "item id"),
            Field::Title => write!(f, "title"),
            Field::Description => write!(f, "description"),
            Field::Status => write!(f, "status"),
            Field::Priority => write!(f, "priority"),
            Field::Owner => write!(f, "owner"),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// Entities extracted from a message while classifying it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentParams {
    pub item_type: Option<ItemType>,
    /// Upper-cased id such as `R-12` or `RAID-7`.
    pub item_id: Option<String>,
    /// Target workflow state, verbatim from the message.
    pub target_state: Option<String>,
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<ItemStatus>,
}

/// The classified purpose of one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: CommandKind,
    /// In `[0, 1]`; zero for `Unknown`.
    pub confidence: f32,
    pub params: IntentParams,
    pub original_text: String,
}

impl Intent {
    pub fn unknown(text: &str) -> Self {
        Self {
            kind: CommandKind::Unknown,
            confidence: 0.0,
            params: IntentParams::default(),
            original_text: text.to_string(),
        }
    }
}

/// Position within a dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

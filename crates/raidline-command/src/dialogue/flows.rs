//! Declarative dialogue flows.
//!
//! Each command kind with a multi-turn flow maps to an ordered list of
//! [`DialogueStep`]s. The engine walks the list, skipping fields the
//! classifier already supplied.

use std::collections::HashMap;

use raidline_core::types::{ItemStatus, Priority};

use crate::intent::entities;
use crate::types::{CommandKind, Field};

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Checks a trimmed, non-empty reply. `Err` carries the message shown to the user.
pub type Validator = fn(&str) -> Result<(), String>;

/// One data-collection step of a dialogue.
#[derive(Debug, Clone, Copy)]
pub struct DialogueStep {
    pub field: Field,
    pub prompt: &'static str,
    pub required: bool,
    pub validate: Option<Validator>,
}

// =============================================================================
// Validators
// =============================================================================

pub fn validate_item_type(raw: &str) -> Result<(), String> {
    match entities::lookup_item_type(raw) {
        Some(_) => Ok(()),
        None => Err(format!(
            "\"{}\" is not a RAID type. Please answer risk, assumption, issue or dependency.",
            raw
        )),
    }
}

pub fn validate_item_id(raw: &str) -> Result<(), String> {
    match entities::parse_item_id(raw) {
        Some(_) => Ok(()),
        None => Err(format!(
            "\"{}\" doesn't look like an item id. Ids look like R-12 or RAID-7.",
            raw
        )),
    }
}

pub fn validate_title(raw: &str) -> Result<(), String> {
    let len = raw.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(format!(
            "Titles must be {} characters or fewer (this one has {}).",
            MAX_TITLE_LENGTH, len
        ));
    }
    Ok(())
}

pub fn validate_priority(raw: &str) -> Result<(), String> {
    raw.parse::<Priority>()
        .map(|_| ())
        .map_err(|_| "Priority must be low, medium, high or critical.".to_string())
}

pub fn validate_status(raw: &str) -> Result<(), String> {
    raw.parse::<ItemStatus>()
        .map(|_| ())
        .map_err(|_| "Status must be open, in progress, resolved or closed.".to_string())
}

// =============================================================================
// Standard flows
// =============================================================================

const CREATE_ITEM_FLOW: &[DialogueStep] = &[
    DialogueStep {
        field: Field::ItemType,
        prompt: "What kind of item is this: risk, assumption, issue or dependency?",
        required: true,
        validate: Some(validate_item_type),
    },
    DialogueStep {
        field: Field::Title,
        prompt: "What's the title?",
        required: true,
        validate: Some(validate_title),
    },
    DialogueStep {
        field: Field::Description,
        prompt: "Please describe it.",
        required: true,
        validate: None,
    },
    DialogueStep {
        field: Field::Priority,
        prompt: "What priority: low, medium, high or critical? (or \"skip\" for the default)",
        required: false,
        validate: Some(validate_priority),
    },
    DialogueStep {
        field: Field::Owner,
        prompt: "Who owns it? (or \"skip\")",
        required: false,
        validate: None,
    },
];

const EDIT_ITEM_FLOW: &[DialogueStep] = &[
    DialogueStep {
        field: Field::ItemId,
        prompt: "Which item should I update? (for example R-12)",
        required: true,
        validate: Some(validate_item_id),
    },
    DialogueStep {
        field: Field::Title,
        prompt: "New title? (or \"skip\" to keep the current one)",
        required: false,
        validate: Some(validate_title),
    },
    DialogueStep {
        field: Field::Description,
        prompt: "New description? (or \"skip\" to keep the current one)",
        required: false,
        validate: None,
    },
    DialogueStep {
        field: Field::Status,
        prompt: "New status: open, in progress, resolved or closed? (or \"skip\")",
        required: false,
        validate: Some(validate_status),
    },
    DialogueStep {
        field: Field::Priority,
        prompt: "New priority: low, medium, high or critical? (or \"skip\")",
        required: false,
        validate: Some(validate_priority),
    },
    DialogueStep {
        field: Field::Owner,
        prompt: "New owner? (or \"skip\")",
        required: false,
        validate: None,
    },
];

/// Dialogue flows keyed by command kind.
#[derive(Debug, Clone)]
pub struct FlowTable {
    flows: HashMap<CommandKind, Vec<DialogueStep>>,
}

impl Default for FlowTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl FlowTable {
    /// A table with no flows.
    pub fn empty() -> Self {
        Self {
            flows: HashMap::new(),
        }
    }

    /// The create and edit flows.
    pub fn standard() -> Self {
        Self::empty()
            .with_flow(CommandKind::CreateItem, CREATE_ITEM_FLOW.to_vec())
            .with_flow(CommandKind::EditItem, EDIT_ITEM_FLOW.to_vec())
    }

    /// Register or replace the flow for a command kind.
    pub fn with_flow(mut self, kind: CommandKind, steps: Vec<DialogueStep>) -> Self {
        self.flows.insert(kind, steps);
        self
    }

    pub fn get(&self, kind: CommandKind) -> Option<&[DialogueStep]> {
        self.flows.get(&kind).map(Vec::as_slice)
    }
}

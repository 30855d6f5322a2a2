//! Conversation state for in-progress commands.

use raidline_core::types::{ItemFields, ItemType};

use crate::dialogue::flows::DialogueStep;
use crate::intent::entities;
use crate::types::{CommandKind, Field};

/// An in-progress "create item" dialogue.
#[derive(Debug, Clone)]
pub struct CreateItemState {
    pub project_key: String,
    /// Fields gathered so far; `collected.item_type` is the item's type.
    pub collected: ItemFields,
    pub steps: Vec<DialogueStep>,
    pub cursor: usize,
}

/// An in-progress "edit item" dialogue.
#[derive(Debug, Clone)]
pub struct EditItemState {
    pub project_key: String,
    /// Empty until resolved by the classifier or the id step.
    pub item_id: String,
    /// Inferred from the id prefix or the message, if any.
    pub item_type: Option<ItemType>,
    pub updates: ItemFields,
    pub steps: Vec<DialogueStep>,
    pub cursor: usize,
}

/// The single active conversation of a chat session.
///
/// Invariant: `cursor <= steps.len()`; the conversation is complete when
/// they are equal.
#[derive(Debug, Clone)]
pub enum ConversationState {
    CreateItem(CreateItemState),
    EditItem(EditItemState),
}

impl ConversationState {
    pub fn kind(&self) -> CommandKind {
        match self {
            ConversationState::CreateItem(_) => CommandKind::CreateItem,
            ConversationState::EditItem(_) => CommandKind::EditItem,
        }
    }

    pub fn project_key(&self) -> &str {
        match self {
            ConversationState::CreateItem(s) => &s.project_key,
            ConversationState::EditItem(s) => &s.project_key,
        }
    }

    pub fn steps(&self) -> &[DialogueStep] {
        match self {
            ConversationState::CreateItem(s) => &s.steps,
            ConversationState::EditItem(s) => &s.steps,
        }
    }

    pub fn cursor(&self) -> usize {
        match self {
            ConversationState::CreateItem(s) => s.cursor,
            ConversationState::EditItem(s) => s.cursor,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor() >= self.steps().len()
    }

    /// The step awaiting a reply, or `None` once complete.
    pub fn current_step(&self) -> Option<&DialogueStep> {
        self.steps().get(self.cursor())
    }

    pub fn current_prompt(&self) -> Option<&'static str> {
        self.current_step().map(|s| s.prompt)
    }

    pub(crate) fn advance_cursor(&mut self) {
        let cursor = match self {
            ConversationState::CreateItem(s) => &mut s.cursor,
            ConversationState::EditItem(s) => &mut s.cursor,
        };
        *cursor += 1;
    }

    /// Parse `raw` for `field` and store it. Nothing is written on error.
    pub(crate) fn store(&mut self, field: Field, raw: &str) -> Result<(), String> {
        match self {
            ConversationState::CreateItem(s) => apply_field(&mut s.collected, field, raw),
            ConversationState::EditItem(s) => {
                if field == Field::ItemId {
                    let id = entities::parse_item_id(raw)
                        .ok_or_else(|| format!("\"{}\" is not an item id.", raw))?;
                    // A single-letter prefix names the type; `RAID-n` keeps any guess.
                    if let Some(prefixed) = id.split('-').next().and_then(ItemType::from_prefix) {
                        s.item_type = Some(prefixed);
                    }
                    s.item_id = id;
                    Ok(())
                } else {
                    apply_field(&mut s.updates, field, raw)
                }
            }
        }
    }
}

/// Coerce a reply into the typed field.
fn apply_field(fields: &mut ItemFields, field: Field, raw: &str) -> Result<(), String> {
    match field {
        Field::ItemType => {
            fields.item_type = Some(
                entities::lookup_item_type(raw)
                    .ok_or_else(|| format!("Unknown item type: {}", raw))?,
            );
        }
        Field::Title => fields.title = Some(raw.to_string()),
        Field::Description => fields.description = Some(raw.to_string()),
        Field::Status => fields.status = Some(raw.parse()?),
        Field::Priority => fields.priority = Some(raw.parse()?),
        Field::Owner => fields.owner = Some(raw.to_string()),
        Field::ItemId => {
            return Err("An item id cannot be stored on a new item.".to_string());
        }
    }
    Ok(())
}

/// Whether `fields` already holds a value for `field`.
pub(crate) fn has_field(fields: &ItemFields, field: Field) -> bool {
    match field {
        Field::ItemType => fields.item_type.is_some(),
        Field::Title => fields.title.is_some(),
        Field::Description => fields.description.is_some(),
        Field::Status => fields.status.is_some(),
        Field::Priority => fields.priority.is_some(),
        Field::Owner => fields.owner.is_some(),
        Field::ItemId => false,
    }
}

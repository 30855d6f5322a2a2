//! Execution gateway.
//!
//! Turns a finished conversation, or a dialogue-free command, into exactly
//! one item API call and a chat message describing the result. Business
//! failures come back as an unsuccessful [`ExecutionOutcome`]; only a
//! transport fault escapes as [`GatewayError`].

use std::sync::Arc;

use raidline_core::config::ItemDefaultsConfig;
use raidline_core::types::{
    ChatMessage, ItemStatus, ItemType, NewItem, Priority, RaidItem, WorkflowStatus,
};

use crate::api::ItemApi;
use crate::dialogue::{ConversationState, CreateItemState, EditItemState};
use crate::error::GatewayError;

/// Prefix marking assistant messages that report an unexpected failure.
pub const FAILURE_MARKER: &str = "⚠";

/// Values applied to optional fields left unset on a new item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemDefaults {
    pub status: ItemStatus,
    pub priority: Priority,
}

impl From<&ItemDefaultsConfig> for ItemDefaults {
    fn from(config: &ItemDefaultsConfig) -> Self {
        Self {
            status: config.status,
            priority: config.priority,
        }
    }
}

/// Payload returned by a successful execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionData {
    Item(RaidItem),
    Items(Vec<RaidItem>),
    Workflow(WorkflowStatus),
}

/// Result of executing one command.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub success: bool,
    /// Assistant message to show the user.
    pub message: ChatMessage,
    pub data: Option<ExecutionData>,
    /// Machine-readable failure text for programmatic callers.
    pub error: Option<String>,
}

impl ExecutionOutcome {
    fn succeeded(text: impl Into<String>, data: ExecutionData) -> Self {
        Self {
            success: true,
            message: ChatMessage::assistant(text),
            data: Some(data),
            error: None,
        }
    }

    fn failed(text: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: ChatMessage::assistant(text),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Executes commands against an [`ItemApi`].
pub struct ExecutionGateway {
    api: Arc<dyn ItemApi>,
    defaults: ItemDefaults,
}

impl ExecutionGateway {
    pub fn new(api: Arc<dyn ItemApi>, defaults: ItemDefaults) -> Self {
        Self { api, defaults }
    }

    pub fn defaults(&self) -> ItemDefaults {
        self.defaults
    }

    /// Execute a conversation. Preconditions are checked here again even if
    /// the caller already consulted `is_executable`.
    pub async fn execute(
        &self,
        state: &ConversationState,
    ) -> Result<ExecutionOutcome, GatewayError> {
        if !state.is_complete() {
            return Ok(ExecutionOutcome::failed(
                "I can't do that yet: this conversation is not complete.",
                "Incomplete conversation",
            ));
        }

        match state {
            ConversationState::CreateItem(s) => self.create_item(s).await,
            ConversationState::EditItem(s) => self.edit_item(s).await,
        }
    }

    async fn create_item(&self, state: &CreateItemState) -> Result<ExecutionOutcome, GatewayError> {
        let collected = &state.collected;
        let (Some(item_type), Some(title), Some(description)) = (
            collected.item_type,
            collected.title.as_deref().filter(|t| !t.trim().is_empty()),
            collected
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty()),
        ) else {
            return Ok(ExecutionOutcome::failed(
                "I can't create this item: missing required fields (type, title and description).",
                "Missing required fields",
            ));
        };

        let item = NewItem {
            item_type,
            title: title.to_string(),
            description: description.to_string(),
            status: collected.status.unwrap_or(self.defaults.status),
            priority: collected.priority.unwrap_or(self.defaults.priority),
            owner: collected.owner.clone(),
        };

        let response = self.api.create(&state.project_key, &item).await?;
        match (response.success, response.data) {
            (true, Some(created)) => {
                tracing::info!(
                    project_key = %state.project_key,
                    item_id = %created.id,
                    item_type = %item_type,
                    "Item created"
                );
                let text = format!("Created {} {}: {}", item_type, created.id, created.title);
                Ok(ExecutionOutcome::succeeded(text, ExecutionData::Item(created)))
            }
            (true, None) => {
                tracing::info!(
                    project_key = %state.project_key,
                    item_type = %item_type,
                    "Item created without a returned record"
                );
                Ok(ExecutionOutcome {
                    success: true,
                    message: ChatMessage::assistant(format!("Created {}: {}", item_type, title)),
                    data: None,
                    error: None,
                })
            }
            (false, _) => {
                let error = failure_text(response.error);
                tracing::warn!(project_key = %state.project_key, %error, "Item creation failed");
                Ok(ExecutionOutcome::failed(
                    format!("Failed to create {}: {}", item_type, error),
                    error,
                ))
            }
        }
    }

    async fn edit_item(&self, state: &EditItemState) -> Result<ExecutionOutcome, GatewayError> {
        let item_id = state.item_id.trim();
        if item_id.is_empty() {
            return Ok(ExecutionOutcome::failed(
                "I can't update this item: no item id was provided.",
                "Missing item ID",
            ));
        }
        if state.updates.is_empty() {
            return Ok(ExecutionOutcome::failed(
                format!("Nothing to update on {}: no changes were provided.", item_id),
                "No updates provided",
            ));
        }

        let response = self
            .api
            .update(&state.project_key, item_id, &state.updates)
            .await?;

        match (response.success, response.data) {
            (true, Some(updated)) => {
                let label = type_label(state.item_type.or(Some(updated.item_type)));
                tracing::info!(
                    project_key = %state.project_key,
                    item_id,
                    fields = state.updates.len(),
                    "Item updated"
                );
                let text = format!("Updated {} {}", label, item_id);
                Ok(ExecutionOutcome::succeeded(text, ExecutionData::Item(updated)))
            }
            (true, None) => {
                let text = format!("Updated {} {}", type_label(state.item_type), item_id);
                Ok(ExecutionOutcome {
                    success: true,
                    message: ChatMessage::assistant(text),
                    data: None,
                    error: None,
                })
            }
            (false, _) => {
                let error = failure_text(response.error);
                tracing::warn!(project_key = %state.project_key, item_id, %error, "Item update failed");
                Ok(ExecutionOutcome::failed(
                    format!(
                        "Failed to update {} {}: {}",
                        type_label(state.item_type),
                        item_id,
                        error
                    ),
                    error,
                ))
            }
        }
    }

    /// List the project's items, optionally of one type.
    pub async fn list_items(
        &self,
        project_key: &str,
        item_type: Option<ItemType>,
    ) -> Result<ExecutionOutcome, GatewayError> {
        let noun = item_type.map(|t| t.plural()).unwrap_or("items");
        let response = self.api.list(project_key, item_type).await?;

        if !response.success {
            let error = failure_text(response.error);
            tracing::warn!(project_key, %error, "Listing items failed");
            return Ok(ExecutionOutcome::failed(
                format!("Failed to list {}: {}", noun, error),
                error,
            ));
        }

        let items = response.data.unwrap_or_default();
        tracing::debug!(project_key, count = items.len(), "Items listed");
        let text = render_list(project_key, noun, &items);
        Ok(ExecutionOutcome::succeeded(text, ExecutionData::Items(items)))
    }

    /// Move the project's workflow to `target_state`.
    pub async fn transition_workflow(
        &self,
        project_key: &str,
        target_state: &str,
    ) -> Result<ExecutionOutcome, GatewayError> {
        let target_state = target_state.trim();
        if target_state.is_empty() {
            return Ok(ExecutionOutcome::failed(
                "Which state should the workflow move to? Try \"transition to Approved\".",
                "Missing target state",
            ));
        }

        let response = self.api.transition(project_key, target_state).await?;
        match (response.success, response.data) {
            (true, data) => {
                tracing::info!(project_key, target_state, "Workflow transitioned");
                let status = data.unwrap_or_else(|| WorkflowStatus {
                    project_key: project_key.to_string(),
                    state: target_state.to_string(),
                    previous_state: None,
                });
                let text = match &status.previous_state {
                    Some(previous) => format!(
                        "Moved {} from {} to {}",
                        project_key, previous, status.state
                    ),
                    None => format!("Moved {} to {}", project_key, status.state),
                };
                Ok(ExecutionOutcome::succeeded(text, ExecutionData::Workflow(status)))
            }
            (false, _) => {
                let error = failure_text(response.error);
                tracing::warn!(project_key, target_state, %error, "Workflow transition failed");
                Ok(ExecutionOutcome::failed(
                    format!("Failed to transition {} to {}: {}", project_key, target_state, error),
                    error,
                ))
            }
        }
    }
}

/// Assistant message for a failure outside the structured execution paths.
pub fn format_upstream_error(text: &str) -> ChatMessage {
    ChatMessage::assistant(format!("{} Something went wrong: {}", FAILURE_MARKER, text))
}

fn failure_text(error: Option<String>) -> String {
    error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "unknown error".to_string())
}

fn type_label(item_type: Option<ItemType>) -> String {
    item_type
        .map(|t| t.to_string())
        .unwrap_or_else(|| "item".to_string())
}

fn render_list(project_key: &str, noun: &str, items: &[RaidItem]) -> String {
    if items.is_empty() {
        return format!("No {} found in {}.", noun, project_key);
    }
    let mut text = format!("{} {} in {}:", items.len(), noun, project_key);
    for item in items {
        text.push_str(&format!(
            "\n- {} [{}/{}] {}",
            item.id, item.status, item.priority, item.title
        ));
        if let Some(owner) = &item.owner {
            text.push_str(&format!(" ({})", owner));
        }
    }
    text
}

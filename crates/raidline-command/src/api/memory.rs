//! In-memory item store.
//!
//! Backs the offline mode of the terminal binary and the tests. Ids are
//! allocated per project and type: `R-1`, `R-2`, `A-1`, ...

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use raidline_core::types::{ItemFields, ItemType, NewItem, RaidItem, WorkflowStatus};

use crate::api::{ApiResponse, ItemApi};
use crate::error::ApiError;

#[derive(Default)]
struct Store {
    items: Vec<RaidItem>,
    next_ids: HashMap<(String, ItemType), u64>,
    workflow: HashMap<String, String>,
}

/// Mutex-guarded [`ItemApi`] that keeps everything in process memory.
#[derive(Default)]
pub struct InMemoryItemApi {
    store: Mutex<Store>,
}

impl InMemoryItemApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items across all projects.
    pub fn len(&self) -> usize {
        self.store.lock().map(|s| s.items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, ApiError> {
        self.store
            .lock()
            .map_err(|e| ApiError::Transport(format!("Lock poisoned: {}", e)))
    }
}

#[async_trait]
impl ItemApi for InMemoryItemApi {
    async fn create(
        &self,
        project_key: &str,
        item: &NewItem,
    ) -> Result<ApiResponse<RaidItem>, ApiError> {
        if item.title.trim().is_empty() {
            return Ok(ApiResponse::failed("Title is required"));
        }

        let mut store = self.lock()?;
        let counter = store
            .next_ids
            .entry((project_key.to_string(), item.item_type))
            .or_insert(0);
        *counter += 1;
        let id = format!("{}-{}", item.item_type.prefix(), counter);

        let now = Utc::now();
        let created = RaidItem {
            id,
            project_key: project_key.to_string(),
            item_type: item.item_type,
            title: item.title.clone(),
            description: item.description.clone(),
            status: item.status,
            priority: item.priority,
            owner: item.owner.clone(),
            created_at: now,
            updated_at: now,
        };
        store.items.push(created.clone());

        tracing::debug!(project_key, item_id = %created.id, "Item stored");
        Ok(ApiResponse::ok(created))
    }

    async fn update(
        &self,
        project_key: &str,
        item_id: &str,
        updates: &ItemFields,
    ) -> Result<ApiResponse<RaidItem>, ApiError> {
        let mut store = self.lock()?;
        let Some(item) = store
            .items
            .iter_mut()
            .find(|i| i.project_key == project_key && i.id.eq_ignore_ascii_case(item_id))
        else {
            return Ok(ApiResponse::failed(format!("Item {} not found", item_id)));
        };

        if let Some(title) = &updates.title {
            item.title = title.clone();
        }
        if let Some(description) = &updates.description {
            item.description = description.clone();
        }
        if let Some(status) = updates.status {
            item.status = status;
        }
        if let Some(priority) = updates.priority {
            item.priority = priority;
        }
        if let Some(owner) = &updates.owner {
            item.owner = Some(owner.clone());
        }
        item.updated_at = Utc::now();

        Ok(ApiResponse::ok(item.clone()))
    }

    async fn list(
        &self,
        project_key: &str,
        item_type: Option<ItemType>,
    ) -> Result<ApiResponse<Vec<RaidItem>>, ApiError> {
        let store = self.lock()?;
        let items = store
            .items
            .iter()
            .filter(|i| i.project_key == project_key)
            .filter(|i| item_type.map_or(true, |t| i.item_type == t))
            .cloned()
            .collect();
        Ok(ApiResponse::ok(items))
    }

    async fn transition(
        &self,
        project_key: &str,
        target_state: &str,
    ) -> Result<ApiResponse<WorkflowStatus>, ApiError> {
        if target_state.trim().is_empty() {
            return Ok(ApiResponse::failed("Target state is required"));
        }

        let mut store = self.lock()?;
        let previous_state = store
            .workflow
            .insert(project_key.to_string(), target_state.to_string());

        Ok(ApiResponse::ok(WorkflowStatus {
            project_key: project_key.to_string(),
            state: target_state.to_string(),
            previous_state,
        }))
    }
}

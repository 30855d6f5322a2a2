//! Item-management API collaborator.
//!
//! The execution gateway talks to the item store only through [`ItemApi`].
//! Implementations report business failures as an [`ApiResponse`] with
//! `success: false` and reserve [`ApiError`] for transport faults.

pub mod memory;

pub use memory::InMemoryItemApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use raidline_core::types::{ItemFields, ItemType, NewItem, RaidItem, WorkflowStatus};

use crate::error::ApiError;

/// Envelope returned by every item API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Operations the execution gateway needs from the item store.
#[async_trait]
pub trait ItemApi: Send + Sync {
    async fn create(
        &self,
        project_key: &str,
        item: &NewItem,
    ) -> Result<ApiResponse<RaidItem>, ApiError>;

    async fn update(
        &self,
        project_key: &str,
        item_id: &str,
        updates: &ItemFields,
    ) -> Result<ApiResponse<RaidItem>, ApiError>;

    async fn list(
        &self,
        project_key: &str,
        item_type: Option<ItemType>,
    ) -> Result<ApiResponse<Vec<RaidItem>>, ApiError>;

    async fn transition(
        &self,
        project_key: &str,
        target_state: &str,
    ) -> Result<ApiResponse<WorkflowStatus>, ApiError>;
}

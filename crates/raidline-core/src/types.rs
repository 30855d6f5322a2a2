//! Shared domain types: RAID items, chat transcript entries, timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// The four kinds of RAID register entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Risk,
    Assumption,
    Issue,
    Dependency,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [
        ItemType::Risk,
        ItemType::Assumption,
        ItemType::Issue,
        ItemType::Dependency,
    ];

    /// Single-letter id prefix used for shorthand ids such as `R-12`.
    pub fn prefix(&self) -> char {
        match self {
            ItemType::Risk => 'R',
            ItemType::Assumption => 'A',
            ItemType::Issue => 'I',
            ItemType::Dependency => 'D',
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ItemType::Risk => "risks",
            ItemType::Assumption => "assumptions",
            ItemType::Issue => "issues",
            ItemType::Dependency => "dependencies",
        }
    }

    /// Infer the item type from an id prefix. `RAID-` ids carry no type.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_uppercase().as_str() {
            "R" => Some(ItemType::Risk),
            "A" => Some(ItemType::Assumption),
            "I" => Some(ItemType::Issue),
            "D" => Some(ItemType::Dependency),
            _ => None,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Risk => write!(f, "risk"),
            ItemType::Assumption => write!(f, "assumption"),
            ItemType::Issue => write!(f, "issue"),
            ItemType::Dependency => write!(f, "dependency"),
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "risk" | "risks" => Ok(ItemType::Risk),
            "assumption" | "assumptions" => Ok(ItemType::Assumption),
            "issue" | "issues" => Ok(ItemType::Issue),
            "dependency" | "dependencies" => Ok(ItemType::Dependency),
            _ => Err(format!("Unknown item type: {}", s)),
        }
    }
}

/// Lifecycle status of a RAID item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Open => write!(f, "open"),
            ItemStatus::InProgress => write!(f, "in_progress"),
            ItemStatus::Resolved => write!(f, "resolved"),
            ItemStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "open" => Ok(ItemStatus::Open),
            "in_progress" | "inprogress" => Ok(ItemStatus::InProgress),
            "resolved" => Ok(ItemStatus::Resolved),
            "closed" => Ok(ItemStatus::Closed),
            _ => Err(format!("Unknown item status: {}", s)),
        }
    }
}

/// Priority of a RAID item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

// =============================================================================
// Newtype Wrappers - Temporal
// =============================================================================

/// Unix timestamp in seconds since epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// One append-only entry of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Timestamp::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A partial set of item fields, as collected by a dialogue or sent as an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl ItemFields {
    /// Number of fields that are set.
    pub fn len(&self) -> usize {
        [
            self.item_type.is_some(),
            self.title.is_some(),
            self.description.is_some(),
            self.status.is_some(),
            self.priority.is_some(),
            self.owner.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Request body for creating a RAID item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub description: String,
    pub status: ItemStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// A RAID item as returned by the item-management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidItem {
    pub id: String,
    #[serde(default)]
    pub project_key: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Workflow status of a project after a transition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    pub project_key: String,
    pub state: String,
    #[serde(default)]
    pub previous_state: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- ItemType ----

    #[test]
    fn test_item_type_display() {
        assert_eq!(ItemType::Risk.to_string(), "risk");
        assert_eq!(ItemType::Assumption.to_string(), "assumption");
        assert_eq!(ItemType::Issue.to_string(), "issue");
        assert_eq!(ItemType::Dependency.to_string(), "dependency");
    }

    #[test]
    fn test_item_type_from_str_accepts_plural_and_case() {
        assert_eq!("Risk".parse::<ItemType>().unwrap(), ItemType::Risk);
        assert_eq!(" risks ".parse::<ItemType>().unwrap(), ItemType::Risk);
        assert_eq!(
            "DEPENDENCIES".parse::<ItemType>().unwrap(),
            ItemType::Dependency
        );
        assert!("milestone".parse::<ItemType>().is_err());
    }

    #[test]
    fn test_item_type_prefix_mapping() {
        for item_type in ItemType::ALL {
            let prefix = item_type.prefix().to_string();
            assert_eq!(ItemType::from_prefix(&prefix), Some(item_type));
        }
        assert_eq!(ItemType::from_prefix("r"), Some(ItemType::Risk));
        assert_eq!(ItemType::from_prefix("RAID"), None);
    }

    // ---- ItemStatus / Priority ----

    #[test]
    fn test_item_status_lenient_parse() {
        assert_eq!("open".parse::<ItemStatus>().unwrap(), ItemStatus::Open);
        assert_eq!(
            "In Progress".parse::<ItemStatus>().unwrap(),
            ItemStatus::InProgress
        );
        assert_eq!(
            "in-progress".parse::<ItemStatus>().unwrap(),
            ItemStatus::InProgress
        );
        assert_eq!("CLOSED".parse::<ItemStatus>().unwrap(), ItemStatus::Closed);
        assert!("pending".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_priority_parse_and_default() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("med".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(ItemStatus::default(), ItemStatus::Open);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ItemStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    // ---- ChatMessage ----

    #[test]
    fn test_chat_message_constructors() {
        let user = ChatMessage::user("create a risk");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "create a risk");

        let reply = ChatMessage::assistant("What's the title?");
        assert_eq!(reply.role, Role::Assistant);
        assert_ne!(user.id, reply.id);
        assert!((reply.timestamp.0 - Timestamp::now().0).abs() < 2);
    }

    // ---- ItemFields ----

    #[test]
    fn test_item_fields_len() {
        let mut fields = ItemFields::default();
        assert!(fields.is_empty());

        fields.title = Some("Vendor delay".to_string());
        fields.priority = Some(Priority::High);
        assert_eq!(fields.len(), 2);
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_item_fields_serializes_only_set_fields() {
        let fields = ItemFields {
            status: Some(ItemStatus::Closed),
            ..ItemFields::default()
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({"status": "closed"}));
    }

    #[test]
    fn test_raid_item_decodes_with_missing_optional_fields() {
        let item: RaidItem = serde_json::from_value(serde_json::json!({
            "id": "R-7",
            "type": "risk",
            "title": "Vendor delay"
        }))
        .unwrap();
        assert_eq!(item.id, "R-7");
        assert_eq!(item.item_type, ItemType::Risk);
        assert_eq!(item.status, ItemStatus::Open);
        assert_eq!(item.priority, Priority::Medium);
        assert!(item.owner.is_none());
    }
}

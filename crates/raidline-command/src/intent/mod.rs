//! Intent classification of chat messages.
//!
//! Maps raw text to a [`CommandKind`], extracted parameters and a
//! confidence score. Classification is deterministic and performs no I/O.
//!
//! Confidence contract:
//! - `0.0` when no phrase group matches (`Unknown`);
//! - `0.9` when the matched kind's required entity is present (an item type
//!   for create, an id for edit, a target state for a transition, nothing
//!   for list);
//! - `0.6` when the kind matched but its entity is missing.

pub mod entities;
pub mod patterns;

use std::sync::LazyLock;

use crate::intent::patterns::PhraseSet;
use crate::types::{CommandKind, Intent, IntentParams};

/// Confidence when the command and its required entity were both found.
pub const CONFIDENCE_COMPLETE: f32 = 0.9;

/// Confidence when the command matched but its entity is missing.
pub const CONFIDENCE_PARTIAL: f32 = 0.6;

/// Strategy interface for turning a message into an [`Intent`].
///
/// The dialogue engine only consumes `Intent` values, so a learned
/// classifier can replace [`PatternClassifier`] without other changes.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Intent;
}

/// Keyword and regex classifier.
#[derive(Default)]
pub struct PatternClassifier {
    phrases: PhraseSet,
}

impl PatternClassifier {
    pub fn new() -> Self {
        Self {
            phrases: PhraseSet::new(),
        }
    }

    fn extract_params(&self, original: &str, normalized: &str) -> IntentParams {
        let collapsed = entities::collapse_whitespace(original);
        let item_id = entities::extract_item_id(normalized);
        let item_type = entities::extract_item_type(normalized).or_else(|| {
            item_id
                .as_deref()
                .and_then(|id| id.split('-').next())
                .and_then(raidline_core::types::ItemType::from_prefix)
        });

        IntentParams {
            item_type,
            item_id,
            target_state: entities::extract_target_state(&collapsed),
            title: entities::extract_title(&collapsed),
            priority: entities::extract_priority(normalized),
            status: entities::extract_status(normalized),
        }
    }
}

impl IntentClassifier for PatternClassifier {
    fn classify(&self, text: &str) -> Intent {
        let normalized = entities::normalize(text);

        let Some(kind) = self.phrases.match_kind(&normalized) else {
            tracing::debug!(text_len = text.len(), "No command phrase matched");
            return Intent::unknown(text);
        };

        let params = self.extract_params(text, &normalized);

        let has_entity = match kind {
            CommandKind::CreateItem => params.item_type.is_some(),
            CommandKind::EditItem => params.item_id.is_some(),
            CommandKind::ListItems => true,
            CommandKind::TransitionWorkflow => params.target_state.is_some(),
            CommandKind::Unknown => false,
        };
        let confidence = if has_entity {
            CONFIDENCE_COMPLETE
        } else {
            CONFIDENCE_PARTIAL
        };

        tracing::debug!(intent = %kind, confidence, "Classified message");

        Intent {
            kind,
            confidence,
            params,
            original_text: text.to_string(),
        }
    }
}

static DEFAULT_CLASSIFIER: LazyLock<PatternClassifier> = LazyLock::new(PatternClassifier::new);

/// Classify with the shared default [`PatternClassifier`].
pub fn classify(text: &str) -> Intent {
    DEFAULT_CLASSIFIER.classify(text)
}

//! Slot-filling dialogue engine.
//!
//! Builds a conversation from a classified intent and drives it one reply
//! at a time:
//! NoConversation -> Active(0) -> Active(1) -> ... -> Complete.
//! An invalid reply leaves the state where it was.

pub mod flows;
pub mod state;

pub use flows::{DialogueStep, FlowTable};
pub use state::{ConversationState, CreateItemState, EditItemState};

use raidline_core::types::{ItemFields, ItemType};

use crate::error::StepError;
use crate::types::{CommandKind, Field, Intent, Progress};

/// Replies treated as "leave blank" on optional steps.
const SKIP_REPLIES: &[&str] = &["skip", "none", "n/a", "-"];

/// A freshly started conversation and the first question to ask.
#[derive(Debug, Clone)]
pub struct DialogueStart {
    pub state: ConversationState,
    /// `None` when every field was already supplied.
    pub prompt: Option<&'static str>,
}

/// A value the classifier extracted for `field`, kept only if the flow's
/// step for that field would accept it as a reply.
fn accept_prefilled(template: &[DialogueStep], field: Field, raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let validate = template
        .iter()
        .find(|step| step.field == field)
        .and_then(|step| step.validate);
    if let Some(validate) = validate {
        if let Err(reason) = validate(raw) {
            tracing::debug!(%field, %reason, "Extracted value rejected, asking instead");
            return None;
        }
    }
    Some(raw.to_string())
}

/// Builds and advances conversations from a [`FlowTable`].
#[derive(Debug, Clone, Default)]
pub struct DialogueEngine {
    flows: FlowTable,
}

impl DialogueEngine {
    pub fn new(flows: FlowTable) -> Self {
        Self { flows }
    }

    /// Start a conversation for `intent`, or `None` if its kind has no flow.
    ///
    /// Steps whose field the classifier already extracted are left out.
    pub fn begin_dialogue(&self, intent: &Intent, project_key: &str) -> Option<DialogueStart> {
        let template = self.flows.get(intent.kind)?;
        let params = &intent.params;

        let state = match intent.kind {
            CommandKind::CreateItem => {
                let collected = ItemFields {
                    item_type: params.item_type,
                    title: accept_prefilled(template, Field::Title, params.title.as_deref()),
                    status: params.status,
                    priority: params.priority,
                    ..ItemFields::default()
                };
                let steps = template
                    .iter()
                    .filter(|step| !state::has_field(&collected, step.field))
                    .copied()
                    .collect();
                ConversationState::CreateItem(CreateItemState {
                    project_key: project_key.to_string(),
                    collected,
                    steps,
                    cursor: 0,
                })
            }
            CommandKind::EditItem => {
                let item_id = params.item_id.clone().unwrap_or_default();
                let item_type = item_id
                    .split('-')
                    .next()
                    .and_then(ItemType::from_prefix)
                    .or(params.item_type);
                let updates = ItemFields {
                    title: accept_prefilled(template, Field::Title, params.title.as_deref()),
                    status: params.status,
                    priority: params.priority,
                    ..ItemFields::default()
                };
                let steps = template
                    .iter()
                    .filter(|step| match step.field {
                        Field::ItemId => item_id.is_empty(),
                        field => !state::has_field(&updates, field),
                    })
                    .copied()
                    .collect();
                ConversationState::EditItem(EditItemState {
                    project_key: project_key.to_string(),
                    item_id,
                    item_type,
                    updates,
                    steps,
                    cursor: 0,
                })
            }
            CommandKind::ListItems | CommandKind::TransitionWorkflow | CommandKind::Unknown => {
                return None;
            }
        };

        tracing::debug!(
            intent = %intent.kind,
            project_key,
            steps = state.steps().len(),
            "Dialogue started"
        );

        let prompt = state.current_prompt();
        Some(DialogueStart { state, prompt })
    }

    /// Apply a reply to the current step.
    ///
    /// On error the state is unchanged and the same step should be asked
    /// again.
    pub fn advance(&self, state: &mut ConversationState, reply: &str) -> Result<(), StepError> {
        let step = *state.current_step().ok_or(StepError::AlreadyComplete)?;
        let reply = reply.trim();

        let blank = reply.is_empty()
            || (!step.required && SKIP_REPLIES.contains(&reply.to_lowercase().as_str()));

        if blank {
            if step.required {
                return Err(StepError::Required(step.field));
            }
            state.advance_cursor();
            tracing::debug!(field = %step.field, "Optional step skipped");
            return Ok(());
        }

        if let Some(validate) = step.validate {
            validate(reply).map_err(StepError::Invalid)?;
        }
        state.store(step.field, reply).map_err(StepError::Invalid)?;
        state.advance_cursor();

        tracing::debug!(field = %step.field, cursor = state.cursor(), "Step filled");
        Ok(())
    }
}

/// Where a conversation stands. Pure read.
pub fn progress(state: &ConversationState) -> Progress {
    Progress {
        current: state.cursor(),
        total: state.steps().len(),
    }
}

/// Whether `state` is complete and holds every business-required field.
pub fn is_executable(state: Option<&ConversationState>) -> bool {
    let Some(state) = state else {
        return false;
    };
    if !state.is_complete() {
        return false;
    }
    match state {
        ConversationState::CreateItem(s) => {
            s.collected.item_type.is_some()
                && non_empty(s.collected.title.as_deref())
                && non_empty(s.collected.description.as_deref())
        }
        ConversationState::EditItem(s) => !s.item_id.trim().is_empty() && !s.updates.is_empty(),
    }
}

fn non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::classify;
    use raidline_core::types::{ItemStatus, ItemType, Priority};

    fn engine() -> DialogueEngine {
        DialogueEngine::default()
    }

    fn start(text: &str) -> DialogueStart {
        engine()
            .begin_dialogue(&classify(text), "APOLLO")
            .expect("dialogue should start")
    }

    // =====================================================================
    // begin_dialogue
    // =====================================================================

    #[test]
    fn test_create_a_risk_scenario() {
        let engine = engine();
        let intent = classify("create a risk");
        let DialogueStart { mut state, prompt } =
            engine.begin_dialogue(&intent, "APOLLO").unwrap();

        assert_eq!(state.cursor(), 0);
        assert_eq!(prompt, Some("What's the title?"));
        assert!(!is_executable(Some(&state)));

        engine.advance(&mut state, "Vendor delay").unwrap();
        engine
            .advance(&mut state, "Supplier may slip the Q3 delivery")
            .unwrap();
        assert!(!is_executable(Some(&state)));

        engine.advance(&mut state, "").unwrap();
        engine.advance(&mut state, "").unwrap();
        assert!(state.is_complete());
        assert!(is_executable(Some(&state)));

        match &state {
            ConversationState::CreateItem(s) => {
                assert_eq!(s.collected.item_type, Some(ItemType::Risk));
                assert_eq!(s.collected.title.as_deref(), Some("Vendor delay"));
                assert_eq!(s.collected.priority, None);
                assert_eq!(s.collected.owner, None);
            }
            _ => panic!("Expected CreateItem"),
        }
    }

    #[test]
    fn test_create_skips_prefilled_fields() {
        let DialogueStart { state, prompt } = start(r#"add a high priority issue "Login broken""#);
        let fields: Vec<Field> = state.steps().iter().map(|s| s.field).collect();
        assert_eq!(fields, vec![Field::Description, Field::Owner]);
        assert_eq!(prompt, Some("Please describe it."));
    }

    #[test]
    fn test_create_without_type_asks_for_type_first() {
        let DialogueStart { state, .. } = start("create something");
        assert_eq!(state.current_step().unwrap().field, Field::ItemType);
        assert_eq!(progress(&state), Progress { current: 0, total: 5 });
    }

    #[test]
    fn test_edit_without_id_asks_for_id_first() {
        let DialogueStart { state, prompt } = start("edit an issue");
        assert_eq!(state.kind(), CommandKind::EditItem);
        assert_eq!(state.current_step().unwrap().field, Field::ItemId);
        assert!(prompt.unwrap().contains("Which item"));
    }

    #[test]
    fn test_edit_with_id_skips_id_step() {
        let DialogueStart { state, .. } = start("update R-12 priority to critical");
        let fields: Vec<Field> = state.steps().iter().map(|s| s.field).collect();
        assert_eq!(
            fields,
            vec![Field::Title, Field::Description, Field::Status, Field::Owner]
        );
        match &state {
            ConversationState::EditItem(s) => {
                assert_eq!(s.item_id, "R-12");
                assert_eq!(s.item_type, Some(ItemType::Risk));
                assert_eq!(s.updates.priority, Some(Priority::Critical));
            }
            _ => panic!("Expected EditItem"),
        }
    }

    #[test]
    fn test_no_dialogue_for_list_transition_unknown() {
        let engine = engine();
        for text in ["list risks", "transition to Approved", "hello"] {
            assert!(
                engine.begin_dialogue(&classify(text), "APOLLO").is_none(),
                "{text}"
            );
        }
    }

    #[test]
    fn test_prefilled_everything_starts_complete() {
        let engine = DialogueEngine::new(FlowTable::empty().with_flow(
            CommandKind::CreateItem,
            vec![DialogueStep {
                field: Field::ItemType,
                prompt: "Type?",
                required: true,
                validate: None,
            }],
        ));
        let start = engine
            .begin_dialogue(&classify("create a risk"), "APOLLO")
            .unwrap();
        assert!(start.prompt.is_none());
        assert!(start.state.is_complete());
        assert_eq!(progress(&start.state), Progress { current: 0, total: 0 });
    }

    // =====================================================================
    // advance
    // =====================================================================

    #[test]
    fn test_invalid_reply_leaves_state_unchanged() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("create something");

        let err = engine.advance(&mut state, "milestone").unwrap_err();
        assert!(matches!(err, StepError::Invalid(_)));
        assert_eq!(state.cursor(), 0);
        match &state {
            ConversationState::CreateItem(s) => assert!(s.collected.item_type.is_none()),
            _ => panic!("Expected CreateItem"),
        }

        engine.advance(&mut state, "Dependency").unwrap();
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn test_empty_reply_on_required_step_is_error() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("create a risk");
        let err = engine.advance(&mut state, "   ").unwrap_err();
        assert_eq!(err, StepError::Required(Field::Title));
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_skip_word_on_required_step_is_stored() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("create a risk");
        engine.advance(&mut state, "none").unwrap();
        match &state {
            ConversationState::CreateItem(s) => {
                assert_eq!(s.collected.title.as_deref(), Some("none"))
            }
            _ => panic!("Expected CreateItem"),
        }
    }

    #[test]
    fn test_skip_word_on_optional_step_leaves_field_unset() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("edit R-3");
        engine.advance(&mut state, "skip").unwrap();
        engine.advance(&mut state, "n/a").unwrap();
        engine.advance(&mut state, "Resolved").unwrap();
        match &state {
            ConversationState::EditItem(s) => {
                assert!(s.updates.title.is_none());
                assert!(s.updates.description.is_none());
                assert_eq!(s.updates.status, Some(ItemStatus::Resolved));
            }
            _ => panic!("Expected EditItem"),
        }
    }

    #[test]
    fn test_reply_is_trimmed() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("create a risk");
        engine.advance(&mut state, "  Vendor delay \n").unwrap();
        match &state {
            ConversationState::CreateItem(s) => {
                assert_eq!(s.collected.title.as_deref(), Some("Vendor delay"))
            }
            _ => panic!("Expected CreateItem"),
        }
    }

    #[test]
    fn test_advance_past_completion_is_error() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start(r#"log a high priority risk "Vendor delay""#);
        engine.advance(&mut state, "Supplier may slip").unwrap();
        engine.advance(&mut state, "").unwrap();
        assert!(state.is_complete());
        assert_eq!(
            engine.advance(&mut state, "extra").unwrap_err(),
            StepError::AlreadyComplete
        );
    }

    #[test]
    fn test_edit_id_step_normalizes_id() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("edit an item");
        assert!(engine.advance(&mut state, "item twelve").is_err());
        engine.advance(&mut state, "d-9").unwrap();
        match &state {
            ConversationState::EditItem(s) => {
                assert_eq!(s.item_id, "D-9");
                assert_eq!(s.item_type, Some(ItemType::Dependency));
            }
            _ => panic!("Expected EditItem"),
        }
    }

    #[test]
    fn test_edit_id_prefix_overrides_guessed_type() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("edit the issue");
        engine.advance(&mut state, "R-5").unwrap();
        match &state {
            ConversationState::EditItem(s) => assert_eq!(s.item_type, Some(ItemType::Risk)),
            _ => panic!("Expected EditItem"),
        }

        let DialogueStart { mut state, .. } = start("edit the issue");
        engine.advance(&mut state, "RAID-5").unwrap();
        match &state {
            ConversationState::EditItem(s) => assert_eq!(s.item_type, Some(ItemType::Issue)),
            _ => panic!("Expected EditItem"),
        }
    }

    #[test]
    fn test_edit_id_in_message_overrides_type_noun() {
        let DialogueStart { state, .. } = start("update the issue D-4");
        match &state {
            ConversationState::EditItem(s) => {
                assert_eq!(s.item_id, "D-4");
                assert_eq!(s.item_type, Some(ItemType::Dependency));
            }
            _ => panic!("Expected EditItem"),
        }
    }

    #[test]
    fn test_overlong_quoted_title_is_asked_for() {
        let engine = engine();
        let long = "x".repeat(flows::MAX_TITLE_LENGTH + 1);
        let DialogueStart { mut state, prompt } =
            start(&format!(r#"create a risk "{}""#, long));

        assert_eq!(state.current_step().unwrap().field, Field::Title);
        assert_eq!(prompt, Some("What's the title?"));
        assert!(engine.advance(&mut state, &long).is_err());
        engine.advance(&mut state, "Vendor delay").unwrap();
        match &state {
            ConversationState::CreateItem(s) => {
                assert_eq!(s.collected.title.as_deref(), Some("Vendor delay"));
            }
            _ => panic!("Expected CreateItem"),
        }
    }

    #[test]
    fn test_overlong_quoted_title_is_not_an_edit() {
        let long = "y".repeat(flows::MAX_TITLE_LENGTH + 1);
        let DialogueStart { state, .. } = start(&format!(r#"edit R-2 "{}""#, long));
        match &state {
            ConversationState::EditItem(s) => assert!(s.updates.title.is_none()),
            _ => panic!("Expected EditItem"),
        }
        assert!(state.steps().iter().any(|step| step.field == Field::Title));
    }

    // =====================================================================
    // progress / is_executable
    // =====================================================================

    #[test]
    fn test_progress_is_pure() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("create a risk");
        engine.advance(&mut state, "Vendor delay").unwrap();
        let first = progress(&state);
        let second = progress(&state);
        assert_eq!(first, second);
        assert_eq!(first, Progress { current: 1, total: 4 });
    }

    #[test]
    fn test_is_executable_none() {
        assert!(!is_executable(None));
    }

    #[test]
    fn test_complete_create_with_empty_description_not_executable() {
        let state = ConversationState::CreateItem(CreateItemState {
            project_key: "APOLLO".to_string(),
            collected: ItemFields {
                item_type: Some(ItemType::Risk),
                title: Some("Vendor delay".to_string()),
                description: Some("  ".to_string()),
                ..ItemFields::default()
            },
            steps: vec![],
            cursor: 0,
        });
        assert!(state.is_complete());
        assert!(!is_executable(Some(&state)));
    }

    #[test]
    fn test_complete_edit_without_updates_not_executable() {
        let engine = engine();
        let DialogueStart { mut state, .. } = start("edit R-3");
        for _ in 0..5 {
            engine.advance(&mut state, "").unwrap();
        }
        assert!(state.is_complete());
        assert!(!is_executable(Some(&state)));
    }
}

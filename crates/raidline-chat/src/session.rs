//! Chat session: routes each message to the classifier, the dialogue engine
//! or the execution gateway.
//!
//! The session holds at most one active conversation. While one is active,
//! every message is treated as the answer to its current step unless it is
//! a cancel phrase. A finished conversation is executed once and dropped,
//! whatever the outcome.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use raidline_command::{
    format_upstream_error, progress, CommandKind, ConversationState, DialogueEngine,
    ExecutionGateway, ExecutionOutcome, GatewayError, Intent, IntentClassifier,
    PatternClassifier, Progress,
};
use raidline_core::config::ChatConfig;
use raidline_core::types::{ChatMessage, Timestamp};

use crate::error::ChatError;

static CANCEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:cancel|stop|abort|never\s*mind|forget\s+it)\s*[.!]*\s*$")
        .expect("Invalid cancel regex")
});

const REPHRASE_HINT: &str = "I'm not sure what you'd like to do. Try \"create a risk\", \
\"update R-12\", \"list issues\" or \"transition to Approved\".";

/// One user's conversation with the assistant about a single project.
pub struct ChatSession {
    id: Uuid,
    project_key: String,
    config: ChatConfig,
    classifier: Box<dyn IntentClassifier>,
    engine: DialogueEngine,
    gateway: ExecutionGateway,
    active: Option<ConversationState>,
    transcript: Vec<ChatMessage>,
    started_at: Timestamp,
}

impl ChatSession {
    /// Create a session using the pattern classifier and the standard flows.
    pub fn new(project_key: impl Into<String>, config: ChatConfig, gateway: ExecutionGateway) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_key: project_key.into(),
            config,
            classifier: Box::new(PatternClassifier::new()),
            engine: DialogueEngine::default(),
            gateway,
            active: None,
            transcript: Vec::new(),
            started_at: Timestamp::now(),
        }
    }

    /// Replace the intent classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the dialogue engine, e.g. to use custom flows.
    pub fn with_engine(mut self, engine: DialogueEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    /// Switch projects. Any unfinished conversation is discarded.
    pub fn set_project_key(&mut self, project_key: impl Into<String>) {
        self.project_key = project_key.into();
        self.active = None;
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn active(&self) -> Option<&ConversationState> {
        self.active.as_ref()
    }

    /// Progress of the active conversation, if any.
    pub fn progress(&self) -> Option<Progress> {
        self.active.as_ref().map(progress)
    }

    /// Process one user message and return the assistant replies.
    ///
    /// Both the message and the replies are appended to the transcript.
    pub async fn handle_message(&mut self, text: &str) -> Result<Vec<ChatMessage>, ChatError> {
        if !self.config.enabled {
            return Err(ChatError::Disabled);
        }
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        self.transcript.push(ChatMessage::user(text));

        let reply = if CANCEL_RE.is_match(text) {
            self.cancel()
        } else if self.active.is_some() {
            self.continue_dialogue(text).await
        } else {
            self.start_command(text).await
        };

        self.transcript.push(reply.clone());
        Ok(vec![reply])
    }

    fn cancel(&mut self) -> ChatMessage {
        match self.active.take() {
            Some(state) => {
                tracing::info!(session_id = %self.id, intent = %state.kind(), "Conversation cancelled");
                ChatMessage::assistant("Okay, I've cancelled that.")
            }
            None => ChatMessage::assistant("There's nothing to cancel."),
        }
    }

    async fn continue_dialogue(&mut self, reply: &str) -> ChatMessage {
        let Some(state) = self.active.as_mut() else {
            return ChatMessage::assistant(REPHRASE_HINT);
        };

        if let Err(err) = self.engine.advance(state, reply) {
            tracing::debug!(session_id = %self.id, error = %err, "Reply rejected");
            return match state.current_prompt() {
                Some(prompt) => ChatMessage::assistant(format!("{}\n{}", err, prompt)),
                None => ChatMessage::assistant(err.to_string()),
            };
        }

        if let Some(prompt) = state.current_prompt() {
            return ChatMessage::assistant(prompt);
        }

        match self.active.take() {
            Some(state) => self.execute(&state).await,
            None => ChatMessage::assistant(REPHRASE_HINT),
        }
    }

    async fn start_command(&mut self, text: &str) -> ChatMessage {
        let intent = self.classifier.classify(text);

        if intent.kind == CommandKind::Unknown
            || intent.confidence < self.config.dialogue_threshold
        {
            tracing::debug!(
                session_id = %self.id,
                intent = %intent.kind,
                confidence = intent.confidence,
                "Below dialogue threshold"
            );
            return ChatMessage::assistant(REPHRASE_HINT);
        }

        match intent.kind {
            CommandKind::ListItems => {
                let result = self
                    .gateway
                    .list_items(&self.project_key, intent.params.item_type)
                    .await;
                render(result)
            }
            CommandKind::TransitionWorkflow => {
                let target = intent.params.target_state.as_deref().unwrap_or_default();
                let result = self
                    .gateway
                    .transition_workflow(&self.project_key, target)
                    .await;
                render(result)
            }
            CommandKind::CreateItem | CommandKind::EditItem => self.begin(&intent).await,
            CommandKind::Unknown => ChatMessage::assistant(REPHRASE_HINT),
        }
    }

    async fn begin(&mut self, intent: &Intent) -> ChatMessage {
        let Some(start) = self.engine.begin_dialogue(intent, &self.project_key) else {
            return ChatMessage::assistant(REPHRASE_HINT);
        };

        match start.prompt {
            Some(prompt) => {
                tracing::info!(
                    session_id = %self.id,
                    intent = %intent.kind,
                    confidence = intent.confidence,
                    "Conversation started"
                );
                self.active = Some(start.state);
                ChatMessage::assistant(prompt)
            }
            None => {
                self.active = None;
                self.execute(&start.state).await
            }
        }
    }

    async fn execute(&self, state: &ConversationState) -> ChatMessage {
        render(self.gateway.execute(state).await)
    }
}

fn render(result: Result<ExecutionOutcome, GatewayError>) -> ChatMessage {
    match result {
        Ok(outcome) => outcome.message,
        Err(err) => {
            tracing::error!(error = %err, "Command execution failed");
            format_upstream_error(&err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use raidline_command::{ApiError, ApiResponse, InMemoryItemApi, ItemApi, ItemDefaults};
    use raidline_core::types::{
        ItemFields, ItemType, NewItem, RaidItem, Role, WorkflowStatus,
    };

    /// Every call fails at the transport level.
    struct FaultyApi;

    #[async_trait]
    impl ItemApi for FaultyApi {
        async fn create(&self, _: &str, _: &NewItem) -> Result<ApiResponse<RaidItem>, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }

        async fn update(
            &self,
            _: &str,
            _: &str,
            _: &ItemFields,
        ) -> Result<ApiResponse<RaidItem>, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }

        async fn list(
            &self,
            _: &str,
            _: Option<ItemType>,
        ) -> Result<ApiResponse<Vec<RaidItem>>, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }

        async fn transition(&self, _: &str, _: &str) -> Result<ApiResponse<WorkflowStatus>, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }
    }

    fn session() -> ChatSession {
        let gateway = ExecutionGateway::new(Arc::new(InMemoryItemApi::new()), ItemDefaults::default());
        ChatSession::new("APOLLO", ChatConfig::default(), gateway)
    }

    async fn say(session: &mut ChatSession, text: &str) -> String {
        let replies = session.handle_message(text).await.unwrap();
        assert_eq!(replies.len(), 1);
        replies[0].content.clone()
    }

    // =====================================================================
    // Input validation
    // =====================================================================

    #[tokio::test]
    async fn test_disabled_chat() {
        let gateway = ExecutionGateway::new(Arc::new(InMemoryItemApi::new()), ItemDefaults::default());
        let config = ChatConfig {
            enabled: false,
            ..ChatConfig::default()
        };
        let mut session = ChatSession::new("APOLLO", config, gateway);
        let err = session.handle_message("create a risk").await.unwrap_err();
        assert!(matches!(err, ChatError::Disabled));
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_empty_and_long_messages_rejected() {
        let mut session = session();
        assert!(matches!(
            session.handle_message("   ").await.unwrap_err(),
            ChatError::EmptyMessage
        ));
        let long = "a".repeat(2001);
        assert!(matches!(
            session.handle_message(&long).await.unwrap_err(),
            ChatError::MessageTooLong(2000)
        ));
        assert!(session.transcript().is_empty());
    }

    // =====================================================================
    // Create flow
    // =====================================================================

    #[tokio::test]
    async fn test_create_risk_end_to_end() {
        let mut session = session();

        assert_eq!(say(&mut session, "create a risk").await, "What's the title?");
        assert_eq!(
            session.progress(),
            Some(Progress {
                current: 0,
                total: 4
            })
        );
        assert_eq!(say(&mut session, "Vendor delay").await, "Please describe it.");
        say(&mut session, "Supplier may slip the Q3 delivery").await;
        say(&mut session, "high").await;
        let done = say(&mut session, "skip").await;

        assert_eq!(done, "Created risk R-1: Vendor delay");
        assert!(session.active().is_none());
        assert_eq!(session.transcript().len(), 10);
        assert_eq!(session.transcript()[0].role, Role::User);
        assert_eq!(session.transcript()[9].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_invalid_reply_reprompts_same_step() {
        let mut session = session();
        say(&mut session, "create something").await;

        let reply = say(&mut session, "milestone").await;
        assert!(reply.contains("not a RAID type"));
        assert!(reply.contains("What kind of item"));
        assert_eq!(session.progress().unwrap().current, 0);

        assert_eq!(say(&mut session, "issue").await, "What's the title?");
    }

    #[tokio::test]
    async fn test_everything_prefilled_executes_immediately() {
        let mut session = session().with_engine(DialogueEngine::new(
            raidline_command::FlowTable::empty().with_flow(CommandKind::CreateItem, vec![]),
        ));
        // Zero steps: executed at once, without a title.
        let reply = say(&mut session, "create a risk").await;
        assert!(reply.contains("missing required fields"));
        assert!(session.active().is_none());
    }

    // =====================================================================
    // Edit / list / transition
    // =====================================================================

    #[tokio::test]
    async fn test_edit_existing_item() {
        let mut session = session();
        say(&mut session, r#"add a risk "Vendor delay""#).await;
        say(&mut session, "Supplier may slip").await;
        say(&mut session, "skip").await;
        say(&mut session, "skip").await;

        assert_eq!(
            say(&mut session, "mark R-1 as resolved").await,
            "New title? (or \"skip\" to keep the current one)"
        );
        for _ in 0..3 {
            say(&mut session, "skip").await;
        }
        assert_eq!(say(&mut session, "dana").await, "Updated risk R-1");
    }

    #[tokio::test]
    async fn test_edit_unknown_item_reports_failure() {
        let mut session = session();
        say(&mut session, "update R-9 priority to low").await;
        for _ in 0..4 {
            say(&mut session, "skip").await;
        }
        let last = session.transcript().last().unwrap().content.clone();
        assert_eq!(last, "Failed to update risk R-9: Item R-9 not found");
        assert!(session.active().is_none());
    }

    #[tokio::test]
    async fn test_list_runs_immediately() {
        let mut session = session();
        let reply = say(&mut session, "list all risks").await;
        assert_eq!(reply, "No risks found in APOLLO.");
        assert!(session.active().is_none());
    }

    #[tokio::test]
    async fn test_transition_runs_immediately() {
        let mut session = session();
        assert_eq!(
            say(&mut session, "transition to Approved").await,
            "Moved APOLLO to Approved"
        );
        assert!(say(&mut session, "advance the workflow")
            .await
            .contains("Which state"));
    }

    // =====================================================================
    // Threshold / cancel / upstream faults
    // =====================================================================

    #[tokio::test]
    async fn test_unknown_gets_rephrase_hint() {
        let mut session = session();
        let reply = say(&mut session, "good morning").await;
        assert!(reply.contains("not sure what you'd like"));
        assert!(session.active().is_none());
    }

    #[tokio::test]
    async fn test_threshold_from_config() {
        let gateway = ExecutionGateway::new(Arc::new(InMemoryItemApi::new()), ItemDefaults::default());
        let config = ChatConfig {
            dialogue_threshold: 0.7,
            ..ChatConfig::default()
        };
        let mut session = ChatSession::new("APOLLO", config, gateway);

        let reply = say(&mut session, "create something").await;
        assert!(reply.contains("not sure"));
        assert!(session.active().is_none());

        assert_eq!(say(&mut session, "create an issue").await, "What's the title?");
    }

    #[tokio::test]
    async fn test_cancel_discards_active_conversation() {
        let mut session = session();
        say(&mut session, "create a risk").await;
        assert!(session.active().is_some());

        assert_eq!(say(&mut session, "Never mind!").await, "Okay, I've cancelled that.");
        assert!(session.active().is_none());
        assert_eq!(say(&mut session, "cancel").await, "There's nothing to cancel.");
    }

    #[tokio::test]
    async fn test_switching_project_discards_conversation() {
        let mut session = session();
        say(&mut session, "create a risk").await;
        session.set_project_key("GEMINI");
        assert!(session.active().is_none());
        assert_eq!(session.project_key(), "GEMINI");
    }

    #[tokio::test]
    async fn test_transport_fault_rendered_as_upstream_error() {
        let gateway = ExecutionGateway::new(Arc::new(FaultyApi), ItemDefaults::default());
        let mut session = ChatSession::new("APOLLO", ChatConfig::default(), gateway);

        let reply = say(&mut session, "list issues").await;
        assert!(reply.starts_with(raidline_command::gateway::FAILURE_MARKER));
        assert!(reply.contains("connection refused"));
    }

    #[test]
    fn test_cancel_phrases() {
        for text in ["cancel", "STOP", "never mind", "nevermind.", "abort!", "forget it"] {
            assert!(CANCEL_RE.is_match(text), "{text}");
        }
        for text in ["cancel R-3", "stop the vendor delay", "abortion clinic risk"] {
            assert!(!CANCEL_RE.is_match(text), "{text}");
        }
    }

    #[test]
    fn test_classifier_can_be_replaced() {
        struct AlwaysList;
        impl IntentClassifier for AlwaysList {
            fn classify(&self, text: &str) -> Intent {
                Intent {
                    kind: CommandKind::ListItems,
                    confidence: 1.0,
                    params: raidline_command::IntentParams {
                        item_type: Some(ItemType::Issue),
                        ..Default::default()
                    },
                    original_text: text.to_string(),
                }
            }
        }
        let session = session().with_classifier(Box::new(AlwaysList));
        assert_eq!(session.classifier.classify("hi").kind, CommandKind::ListItems);
    }
}

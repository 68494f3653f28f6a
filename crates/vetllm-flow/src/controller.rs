//! Conversation flow controller.
//!
//! Owns the conversation state, the transcript and the selected provider.
//! The controller never performs I/O: `submit_input` hands back a
//! `PendingRequest` and the caller reports the outcome through `complete`.

use std::collections::BTreeMap;
use std::sync::Arc;

use vetllm_core::types::{is_blank, RelayReply, RelayRequest};
use vetllm_core::{Catalog, Category};

use crate::error::FlowError;
use crate::format::{format_response, format_value};
use crate::message::ChatMessage;
use crate::state::{ConversationState, StateKind};

/// Input hint shown outside free-chat mode.
pub const DEFAULT_PLACEHOLDER: &str = "Type your message here...";

// =============================================================================
// Types
// =============================================================================

/// One selectable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    /// Value passed back to `select_category` / `select_action`.
    pub value: String,
    pub label: String,
}

/// A request the caller must send to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub category: Category,
    pub action: String,
    pub message: String,
    pub provider: String,
}

impl PendingRequest {
    /// Relay path, `/{category}/{action}`.
    pub fn path(&self) -> String {
        format!("/{}/{}", self.category, self.action)
    }

    /// JSON body for the relay.
    pub fn body(&self) -> RelayRequest {
        RelayRequest {
            message: Some(self.message.clone()),
            query: None,
            provider: Some(self.provider.clone()),
        }
    }
}

/// What a submitted input led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// A request is ready; send it and call `complete`.
    Dispatch(PendingRequest),
    /// An answer was stored and the next field was prompted.
    Prompted,
}

// =============================================================================
// FlowController
// =============================================================================

/// Drives one chat session through category, action and input.
#[derive(Debug)]
pub struct FlowController {
    catalog: Arc<Catalog>,
    state: ConversationState,
    messages: Vec<ChatMessage>,
    provider: String,
    loading: bool,
}

impl FlowController {
    pub fn new(catalog: Arc<Catalog>, provider: impl Into<String>) -> Self {
        Self {
            catalog,
            state: ConversationState::SelectCategory,
            messages: Vec::new(),
            provider: provider.into(),
            loading: false,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Transcript in append order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn set_provider(&mut self, provider: impl Into<String>) {
        self.provider = provider.into();
        tracing::info!(provider = %self.provider, "Provider changed");
    }

    /// Whether a dispatched request has not yet completed.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Menu entries for the current state. Empty when text input is expected.
    pub fn options(&self) -> Vec<MenuOption> {
        match &self.state {
            ConversationState::SelectCategory => self
                .catalog
                .categories()
                .map(|c| MenuOption {
                    value: c.path_segment().to_string(),
                    label: c.label().to_string(),
                })
                .collect(),
            ConversationState::SelectAction { category } => self
                .catalog
                .actions_for(*category)
                .into_iter()
                .map(|a| MenuOption {
                    value: a.key.clone(),
                    label: a.label.clone(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Input hint: the action's prompt template in free chat, else the default.
    pub fn placeholder(&self) -> &str {
        match &self.state {
            ConversationState::FreeChat { action, .. } => self
                .catalog
                .template(action)
                .unwrap_or(DEFAULT_PLACEHOLDER),
            _ => DEFAULT_PLACEHOLDER,
        }
    }

    /// Pick a category by path segment (`pharma`) or label (`Pharma`).
    pub fn select_category(&mut self, choice: &str) -> Result<(), FlowError> {
        self.ensure_idle()?;
        self.ensure_kind(StateKind::SelectCategory, "select a category")?;

        let category = Category::from_path_segment(choice)
            .or_else(|| Category::ALL.into_iter().find(|c| c.label() == choice))
            .ok_or_else(|| FlowError::UnknownCategory(choice.to_string()))?;

        self.transition(ConversationState::SelectAction { category })
    }

    /// Pick an action of the selected category.
    ///
    /// Multi-step actions prompt for their first field; others switch to free chat.
    pub fn select_action(&mut self, key: &str) -> Result<(), FlowError> {
        self.ensure_idle()?;
        let category = match &self.state {
            ConversationState::SelectAction { category } => *category,
            other => {
                return Err(FlowError::InvalidTransition {
                    state: other.to_string(),
                    action: "select an action",
                })
            }
        };

        let descriptor = self
            .catalog
            .action(key)
            .filter(|a| a.category == category)
            .ok_or_else(|| FlowError::UnknownAction(key.to_string()))?;
        let action = descriptor.key.clone();
        let first_prompt = descriptor
            .multi_step
            .as_ref()
            .and_then(|plan| plan.field(1))
            .map(|field| field.prompt.clone());

        match first_prompt {
            Some(prompt) => {
                self.transition(ConversationState::MultiStep {
                    category,
                    action,
                    step: 1,
                    answers: BTreeMap::new(),
                })?;
                self.messages.push(ChatMessage::bot(prompt));
            }
            None => self.transition(ConversationState::FreeChat { category, action })?,
        }
        Ok(())
    }

    /// Step back one menu level, discarding collected answers.
    pub fn back(&mut self) -> Result<(), FlowError> {
        self.ensure_idle()?;
        let next = match &self.state {
            ConversationState::SelectAction { .. } => ConversationState::SelectCategory,
            ConversationState::MultiStep { category, .. }
            | ConversationState::FreeChat { category, .. } => {
                ConversationState::SelectAction { category: *category }
            }
            ConversationState::SelectCategory => {
                return Err(FlowError::InvalidTransition {
                    state: self.state.to_string(),
                    action: "go back",
                })
            }
        };
        self.transition(next)
    }

    /// Handle a line of user text.
    ///
    /// Input is trimmed; empty input is rejected without touching state. In a
    /// multi-step action the answer is stored and either the next field is
    /// prompted or the composed prompt is dispatched.
    pub fn submit_input(&mut self, input: &str) -> Result<InputOutcome, FlowError> {
        self.ensure_idle()?;
        let text = input.trim();
        if text.is_empty() {
            return Err(FlowError::EmptyInput);
        }

        match self.state.clone() {
            ConversationState::FreeChat { category, action } => {
                self.messages.push(ChatMessage::user(text));
                self.dispatch(category, action, text.to_string())
            }
            ConversationState::MultiStep {
                category,
                action,
                step,
                mut answers,
            } => {
                let plan = self
                    .catalog
                    .action(&action)
                    .and_then(|a| a.multi_step.as_ref())
                    .ok_or_else(|| FlowError::UnknownAction(action.clone()))?;
                let field = plan
                    .field(step)
                    .ok_or_else(|| FlowError::InvalidTransition {
                        state: self.state.to_string(),
                        action: "answer",
                    })?;

                answers.insert(field.name.clone(), text.to_string());

                if step < plan.len() {
                    let next_prompt = plan
                        .field(step + 1)
                        .map(|f| f.prompt.clone())
                        .unwrap_or_default();
                    self.messages.push(ChatMessage::user(text));
                    self.transition(ConversationState::MultiStep {
                        category,
                        action,
                        step: step + 1,
                        answers,
                    })?;
                    self.messages.push(ChatMessage::bot(next_prompt));
                    return Ok(InputOutcome::Prompted);
                }

                let prompt = plan.compose(&answers).ok_or_else(|| {
                    FlowError::InvalidTransition {
                        state: self.state.to_string(),
                        action: "compose a prompt",
                    }
                })?;
                tracing::debug!(action = %action, prompt = %prompt, "Composed multi-step prompt");
                self.messages.push(ChatMessage::user(text));
                self.dispatch(category, action, prompt)
            }
            other => Err(FlowError::InvalidTransition {
                state: other.to_string(),
                action: "send text",
            }),
        }
    }

    /// Record the outcome of the dispatched request.
    ///
    /// Appends exactly one bot message and returns to action selection,
    /// whether the request succeeded or failed. Fails without touching the
    /// transcript or state when nothing was dispatched.
    pub fn complete(
        &mut self,
        result: Result<RelayReply, FlowError>,
    ) -> Result<&ChatMessage, FlowError> {
        if !self.loading {
            return Err(FlowError::NoRequestInFlight);
        }
        self.loading = false;

        let message = match result {
            Ok(RelayReply::Success(reply)) => {
                let reference = (!is_blank(&reply.matches)).then(|| format_value(&reply.matches));
                ChatMessage::bot_with_reference(format_response(&reply.response), reference)
            }
            Ok(RelayReply::Failure(failure)) => {
                tracing::warn!(error = %failure.error, "Relay rejected request");
                ChatMessage::bot(format!("Error: {}", failure.error))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Relay request failed");
                ChatMessage::bot(format!("Error: {}", e))
            }
        };

        let next = match self.state.category() {
            Some(category) => ConversationState::SelectAction { category },
            None => ConversationState::SelectCategory,
        };
        tracing::debug!("Conversation state: {} -> {}", self.state, next);
        self.state = next;

        let index = self.messages.len();
        self.messages.push(message);
        Ok(&self.messages[index])
    }

    /// Toggle the reference block of the most recent bot message that has one.
    pub fn toggle_last_reference(&mut self) -> Option<bool> {
        self.messages
            .iter_mut()
            .rev()
            .find(|m| m.has_reference())
            .and_then(ChatMessage::toggle_reference)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn dispatch(
        &mut self,
        category: Category,
        action: String,
        message: String,
    ) -> Result<InputOutcome, FlowError> {
        if self.state.kind() != StateKind::FreeChat {
            self.transition(ConversationState::FreeChat {
                category,
                action: action.clone(),
            })?;
        }
        self.loading = true;
        tracing::info!(category = %category, action = %action, provider = %self.provider, "Dispatching request");
        Ok(InputOutcome::Dispatch(PendingRequest {
            category,
            action,
            message,
            provider: self.provider.clone(),
        }))
    }

    fn transition(&mut self, next: ConversationState) -> Result<(), FlowError> {
        if self.state.kind().can_transition_to(&next.kind()) {
            tracing::debug!("Conversation state: {} -> {}", self.state, next);
            self.state = next;
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                state: self.state.to_string(),
                action: "change state",
            })
        }
    }

    fn ensure_idle(&self) -> Result<(), FlowError> {
        if self.loading {
            Err(FlowError::RequestInFlight)
        } else {
            Ok(())
        }
    }

    fn ensure_kind(&self, kind: StateKind, action: &'static str) -> Result<(), FlowError> {
        if self.state.kind() == kind {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                state: self.state.to_string(),
                action,
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vetllm_core::types::{ErrorResponse, RelayResponse};

    fn controller() -> FlowController {
        FlowController::new(Arc::new(Catalog::builtin()), "Gemini")
    }

    fn dispatched(outcome: InputOutcome) -> PendingRequest {
        match outcome {
            InputOutcome::Dispatch(request) => request,
            other => panic!("expected dispatch, got {:?}", other),
        }
    }

    fn success(response: serde_json::Value, matches: serde_json::Value) -> RelayReply {
        RelayReply::Success(RelayResponse { response, matches })
    }

    #[test]
    fn test_initial_state_lists_categories() {
        let flow = controller();
        assert_eq!(*flow.state(), ConversationState::SelectCategory);
        let labels: Vec<_> = flow.options().into_iter().map(|o| o.label).collect();
        assert_eq!(labels, vec!["Clinical Data", "Disease Symptoms", "Pharma"]);
        assert_eq!(flow.placeholder(), DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_select_category_by_segment_or_label() {
        let mut flow = controller();
        flow.select_category("Disease Symptoms").unwrap();
        assert_eq!(
            *flow.state(),
            ConversationState::SelectAction {
                category: Category::Disease
            }
        );
        let values: Vec<_> = flow.options().into_iter().map(|o| o.value).collect();
        assert_eq!(
            values,
            vec!["describe_clinical_signs", "symptoms", "reverse_symptom_lookup"]
        );

        let mut flow = controller();
        flow.select_category("pharma").unwrap();
        assert_eq!(flow.state().category(), Some(Category::Pharma));
    }

    #[test]
    fn test_unknown_category_and_action() {
        let mut flow = controller();
        assert!(matches!(
            flow.select_category("surgery"),
            Err(FlowError::UnknownCategory(_))
        ));
        flow.select_category("clinical").unwrap();
        // Belongs to another category.
        assert!(matches!(
            flow.select_action("products"),
            Err(FlowError::UnknownAction(_))
        ));
        assert_eq!(flow.state().kind(), StateKind::SelectAction);
    }

    #[test]
    fn test_free_chat_dispatches_verbatim() {
        let mut flow = controller();
        flow.select_category("clinical").unwrap();
        flow.select_action("synonym").unwrap();
        assert_eq!(flow.state().kind(), StateKind::FreeChat);
        assert!(flow.options().is_empty());
        assert_eq!(flow.placeholder(), "Return the disease synonyms for: ");

        let request = dispatched(flow.submit_input("  canine parvovirus ").unwrap());
        assert_eq!(request.path(), "/clinical/synonym");
        assert_eq!(request.message, "canine parvovirus");
        assert_eq!(request.provider, "Gemini");
        assert!(flow.is_loading());
        assert_eq!(flow.messages().len(), 1);
        assert_eq!(flow.messages()[0].text, "canine parvovirus");
    }

    #[test]
    fn test_dose_rate_flow_composes_prompt() {
        let mut flow = controller();
        flow.select_category("pharma").unwrap();
        flow.select_action("calculate_dose_rate").unwrap();
        assert_eq!(flow.messages().last().unwrap().text, "Please enter the drug name:");

        assert_eq!(flow.submit_input("Amoxicillin").unwrap(), InputOutcome::Prompted);
        assert_eq!(flow.messages().last().unwrap().text, "Please enter the species:");
        assert_eq!(flow.submit_input("dog").unwrap(), InputOutcome::Prompted);
        assert_eq!(flow.messages().last().unwrap().text, "Please enter the body weight:");

        let request = dispatched(flow.submit_input("10kg").unwrap());
        assert_eq!(request.message, "Calculate the dose rate of Amoxicillin in a 10kg dog. ");
        assert_eq!(request.path(), "/pharma/calculate_dose_rate");
        assert_eq!(flow.state().kind(), StateKind::FreeChat);
    }

    #[test]
    fn test_mechanism_of_action_flow() {
        let mut flow = controller();
        flow.select_category("pharma").unwrap();
        flow.select_action("mechanism_of_action").unwrap();
        let request = dispatched(flow.submit_input(" Carprofen ").unwrap());
        assert_eq!(request.message, "Return the mechanism of action for the drug Carprofen");
        assert_eq!(request.action, "mechanism_of_action");
    }

    #[test]
    fn test_back_at_step_two_discards_answers() {
        let mut flow = controller();
        flow.select_category("pharma").unwrap();
        flow.select_action("calculate_dose_rate").unwrap();
        flow.submit_input("Amoxicillin").unwrap();
        match flow.state() {
            ConversationState::MultiStep { step, answers, .. } => {
                assert_eq!(*step, 2);
                assert_eq!(answers.get("drugname").map(String::as_str), Some("Amoxicillin"));
            }
            other => panic!("unexpected state {}", other),
        }

        flow.back().unwrap();
        assert_eq!(
            *flow.state(),
            ConversationState::SelectAction {
                category: Category::Pharma
            }
        );

        // Restarting begins from an empty answer set.
        flow.select_action("calculate_dose_rate").unwrap();
        match flow.state() {
            ConversationState::MultiStep { step, answers, .. } => {
                assert_eq!(*step, 1);
                assert!(answers.is_empty());
            }
            other => panic!("unexpected state {}", other),
        }
    }

    #[test]
    fn test_back_levels() {
        let mut flow = controller();
        assert!(matches!(flow.back(), Err(FlowError::InvalidTransition { .. })));
        flow.select_category("disease").unwrap();
        flow.select_action("symptoms").unwrap();
        flow.back().unwrap();
        assert_eq!(flow.state().kind(), StateKind::SelectAction);
        flow.back().unwrap();
        assert_eq!(*flow.state(), ConversationState::SelectCategory);
    }

    #[test]
    fn test_empty_input_is_ignored() {
        let mut flow = controller();
        flow.select_category("clinical").unwrap();
        flow.select_action("prognosis").unwrap();
        assert!(matches!(flow.submit_input("   "), Err(FlowError::EmptyInput)));
        assert!(flow.messages().is_empty());
        assert!(!flow.is_loading());
    }

    #[test]
    fn test_text_rejected_in_menu_states() {
        let mut flow = controller();
        assert!(matches!(
            flow.submit_input("hello"),
            Err(FlowError::InvalidTransition { .. })
        ));
        assert!(flow.messages().is_empty());
    }

    #[test]
    fn test_single_request_in_flight() {
        let mut flow = controller();
        flow.select_category("clinical").unwrap();
        flow.select_action("synonym").unwrap();
        flow.submit_input("mastitis").unwrap();
        assert!(matches!(flow.submit_input("again"), Err(FlowError::RequestInFlight)));
        assert!(matches!(flow.back(), Err(FlowError::RequestInFlight)));
        assert_eq!(flow.messages().len(), 1);
    }

    #[test]
    fn test_complete_formats_list_without_reference() {
        let mut flow = controller();
        flow.select_category("clinical").unwrap();
        flow.select_action("differential_diagnosis").unwrap();
        flow.submit_input("pyrexia").unwrap();

        let message = flow.complete(Ok(success(json!("[\"A\",\"B\"]"), json!("")))).unwrap();
        assert_eq!(message.text, "1. A\n2. B");
        assert!(!message.has_reference());

        assert!(!flow.is_loading());
        assert_eq!(
            *flow.state(),
            ConversationState::SelectAction {
                category: Category::Clinical
            }
        );
    }

    #[test]
    fn test_complete_with_reference() {
        let mut flow = controller();
        flow.select_category("pharma").unwrap();
        flow.select_action("products").unwrap();
        flow.submit_input("Meloxicam").unwrap();

        let message = flow.complete(Ok(success(
            json!("Metacam"),
            json!("Match 1:\nActive Ingredient: Meloxicam"),
        ))).unwrap();
        assert_eq!(message.text, "Metacam");
        assert_eq!(
            message.reference.as_deref(),
            Some("Match 1:\nActive Ingredient: Meloxicam")
        );
        assert_eq!(flow.toggle_last_reference(), Some(true));
    }

    #[test]
    fn test_complete_error_returns_to_action_selection() {
        let mut flow = controller();
        flow.select_category("pharma").unwrap();
        flow.select_action("calculate_dose_rate").unwrap();
        flow.submit_input("Amoxicillin").unwrap();
        flow.submit_input("dog").unwrap();
        flow.submit_input("10kg").unwrap();

        let message = flow
            .complete(Err(FlowError::Transport("connection refused".to_string())))
            .unwrap();
        assert_eq!(message.text, "Error: connection refused");
        assert_eq!(
            *flow.state(),
            ConversationState::SelectAction {
                category: Category::Pharma
            }
        );

        // The session stays usable.
        flow.select_action("indication").unwrap();
        assert!(flow.submit_input("Carprofen").is_ok());
    }

    #[test]
    fn test_complete_without_request_in_flight() {
        let mut flow = controller();
        flow.select_category("clinical").unwrap();
        flow.select_action("synonym").unwrap();

        let result = flow.complete(Ok(success(json!("CPV"), json!(""))));
        assert!(matches!(result, Err(FlowError::NoRequestInFlight)));
        assert!(flow.messages().is_empty());
        assert_eq!(flow.state().kind(), StateKind::FreeChat);

        // A second completion for one dispatch is rejected too.
        flow.submit_input("parvo").unwrap();
        flow.complete(Ok(success(json!("CPV"), json!("")))).unwrap();
        assert!(flow.complete(Ok(success(json!("CPV"), json!("")))).is_err());
        assert_eq!(flow.messages().len(), 2);
    }

    #[test]
    fn test_complete_relay_failure_body() {
        let mut flow = controller();
        flow.select_category("clinical").unwrap();
        flow.select_action("synonym").unwrap();
        flow.submit_input("x").unwrap();
        let message = flow.complete(Ok(RelayReply::Failure(ErrorResponse {
            error: "No message provided".to_string(),
        }))).unwrap();
        assert_eq!(message.text, "Error: No message provided");
    }

    #[test]
    fn test_set_provider_applies_to_next_request() {
        let mut flow = controller();
        flow.set_provider("Ollama");
        flow.select_category("disease").unwrap();
        flow.select_action("symptoms").unwrap();
        let request = dispatched(flow.submit_input("vomiting").unwrap());
        assert_eq!(request.provider, "Ollama");
        assert_eq!(
            request.body(),
            RelayRequest {
                message: Some("vomiting".to_string()),
                query: None,
                provider: Some("Ollama".to_string()),
            }
        );
    }
}

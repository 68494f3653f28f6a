//! Conversation state for the chat flow.
//!
//! Valid transitions:
//! - SelectCategory -> SelectAction (category picked)
//! - SelectAction -> FreeChat (single-prompt action picked)
//! - SelectAction -> MultiStep (multi-step action picked)
//! - MultiStep -> MultiStep (answer stored, next field prompted)
//! - MultiStep -> FreeChat (last answer stored, composed prompt dispatched)
//! - FreeChat -> SelectAction (reply rendered, or back)
//! - MultiStep -> SelectAction (back, answers discarded)
//! - SelectAction -> SelectCategory (back)

use std::collections::BTreeMap;
use std::fmt;

use vetllm_core::Category;

/// Discriminant of `ConversationState`, used for transition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    SelectCategory,
    SelectAction,
    MultiStep,
    FreeChat,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::SelectCategory => write!(f, "SelectCategory"),
            StateKind::SelectAction => write!(f, "SelectAction"),
            StateKind::MultiStep => write!(f, "MultiStep"),
            StateKind::FreeChat => write!(f, "FreeChat"),
        }
    }
}

impl StateKind {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &StateKind) -> bool {
        matches!(
            (self, target),
            (StateKind::SelectCategory, StateKind::SelectAction)
                | (StateKind::SelectAction, StateKind::FreeChat)
                | (StateKind::SelectAction, StateKind::MultiStep)
                | (StateKind::MultiStep, StateKind::MultiStep)
                | (StateKind::MultiStep, StateKind::FreeChat)
                | (StateKind::FreeChat, StateKind::SelectAction)
                // Back transitions
                | (StateKind::MultiStep, StateKind::SelectAction)
                | (StateKind::SelectAction, StateKind::SelectCategory)
        )
    }
}

/// Where the user is in the menu/input flow.
///
/// Exactly one mode is active; the data each mode needs lives in its variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    /// Choosing a top-level category. Initial state.
    #[default]
    SelectCategory,
    /// Choosing an action within `category`.
    SelectAction { category: Category },
    /// Collecting answers for a multi-step action. `step` is 1-based.
    MultiStep {
        category: Category,
        action: String,
        step: usize,
        answers: BTreeMap<String, String>,
    },
    /// Free-text input dispatched verbatim to `/{category}/{action}`.
    FreeChat { category: Category, action: String },
}

impl ConversationState {
    pub fn kind(&self) -> StateKind {
        match self {
            ConversationState::SelectCategory => StateKind::SelectCategory,
            ConversationState::SelectAction { .. } => StateKind::SelectAction,
            ConversationState::MultiStep { .. } => StateKind::MultiStep,
            ConversationState::FreeChat { .. } => StateKind::FreeChat,
        }
    }

    /// Selected category, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            ConversationState::SelectCategory => None,
            ConversationState::SelectAction { category }
            | ConversationState::MultiStep { category, .. }
            | ConversationState::FreeChat { category, .. } => Some(*category),
        }
    }

    /// Selected action key, if any.
    pub fn action(&self) -> Option<&str> {
        match self {
            ConversationState::MultiStep { action, .. }
            | ConversationState::FreeChat { action, .. } => Some(action),
            _ => None,
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationState::SelectCategory => write!(f, "SelectCategory"),
            ConversationState::SelectAction { category } => {
                write!(f, "SelectAction({})", category)
            }
            ConversationState::MultiStep {
                category,
                action,
                step,
                ..
            } => write!(f, "MultiStep({}/{}, step {})", category, action, step),
            ConversationState::FreeChat { category, action } => {
                write!(f, "FreeChat({}/{})", category, action)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(ConversationState::SelectCategory.to_string(), "SelectCategory");
        assert_eq!(
            ConversationState::SelectAction {
                category: Category::Pharma
            }
            .to_string(),
            "SelectAction(pharma)"
        );
        assert_eq!(
            ConversationState::MultiStep {
                category: Category::Pharma,
                action: "calculate_dose_rate".to_string(),
                step: 2,
                answers: BTreeMap::new(),
            }
            .to_string(),
            "MultiStep(pharma/calculate_dose_rate, step 2)"
        );
        assert_eq!(
            ConversationState::FreeChat {
                category: Category::Clinical,
                action: "synonym".to_string(),
            }
            .to_string(),
            "FreeChat(clinical/synonym)"
        );
    }

    #[test]
    fn test_default_is_select_category() {
        assert_eq!(ConversationState::default(), ConversationState::SelectCategory);
        assert_eq!(ConversationState::default().category(), None);
    }

    #[test]
    fn test_accessors() {
        let state = ConversationState::FreeChat {
            category: Category::Disease,
            action: "symptoms".to_string(),
        };
        assert_eq!(state.kind(), StateKind::FreeChat);
        assert_eq!(state.category(), Some(Category::Disease));
        assert_eq!(state.action(), Some("symptoms"));

        let state = ConversationState::SelectAction {
            category: Category::Clinical,
        };
        assert_eq!(state.action(), None);
    }

    #[test]
    fn test_valid_transitions() {
        assert!(StateKind::SelectCategory.can_transition_to(&StateKind::SelectAction));
        assert!(StateKind::SelectAction.can_transition_to(&StateKind::FreeChat));
        assert!(StateKind::SelectAction.can_transition_to(&StateKind::MultiStep));
        assert!(StateKind::MultiStep.can_transition_to(&StateKind::MultiStep));
        assert!(StateKind::MultiStep.can_transition_to(&StateKind::FreeChat));
        assert!(StateKind::FreeChat.can_transition_to(&StateKind::SelectAction));

        // Back transitions
        assert!(StateKind::MultiStep.can_transition_to(&StateKind::SelectAction));
        assert!(StateKind::SelectAction.can_transition_to(&StateKind::SelectCategory));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!StateKind::SelectCategory.can_transition_to(&StateKind::FreeChat));
        assert!(!StateKind::SelectCategory.can_transition_to(&StateKind::MultiStep));
        assert!(!StateKind::SelectCategory.can_transition_to(&StateKind::SelectCategory));
        assert!(!StateKind::FreeChat.can_transition_to(&StateKind::SelectCategory));
        assert!(!StateKind::FreeChat.can_transition_to(&StateKind::MultiStep));
        assert!(!StateKind::MultiStep.can_transition_to(&StateKind::SelectCategory));
    }
}

//! Tests for #[derive(Action)] macro

use serde::{Deserialize, Serialize};
use todo_forms_macros::Action;

#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
enum TodoAction {
    #[command]
    AddTodo { id: u64, content: String },

    #[command]
    ToggleTodo { id: u64 },

    #[command]
    #[action_type("GET_USERS_FETCH")]
    #[serde(rename = "GET_USERS_FETCH")]
    FetchUsers,

    #[event]
    UsersLoaded(Vec<String>),

    ClearAll,
}

#[test]
fn test_default_tags_are_screaming_snake_case() {
    let add = TodoAction::AddTodo {
        id: 1,
        content: "Buy milk".to_string(),
    };
    assert_eq!(add.action_type(), "ADD_TODO");
    assert_eq!(TodoAction::ToggleTodo { id: 1 }.action_type(), "TOGGLE_TODO");
    assert_eq!(TodoAction::UsersLoaded(vec![]).action_type(), "USERS_LOADED");
    assert_eq!(TodoAction::ClearAll.action_type(), "CLEAR_ALL");
}

#[test]
fn test_tag_override() {
    assert_eq!(TodoAction::FetchUsers.action_type(), "GET_USERS_FETCH");
}

#[test]
fn test_action_types_in_declaration_order() {
    assert_eq!(
        TodoAction::ACTION_TYPES,
        &["ADD_TODO", "TOGGLE_TODO", "GET_USERS_FETCH", "USERS_LOADED", "CLEAR_ALL"]
    );
}

#[test]
fn test_is_command() {
    let action = TodoAction::AddTodo {
        id: 1,
        content: "Test".to_string(),
    };
    assert!(action.is_command());
    assert!(!action.is_event());
    assert!(TodoAction::FetchUsers.is_command());
}

#[test]
fn test_is_event() {
    let action = TodoAction::UsersLoaded(vec!["Leanne".to_string()]);
    assert!(!action.is_command());
    assert!(action.is_event());
}

#[test]
fn test_unmarked_variant_is_neither() {
    assert!(!TodoAction::ClearAll.is_command());
    assert!(!TodoAction::ClearAll.is_event());
}

#[test]
fn test_tag_matches_serde_discriminator() {
    let actions = [
        TodoAction::AddTodo {
            id: 7,
            content: "x".to_string(),
        },
        TodoAction::ToggleTodo { id: 7 },
        TodoAction::FetchUsers,
        TodoAction::ClearAll,
    ];

    for action in actions {
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], action.action_type());
    }
}

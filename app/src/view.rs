//! Plain-text renderings of the application state.
//!
//! Each function is a pure projection of a snapshot; callers re-render
//! whenever the store publishes a new one.

use crate::filter::{VisibilityFilter, visible_todos};
use crate::forms::FieldErrors;
use crate::state::AppState;
use crate::users::UsersState;
use std::fmt::Write;

/// The todo list under the current filter, one item per line
///
/// Completed items are marked `[x]`, open ones `[ ]`.
#[must_use]
pub fn render_todo_list(state: &AppState) -> String {
    let visible = visible_todos(&state.todos, state.filter);
    if visible.is_empty() {
        return "  (nothing to show)\n".to_string();
    }

    let mut out = String::new();
    for todo in visible {
        let marker = if todo.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "  [{marker}] {} (#{})", todo.content, todo.id);
    }
    out
}

/// Filter links, with the active one in brackets
#[must_use]
pub fn render_filter_bar(active: VisibilityFilter) -> String {
    let links: Vec<String> = VisibilityFilter::ALL
        .iter()
        .map(|filter| {
            if *filter == active {
                format!("[{filter}]")
            } else {
                filter.to_string()
            }
        })
        .collect();
    format!("Show: {}", links.join(" "))
}

/// The user list, or its loading or error status
#[must_use]
pub fn render_users(users: &UsersState) -> String {
    if users.loading {
        return "Loading users...\n".to_string();
    }
    if let Some(error) = &users.error {
        return format!("Could not load users: {error}\n");
    }
    if users.users.is_empty() {
        return "No users\n".to_string();
    }

    let mut out = String::new();
    for user in users.users.iter() {
        let _ = writeln!(out, "  {} ({})", user.name, user.email);
    }
    out
}

/// Field errors in form order, as `field: message` lines
#[must_use]
pub fn render_field_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    out
}

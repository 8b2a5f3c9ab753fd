//! Todo items, the action creators that build todo actions, and the todo reducer.
//!
//! The todo collection is an `Arc<Vec<_>>`. The reducer only calls
//! [`Arc::make_mut`] when an action actually changes the list, so a list that
//! was already handed to a subscriber is copied rather than mutated, and an
//! action that changes nothing leaves the very same allocation in place.

use crate::filter::VisibilityFilter;
use crate::state::{AppAction, AppEnvironment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use todo_forms_core::{SmallVec, effect::Effect, environment::IdGenerator, reducer::Reducer};

/// Identifier of a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Wraps a raw identifier
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Text entered by the user
    pub content: String,
    /// Whether the todo is done
    pub completed: bool,
}

impl TodoItem {
    /// Creates an incomplete todo
    #[must_use]
    pub const fn new(id: TodoId, content: String) -> Self {
        Self {
            id,
            content,
            completed: false,
        }
    }

    /// Returns a copy with `completed` inverted
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Todo slice of the application state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodosState {
    /// Todos in insertion order
    pub todos: Arc<Vec<TodoItem>>,
}

impl TodosState {
    /// Creates an empty todo list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    /// Returns true if there are no todos
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns the first todo with the given id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Iterates over the todos in order
    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.todos.iter()
    }
}

impl<'a> IntoIterator for &'a TodosState {
    type Item = &'a TodoItem;
    type IntoIter = std::slice::Iter<'a, TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.todos.iter()
    }
}

/// Builds the actions a user interaction dispatches
///
/// Todo ids come from the injected [`IdGenerator`], so two creators sharing a
/// generator never hand out the same id.
#[derive(Clone)]
pub struct ActionCreators {
    ids: Arc<dyn IdGenerator>,
}

impl ActionCreators {
    /// Creates action creators drawing ids from `ids`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// `ADD_TODO` with a freshly assigned id
    pub fn add_todo(&self, content: impl Into<String>) -> AppAction {
        AppAction::AddTodo {
            id: TodoId::new(self.ids.next_id()),
            content: content.into(),
        }
    }

    /// `TOGGLE_TODO`
    #[must_use]
    pub const fn toggle_todo(&self, id: TodoId) -> AppAction {
        AppAction::ToggleTodo { id }
    }

    /// `SET_FILTER`
    #[must_use]
    pub const fn set_filter(&self, filter: VisibilityFilter) -> AppAction {
        AppAction::SetFilter { filter }
    }

    /// `GET_USERS_FETCH`
    #[must_use]
    pub const fn get_users_fetch(&self) -> AppAction {
        AppAction::FetchUsers
    }
}

impl std::fmt::Debug for ActionCreators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionCreators").finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Copy, Debug, Default)]
pub struct TodosReducer;

impl TodosReducer {
    /// Creates a new `TodosReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for TodosReducer {
    type State = TodosState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::AddTodo { id, content } => {
                tracing::debug!(%id, "Adding todo");
                Arc::make_mut(&mut state.todos).push(TodoItem::new(id, content));
            },
            AppAction::ToggleTodo { id } => {
                // Every entry carrying the id flips, like a map over the list
                let hits: Vec<usize> = state
                    .todos
                    .iter()
                    .enumerate()
                    .filter_map(|(index, todo)| (todo.id == id).then_some(index))
                    .collect();

                if hits.is_empty() {
                    tracing::debug!(%id, "Toggle for unknown todo ignored");
                } else {
                    let todos = Arc::make_mut(&mut state.todos);
                    for index in hits {
                        todos[index] = todos[index].toggled();
                    }
                }
            },
            AppAction::SetFilter { .. }
            | AppAction::FetchUsers
            | AppAction::UsersLoaded { .. }
            | AppAction::UsersFetchFailed { .. } => {},
        }

        SmallVec::new()
    }
}

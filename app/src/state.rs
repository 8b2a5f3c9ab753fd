//! Root state, the action protocol and the root reducer.
//!
//! Actions travel as adjacently tagged JSON, `{"type": "ADD_TODO", "payload": {...}}`.
//! The `type` tag of every variant is the same string `action_type()` returns.

use crate::filter::{FilterReducer, VisibilityFilter};
use crate::todos::{TodoId, TodosReducer, TodosState};
use crate::users::{User, UserDirectory, UsersReducer, UsersState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use todo_forms_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use todo_forms_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer};
use todo_forms_macros::Action;
use todo_forms_runtime::Store;

/// Everything that can happen to the shared application state
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppAction {
    // ========== Commands ==========
    /// Command: append a todo
    #[command]
    AddTodo {
        /// Identifier assigned by the action creator
        id: TodoId,
        /// Todo text
        content: String,
    },

    /// Command: flip a todo's completed flag
    #[command]
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Command: change which todos are visible
    #[command]
    SetFilter {
        /// New filter
        filter: VisibilityFilter,
    },

    /// Command: load the user list
    #[command]
    #[action_type("GET_USERS_FETCH")]
    #[serde(rename = "GET_USERS_FETCH")]
    FetchUsers,

    // ========== Events ==========
    /// Event: the user list arrived
    #[event]
    UsersLoaded {
        /// Users as sent by the API
        users: Vec<User>,
    },

    /// Event: the user list could not be loaded
    #[event]
    UsersFetchFailed {
        /// Human-readable failure
        error: String,
    },
}

impl AppAction {
    /// Decode an action from its JSON form
    ///
    /// # Errors
    ///
    /// Returns an error for unknown `type` tags or payloads that do not fit
    /// the tagged variant.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode the action as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The shared application state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Todo list
    pub todos: TodosState,
    /// Visibility filter
    pub filter: VisibilityFilter,
    /// Remote user list
    pub users: UsersState,
}

/// Injected dependencies of the application reducers
#[derive(Clone)]
pub struct AppEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of the user list
    pub users: Arc<dyn UserDirectory>,
}

impl AppEnvironment {
    /// Creates a new `AppEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, users: Arc<dyn UserDirectory>) -> Self {
        Self { clock, users }
    }
}

impl std::fmt::Debug for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppEnvironment").finish_non_exhaustive()
    }
}

/// Root reducer: the todo, filter and user reducers, each on its own slice
#[derive(Clone)]
pub struct AppReducer {
    inner: CombinedReducer<AppState, AppAction, AppEnvironment>,
}

impl AppReducer {
    /// Creates the root reducer
    #[must_use]
    pub fn new() -> Self {
        let inner = combine_reducers(vec![
            Box::new(scope_reducer(
                TodosReducer::new(),
                |s: &AppState| &s.todos,
                |s: &mut AppState, todos| s.todos = todos,
            )),
            Box::new(scope_reducer(
                FilterReducer,
                |s: &AppState| &s.filter,
                |s: &mut AppState, filter| s.filter = filter,
            )),
            Box::new(scope_reducer(
                UsersReducer,
                |s: &AppState| &s.users,
                |s: &mut AppState, users| s.users = users,
            )),
        ]);

        Self { inner }
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppReducer")
            .field("reducers", &self.inner.len())
            .finish()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.action_type(), "Reducing");
        self.inner.reduce(state, action, env)
    }
}

/// Store holding the shared application state
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

//! Todo list, visibility filter, remote user list and three form demos.
//!
//! The todo list, filter and user list share one [`AppStore`]: every user
//! interaction is an [`AppAction`] dispatched to it, and views re-render from
//! the state snapshots it publishes. The form demos in [`forms`] keep their
//! own local state and hand validated values to a completion handler.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_forms_app::{ActionCreators, AppEnvironment, AppState, AppReducer, AppStore};
//! use todo_forms_app::users::HttpUserDirectory;
//! use todo_forms_core::environment::{SequentialIdGenerator, SystemClock};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = HttpUserDirectory::with_defaults()?;
//! let env = AppEnvironment::new(Arc::new(SystemClock), Arc::new(directory));
//! let store = AppStore::new(AppState::default(), AppReducer::new(), env);
//! let actions = ActionCreators::new(Arc::new(SequentialIdGenerator::new()));
//!
//! store.send(actions.add_todo("Buy milk")).await?;
//! let count = store.state(|s| s.todos.len()).await;
//! assert_eq!(count, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod filter;
pub mod forms;
pub mod state;
pub mod todos;
pub mod users;
pub mod view;

pub use filter::{FilterReducer, VisibilityFilter, visible_todos};
pub use state::{AppAction, AppEnvironment, AppReducer, AppState, AppStore};
pub use todos::{ActionCreators, TodoId, TodoItem, TodosReducer, TodosState};
pub use users::{User, UserDirectory, UsersError, UsersReducer, UsersState};

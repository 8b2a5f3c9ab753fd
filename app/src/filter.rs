//! Visibility filter for the todo list.

use crate::state::{AppAction, AppEnvironment};
use crate::todos::{TodoItem, TodosState};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use todo_forms_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Which todos the list shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityFilter {
    /// Every todo
    #[default]
    All,
    /// Only completed todos
    Completed,
    /// Only todos still open
    Incomplete,
}

impl VisibilityFilter {
    /// All filters, in the order the filter bar shows them
    pub const ALL: [Self; 3] = [Self::All, Self::Completed, Self::Incomplete];

    /// Wire name of the filter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
        }
    }

    /// Returns true if `todo` is shown under this filter
    #[must_use]
    pub const fn matches(self, todo: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Completed => todo.completed,
            Self::Incomplete => !todo.completed,
        }
    }
}

impl std::fmt::Display for VisibilityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown filter name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown visibility filter: {0}")]
pub struct ParseFilterError(String);

impl FromStr for VisibilityFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "incomplete" | "active" => Ok(Self::Incomplete),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// Todos visible under `filter`, in list order
#[must_use]
pub fn visible_todos(todos: &TodosState, filter: VisibilityFilter) -> Vec<&TodoItem> {
    todos.iter().filter(|todo| filter.matches(todo)).collect()
}

/// Reducer for the visibility filter
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterReducer;

impl Reducer for FilterReducer {
    type State = VisibilityFilter;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if let AppAction::SetFilter { filter } = action {
            tracing::debug!(from = %state, to = %filter, "Changing visibility filter");
            *state = filter;
        }
        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todos::TodoId;
    use crate::users::StaticUserDirectory;
    use std::sync::Arc;
    use todo_forms_testing::{ReducerTest, test_clock};

    fn todos() -> TodosState {
        let mut done = TodoItem::new(TodoId::new(2), "done".to_string());
        done.completed = true;
        TodosState {
            todos: Arc::new(vec![
                TodoItem::new(TodoId::new(1), "open".to_string()),
                done,
                TodoItem::new(TodoId::new(3), "also open".to_string()),
            ]),
        }
    }

    #[test]
    fn visible_todos_respects_filter_and_order() {
        let todos = todos();

        let ids = |filter| {
            visible_todos(&todos, filter)
                .into_iter()
                .map(|t| t.id.get())
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(VisibilityFilter::All), vec![1, 2, 3]);
        assert_eq!(ids(VisibilityFilter::Completed), vec![2]);
        assert_eq!(ids(VisibilityFilter::Incomplete), vec![1, 3]);
    }

    #[test]
    fn set_filter_replaces_filter() {
        ReducerTest::new(FilterReducer)
            .with_env(AppEnvironment::new(
                Arc::new(test_clock()),
                Arc::new(StaticUserDirectory::empty()),
            ))
            .given_state(VisibilityFilter::All)
            .when_actions([
                AppAction::SetFilter {
                    filter: VisibilityFilter::Completed,
                },
                AppAction::FetchUsers,
            ])
            .then_state(|filter| assert_eq!(*filter, VisibilityFilter::Completed))
            .run();
    }

    #[test]
    fn parses_names_and_alias() {
        assert_eq!("all".parse(), Ok(VisibilityFilter::All));
        assert_eq!(" Completed ".parse(), Ok(VisibilityFilter::Completed));
        assert_eq!("active".parse(), Ok(VisibilityFilter::Incomplete));
        assert!("done".parse::<VisibilityFilter>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&VisibilityFilter::Incomplete).unwrap(),
            "\"incomplete\""
        );
        for filter in VisibilityFilter::ALL {
            assert_eq!(filter.to_string(), filter.as_str());
        }
    }
}

//! Remote user list.
//!
//! The user collection belongs to the remote API: the fields the list view
//! shows are typed, everything else is carried through untouched.

use crate::state::{AppAction, AppEnvironment};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use todo_forms_core::{DateTime, SmallVec, Utc, effect::Effect, reducer::Reducer, smallvec};
use todo_forms_runtime::telemetry::UsersMetrics;

/// Default user list endpoint
pub const DEFAULT_USERS_API_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// A user as returned by the remote API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Remote identifier, kept in whatever JSON form the API uses
    #[serde(default)]
    pub id: serde_json::Value,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login handle
    #[serde(default)]
    pub username: String,
    /// Contact address
    #[serde(default)]
    pub email: String,
    /// Any other fields the API sent
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Errors from fetching the user list
#[derive(Debug, Error)]
pub enum UsersError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// API answered with a non-success status
    #[error("API error (status {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Response body was not a user list
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

/// Source of the user list
pub trait UserDirectory: Send + Sync {
    /// Fetch every user
    ///
    /// # Errors
    ///
    /// Returns a [`UsersError`] if the users cannot be retrieved.
    fn fetch_users(&self) -> BoxFuture<'_, Result<Vec<User>, UsersError>>;
}

/// [`UserDirectory`] backed by an HTTP JSON endpoint
#[derive(Clone, Debug)]
pub struct HttpUserDirectory {
    client: Client,
    url: String,
}

impl HttpUserDirectory {
    /// Create a directory reading from `url` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`UsersError::RequestFailed`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, UsersError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UsersError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Directory for [`DEFAULT_USERS_API_URL`] with a 10 second timeout
    ///
    /// # Errors
    ///
    /// Returns [`UsersError::RequestFailed`] if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self, UsersError> {
        Self::new(DEFAULT_USERS_API_URL, Duration::from_secs(10))
    }

    /// The endpoint this directory reads from
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn get_users(&self) -> Result<Vec<User>, UsersError> {
        tracing::debug!(url = %self.url, "Fetching users");

        let response = self
            .client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| UsersError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UsersError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<User>>()
            .await
            .map_err(|e| UsersError::Decode(e.to_string()))
    }
}

impl UserDirectory for HttpUserDirectory {
    fn fetch_users(&self) -> BoxFuture<'_, Result<Vec<User>, UsersError>> {
        Box::pin(self.get_users())
    }
}

/// In-memory [`UserDirectory`] serving a fixed answer
///
/// Counts how often it was asked, which lets tests check that a fetch
/// happened exactly once.
#[derive(Debug)]
pub struct StaticUserDirectory {
    answer: Result<Vec<User>, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticUserDirectory {
    /// Serves `users` on every fetch
    #[must_use]
    pub const fn with_users(users: Vec<User>) -> Self {
        Self {
            answer: Ok(users),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Serves an empty list
    #[must_use]
    pub const fn empty() -> Self {
        Self::with_users(Vec::new())
    }

    /// Fails every fetch with [`UsersError::RequestFailed`]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(message.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Waits `delay` before answering
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches served so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StaticUserDirectory {
    fn default() -> Self {
        Self::empty()
    }
}

impl UserDirectory for StaticUserDirectory {
    fn fetch_users(&self) -> BoxFuture<'_, Result<Vec<User>, UsersError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.answer
                .clone()
                .map_err(UsersError::RequestFailed)
        })
    }
}

/// User list slice of the application state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersState {
    /// Users from the last successful fetch
    pub users: Arc<Vec<User>>,
    /// A fetch is in flight
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next success
    pub error: Option<String>,
    /// When the current list arrived
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Reducer for the user list
///
/// `GET_USERS_FETCH` starts a fetch through the environment's
/// [`UserDirectory`]; the result comes back as `UsersLoaded` or
/// `UsersFetchFailed`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UsersReducer;

impl Reducer for UsersReducer {
    type State = UsersState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::FetchUsers => {
                state.loading = true;

                let directory = Arc::clone(&env.users);
                smallvec![Effect::future(async move {
                    match directory.fetch_users().await {
                        Ok(users) => {
                            UsersMetrics::record_success();
                            tracing::info!(count = users.len(), "Users fetched");
                            Some(AppAction::UsersLoaded { users })
                        },
                        Err(error) => {
                            UsersMetrics::record_failure();
                            tracing::warn!(%error, "User fetch failed");
                            Some(AppAction::UsersFetchFailed {
                                error: error.to_string(),
                            })
                        },
                    }
                })]
            },
            AppAction::UsersLoaded { users } => {
                state.users = Arc::new(users);
                state.loading = false;
                state.error = None;
                state.fetched_at = Some(env.clock.now());
                SmallVec::new()
            },
            AppAction::UsersFetchFailed { error } => {
                state.loading = false;
                state.error = Some(error);
                SmallVec::new()
            },
            AppAction::AddTodo { .. } | AppAction::ToggleTodo { .. } | AppAction::SetFilter { .. } => {
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_forms_core::environment::Clock;
    use todo_forms_testing::{ReducerTest, assertions, test_clock};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn leanne() -> User {
        User {
            id: 1.into(),
            name: "Leanne Graham".to_string(),
            username: "Bret".to_string(),
            email: "Sincere@april.biz".to_string(),
            extra: serde_json::Map::new(),
        }
    }

    fn env_with(directory: StaticUserDirectory) -> AppEnvironment {
        AppEnvironment::new(Arc::new(test_clock()), Arc::new(directory))
    }

    #[test]
    fn fetch_sets_loading_and_returns_future() {
        ReducerTest::new(UsersReducer)
            .with_env(env_with(StaticUserDirectory::empty()))
            .given_state(UsersState::default())
            .when_action(AppAction::FetchUsers)
            .then_state(|state| assert!(state.loading))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn loaded_stores_users_and_timestamp() {
        ReducerTest::new(UsersReducer)
            .with_env(env_with(StaticUserDirectory::empty()))
            .given_state(UsersState {
                loading: true,
                error: Some("earlier failure".to_string()),
                ..UsersState::default()
            })
            .when_action(AppAction::UsersLoaded {
                users: vec![leanne()],
            })
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.error, None);
                assert_eq!(state.users.as_slice(), &[leanne()]);
                assert_eq!(state.fetched_at, Some(test_clock().now()));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failure_keeps_previous_users() {
        ReducerTest::new(UsersReducer)
            .with_env(env_with(StaticUserDirectory::empty()))
            .given_state(UsersState {
                users: Arc::new(vec![leanne()]),
                loading: true,
                ..UsersState::default()
            })
            .when_action(AppAction::UsersFetchFailed {
                error: "Request failed: offline".to_string(),
            })
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.error.as_deref(), Some("Request failed: offline"));
                assert_eq!(state.users.len(), 1);
            })
            .run();
    }

    #[tokio::test]
    async fn fetch_effect_yields_loaded_action() {
        let mut state = UsersState::default();
        let env = env_with(StaticUserDirectory::with_users(vec![leanne()]));

        let mut effects = UsersReducer.reduce(&mut state, AppAction::FetchUsers, &env);
        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("fetch always returns a future effect");
        };

        assert_eq!(
            fut.await,
            Some(AppAction::UsersLoaded {
                users: vec![leanne()]
            })
        );
    }

    #[tokio::test]
    async fn fetch_effect_yields_failure_action() {
        let mut state = UsersState::default();
        let env = env_with(StaticUserDirectory::failing("connection refused"));

        let mut effects = UsersReducer.reduce(&mut state, AppAction::FetchUsers, &env);
        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("fetch always returns a future effect");
        };

        assert_eq!(
            fut.await,
            Some(AppAction::UsersFetchFailed {
                error: "Request failed: connection refused".to_string()
            })
        );
    }

    #[tokio::test]
    async fn http_directory_decodes_and_keeps_extra_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": 1,
                "name": "Leanne Graham",
                "username": "Bret",
                "email": "Sincere@april.biz",
                "phone": "1-770-736-8031 x56442",
                "address": { "city": "Gwenborough" }
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let directory =
            HttpUserDirectory::new(format!("{}/users", server.uri()), Duration::from_secs(5)).unwrap();
        let users = directory.fetch_users().await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "Bret");
        assert_eq!(users[0].extra["phone"], "1-770-736-8031 x56442");
        assert_eq!(users[0].extra["address"]["city"], "Gwenborough");
    }

    #[tokio::test]
    async fn http_directory_accepts_any_id_shape_and_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(203).set_body_json(serde_json::json!([
                { "id": "usr_9f2", "name": "Ervin Howell" },
                { "username": "Samantha" }
            ])))
            .mount(&server)
            .await;

        let directory = HttpUserDirectory::new(server.uri(), Duration::from_secs(5)).unwrap();
        let users = directory.fetch_users().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, "usr_9f2");
        assert_eq!(users[0].name, "Ervin Howell");
        assert!(users[1].id.is_null());
        assert_eq!(users[1].name, "");
        assert_eq!(users[1].username, "Samantha");
    }

    #[tokio::test]
    async fn http_directory_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let directory = HttpUserDirectory::new(server.uri(), Duration::from_secs(5)).unwrap();
        let error = directory.fetch_users().await.unwrap_err();

        assert!(matches!(
            error,
            UsersError::Status { status: 503, ref body } if body == "maintenance"
        ));
    }

    #[tokio::test]
    async fn http_directory_reports_decode_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let directory = HttpUserDirectory::new(server.uri(), Duration::from_secs(5)).unwrap();

        assert!(matches!(
            directory.fetch_users().await,
            Err(UsersError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn static_directory_counts_calls() {
        let directory = StaticUserDirectory::with_users(vec![leanne()]);
        assert_eq!(directory.calls(), 0);

        let _ = directory.fetch_users().await;
        let _ = directory.fetch_users().await;

        assert_eq!(directory.calls(), 2);
    }
}

//! # todo-forms testing
//!
//! Testing utilities and helpers for todo-forms.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Helpers for awaiting store state in async tests
//! - proptest strategies for user-entered text
//!
//! ## Example
//!
//! ```ignore
//! use todo_forms_testing::{helpers::wait_for_state, test_clock};
//!
//! #[tokio::test]
//! async fn users_arrive() {
//!     let store = AppStore::new(AppState::default(), AppReducer::new(), env);
//!     store.send(AppAction::FetchUsers).await?;
//!
//!     let state = wait_for_state(&store, |s| !s.users.loading, Duration::from_secs(1))
//!         .await
//!         .unwrap();
//!     assert_eq!(state.users.users.len(), 10);
//! }
//! ```

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use todo_forms_core::environment::Clock;


/// Mock implementations for testing.
pub mod mocks {
    use super::{ChronoDuration, Clock, DateTime, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_forms_testing::mocks::FixedClock;
    /// use todo_forms_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step every time it is read
    ///
    /// The first reading is the start time.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: ChronoDuration,
    }

    impl SteppingClock {
        /// Create a clock starting at `start` and advancing by `step`
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: ChronoDuration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Helpers for async store tests.
pub mod helpers {
    use std::time::Duration;
    use todo_forms_core::reducer::Reducer;
    use todo_forms_runtime::Store;

    /// Wait until the store's state satisfies `predicate`, returning a snapshot
    ///
    /// Checks the current snapshot first, then every published snapshot.
    /// Returns `None` on timeout.
    pub async fn wait_for_state<S, A, E, R, F>(
        store: &Store<S, A, E, R>,
        predicate: F,
        timeout: Duration,
    ) -> Option<S>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
        F: Fn(&S) -> bool,
    {
        let mut rx = store.subscribe();

        tokio::time::timeout(timeout, async {
            loop {
                {
                    let snapshot = rx.borrow_and_update();
                    if predicate(&snapshot) {
                        return Some(snapshot.clone());
                    }
                }
                rx.changed().await.ok()?;
            }
        })
        .await
        .ok()
        .flatten()
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Text a user might type into a todo or name field (may be empty)
    pub fn user_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,!?-]{0,40}"
    }

    /// Non-empty text with at least one non-space character
    pub fn non_blank_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9][a-zA-Z0-9 ]{0,30}"
    }

    /// Addresses matching `local@domain.tld`
    pub fn well_formed_email() -> impl Strategy<Value = String> {
        ("[a-z0-9._%+-]{1,12}", "[a-z0-9-]{1,12}", "[a-z]{2,6}")
            .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SteppingClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};

//! Prometheus metrics for the Store and the features built on it.
//!
//! Metrics are recorded through the `metrics` facade everywhere; this module
//! installs the Prometheus recorder once per process and renders its text
//! exposition on demand.
//!
//! # Example
//!
//! ```rust,no_run
//! use todo_forms_runtime::telemetry::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = MetricsRecorder::install()?;
//! // ... run the application ...
//! println!("{}", recorder.render());
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use thiserror::Error;

pub use metrics::{counter, histogram};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build the Prometheus recorder
    #[error("Failed to build metrics recorder: {0}")]
    Build(String),
    /// Another recorder owns the global slot
    #[error("A different metrics recorder is already installed")]
    ForeignRecorder,
}

/// Handle to the process-wide Prometheus recorder.
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// Install the recorder, or return the one already installed.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Build`] if the exporter cannot be configured and
    /// [`MetricsError::ForeignRecorder`] if some other recorder was installed
    /// first.
    pub fn install() -> Result<Self, MetricsError> {
        if let Some(handle) = HANDLE.get() {
            return Ok(Self {
                handle: handle.clone(),
            });
        }

        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                let handle = HANDLE.get_or_init(|| handle).clone();
                tracing::debug!("Prometheus recorder installed");
                Ok(Self { handle })
            },
            Err(BuildError::FailedToSetGlobalRecorder(_)) => {
                // Lost a race with another install in this process
                HANDLE
                    .get()
                    .map(|handle| Self {
                        handle: handle.clone(),
                    })
                    .ok_or(MetricsError::ForeignRecorder)
            },
            Err(e) => Err(MetricsError::Build(e.to_string())),
        }
    }

    /// Render current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder").finish_non_exhaustive()
    }
}

fn register_metrics() {
    // Store
    describe_counter!("store.commands.total", "Actions dispatched to a store");
    describe_counter!(
        "store.effects.executed",
        "Effects executed by the store, labelled by effect type"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time spent inside the reducer per dispatch"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );

    // Features
    describe_counter!(
        "users.fetch.total",
        "Remote user directory fetches, labelled by outcome"
    );
    describe_counter!("forms.submitted.total", "Form submissions that passed validation");
    describe_counter!("forms.rejected.total", "Form submissions blocked by validation errors");
}

/// Remote user fetch metrics recorder.
pub struct UsersMetrics;

impl UsersMetrics {
    /// Record a successful fetch.
    pub fn record_success() {
        counter!("users.fetch.total", "outcome" => "success").increment(1);
    }

    /// Record a failed fetch.
    pub fn record_failure() {
        counter!("users.fetch.total", "outcome" => "failure").increment(1);
    }
}

/// Form submission metrics recorder.
pub struct FormMetrics;

impl FormMetrics {
    /// Record a submission that reached the submit handler.
    pub fn record_submitted(form: &'static str) {
        counter!("forms.submitted.total", "form" => form).increment(1);
    }

    /// Record a submission blocked by validation.
    pub fn record_rejected(form: &'static str) {
        counter!("forms.rejected.total", "form" => form).increment(1);
    }
}

//! todo-forms binary
//!
//! Drives the todo list, the remote user list and the three form demos
//! through the same calls a UI would make, printing each view as it
//! re-renders.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use todo_forms_app::config::Config;
use todo_forms_app::forms::{ContactForm, FieldName, FormValues, MultipleEntryForm, ReduxForm};
use todo_forms_app::users::HttpUserDirectory;
use todo_forms_app::view::{render_field_errors, render_filter_bar, render_todo_list, render_users};
use todo_forms_app::{
    ActionCreators, AppAction, AppEnvironment, AppReducer, AppState, AppStore, VisibilityFilter,
};
use todo_forms_core::environment::{SequentialIdGenerator, SystemClock};
use todo_forms_runtime::StoreConfig;
use todo_forms_runtime::telemetry::MetricsRecorder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_forms=info,todo_forms_app=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(?config, "Configuration loaded");

    let metrics = if config.print_metrics {
        Some(MetricsRecorder::install().context("installing metrics recorder")?)
    } else {
        None
    };

    let directory = HttpUserDirectory::new(config.users_api_url.clone(), config.users_fetch_timeout)
        .context("building user directory client")?;
    let env = AppEnvironment::new(Arc::new(SystemClock), Arc::new(directory));
    let store = AppStore::with_config(
        AppState::default(),
        AppReducer::new(),
        env,
        StoreConfig::default()
            .with_broadcast_capacity(config.store_broadcast_capacity)
            .with_shutdown_timeout(config.shutdown_timeout),
    );

    // Re-render on every published snapshot
    let mut snapshots = store.subscribe();
    let view = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let state = snapshots.borrow_and_update().clone();
            println!("{}", render_filter_bar(state.filter));
            print!("{}", render_todo_list(&state));
        }
    });

    let actions = ActionCreators::new(Arc::new(SequentialIdGenerator::new()));
    run_todos(&store, &actions).await?;
    run_users(&store, &actions, &config).await;

    run_contact_form(&config);
    run_redux_form();
    run_multiple_entry_form();

    if let Some(metrics) = metrics {
        println!("\n=== Metrics ===\n{}", metrics.render());
    }

    store.close().await.context("store shutdown")?;
    drop(store);
    match tokio::time::timeout(Duration::from_secs(1), view).await {
        Ok(Ok(())) => {},
        Ok(Err(error)) => tracing::warn!(%error, "View task ended abnormally"),
        Err(_) => tracing::debug!("View task still subscribed at exit"),
    }

    Ok(())
}

async fn run_todos(store: &AppStore, actions: &ActionCreators) -> anyhow::Result<()> {
    println!("=== Todos ===");

    let milk = actions.add_todo("Buy milk");
    let milk_id = match &milk {
        AppAction::AddTodo { id, .. } => Some(*id),
        _ => None,
    };
    store.send(milk).await?;
    store.send(actions.add_todo("Walk the dog")).await?;
    store.send(actions.add_todo("Write letters")).await?;

    if let Some(id) = milk_id {
        store.send(actions.toggle_todo(id)).await?;
    }

    for filter in [VisibilityFilter::Completed, VisibilityFilter::Incomplete, VisibilityFilter::All] {
        store.send(actions.set_filter(filter)).await?;
    }

    Ok(())
}

async fn run_users(store: &AppStore, actions: &ActionCreators, config: &Config) {
    println!("\n=== Users ===");

    let outcome = store
        .send_and_wait_for(
            actions.get_users_fetch(),
            |action| {
                matches!(
                    action,
                    AppAction::UsersLoaded { .. } | AppAction::UsersFetchFailed { .. }
                )
            },
            config.users_fetch_timeout,
        )
        .await;

    if let Err(error) = outcome {
        tracing::warn!(%error, "User fetch did not complete");
    }

    let users = store.state(|s| s.users.clone()).await;
    print!("{}", render_users(&users));
}

fn run_contact_form(config: &Config) {
    println!("\n=== Contact form ===");
    let mut form = ContactForm::new(config.validation_mode);

    if let Err(errors) = form.submit(|_| {}) {
        println!("Submit rejected:");
        print!("{}", render_field_errors(&errors));
    }

    let second = form.add_phone_number();
    let entries: Vec<_> = form.phone_numbers().map(|(key, _)| key).collect();
    tracing::debug!(?entries, added = %second, "Phone number entries");

    let edits = [
        (FieldName::Username, "ada"),
        (FieldName::Email, "ada@example.org"),
        (FieldName::Channel, "lovelace"),
        (FieldName::PhoneNumber(0), "+44 20 7946 0000"),
        (FieldName::PhoneNumber(1), "+44 20 7946 0001"),
    ];
    for (field, value) in edits {
        if let Err(error) = form.set_value(&field, value) {
            tracing::warn!(%error, "Contact form edit rejected");
        }
    }

    match form.submit(|values| println!("Submitted: {values:?}")) {
        Ok(()) => {},
        Err(errors) => print!("{}", render_field_errors(&errors)),
    }
}

fn run_redux_form() {
    println!("\n=== Redux form ===");
    let mut form = ReduxForm::contact();
    form.change("firstName", "Grace");
    form.change("lastName", "Hopper");
    form.change("email", "grace@example.org");
    form.blur("email");

    let show_value = |values: FormValues| {
        tracing::info!(?values, "values in parent");
        println!("values in parent = {values:?}");
    };
    if let Err(errors) = form.submit(show_value) {
        print!("{}", render_field_errors(&errors));
    }
}

fn run_multiple_entry_form() {
    println!("\n=== Multiple entry form ===");
    let mut form = MultipleEntryForm::new();
    form.add_entry();

    let rows = [("Ada", "ada@example.org"), ("Grace", "grace@example.org")];
    for (index, (name, email)) in rows.into_iter().enumerate() {
        let edited = form
            .set_name(index, name)
            .and_then(|()| form.set_email(index, email));
        if let Err(error) = edited {
            tracing::warn!(%error, "Entry edit rejected");
        }
    }

    form.submit(|entries| println!("Submitted {} entries: {entries:?}", entries.len()));
}

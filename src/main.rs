//! Quiz random play binary entrypoint wiring the REST layer, sessions and the quiz store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use quiz_random_play::{
    AppConfig,
    dao::{
        quiz_store::{QuizStore, memory::MemoryQuizStore},
        storage::StorageError,
    },
    routes,
    services::{session_reaper, storage_supervisor},
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    spawn_quiz_store_supervisor(app_state.clone())?;
    tokio::spawn(session_reaper::run(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start the supervisor installing the quiz backend selected by `QUIZ_STORE`.
fn spawn_quiz_store_supervisor(state: SharedState) -> anyhow::Result<()> {
    let backend = env::var("QUIZ_STORE").unwrap_or_else(|_| "memory".into());
    info!(backend = %backend, "selecting quiz store backend");

    match backend.as_str() {
        "memory" => {
            let path = state.config().catalog_path().clone();
            tokio::spawn(storage_supervisor::run(state, move || {
                let path = path.clone();
                async move {
                    let store = MemoryQuizStore::from_file(&path)
                        .map_err(|err| StorageError::unavailable("cannot load quiz catalog", err))?;
                    Ok::<_, StorageError>(Arc::new(store) as Arc<dyn QuizStore>)
                }
            }));
            Ok(())
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use quiz_random_play::dao::quiz_store::mongodb::MongoQuizStore;

            let uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
            let db_name = env::var("MONGO_DB").ok();
            tokio::spawn(storage_supervisor::run(state, move || {
                let uri = uri.clone();
                let db_name = db_name.clone();
                async move {
                    let store = MongoQuizStore::connect(&uri, db_name.as_deref()).await?;
                    Ok::<_, StorageError>(Arc::new(store) as Arc<dyn QuizStore>)
                }
            }));
            Ok(())
        }
        other => anyhow::bail!("unsupported QUIZ_STORE backend `{other}`"),
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

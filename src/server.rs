use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{create_pool, migrations, DbPool};
use crate::error::AppResult;
use crate::handlers;
use crate::services::charts;
use crate::services::data_access::SalesRepository;
use crate::state::AppState;

/// Build the application state and Axum router from a [`Config`].
///
/// Registers the configured chart font, creates the database pool, runs
/// migrations and assembles the middleware stack. Returns the shared state
/// and a ready-to-serve router.
pub fn build_app(config: Config) -> AppResult<(AppState, Router)> {
    if let Some(font) = &config.chart_font {
        charts::register_chart_font(font)?;
    }

    let db = create_pool(&config.database_path, config.pool_size)?;

    {
        let conn = db.get()?;
        migrations::run_migrations(&conn, &config.migrations_path)?;
    }

    let state = build_state(db, config);
    Ok((state.clone(), router(state)))
}

/// Shared state over an existing pool, with the repository configured from
/// `config`.
pub fn build_state(db: DbPool, config: Config) -> AppState {
    let repo = SalesRepository::new(db, config.excluded_members.clone(), config.strict_store);
    AppState::new(repo, config)
}

/// Routes, static files and the HTTP middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::routes())
        .nest_service("/static", ServeDir::new(&state.config.static_path))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((actual_port, handle))
}

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gym_admin::{
    api,
    backend::{Backend, MemoryBackend},
    config::{BackendKind, Settings},
    domain::Role,
    seed,
    service::ServiceContext,
};

const SESSION_CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gym_admin=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting gym admin on {}", settings.bind_address());

    // Session store
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let backend = match settings.backend.kind {
        BackendKind::Rest => {
            tracing::info!("Using hosted backend at {}", settings.backend.url);
            Backend::rest(&settings.backend)?
        }
        BackendKind::Memory => {
            let memory = Arc::new(MemoryBackend::new());
            memory
                .register_user(
                    &settings.backend.demo_admin_email,
                    &settings.backend.demo_admin_password,
                    Role::Admin,
                )
                .await?;
            seed::seed_demo_data(memory.as_ref(), settings.backend.demo_members).await?;

            tracing::warn!(
                "Running with the in-memory demo backend; data is lost on exit. Sign in as {}",
                settings.backend.demo_admin_email
            );
            Backend::memory(memory)
        }
    };

    let service_context = Arc::new(ServiceContext::new(backend, db_pool, &settings));

    // Expired sessions are also purged at each login.
    let auth_service = service_context.auth_service.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match auth_service.cleanup_expired_sessions().await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!("Purged {} expired sessions", purged),
                Err(e) => tracing::warn!("Session cleanup failed: {}", e),
            }
        }
    });

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;

    tracing::info!("Server listening on {}", settings.server.base_url);

    axum::serve(listener, app).await?;

    Ok(())
}

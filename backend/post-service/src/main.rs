use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use db_pool::create_pool;
use post_service::config::{Config, StorageBackend};
use post_service::db::{self, InMemoryStore, PgPostRepository, PgUserRepository};
use post_service::handlers::{self, HealthState};
use post_service::openapi::ApiDoc;
use post_service::PostService;
use sqlx::PgPool;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> actix_web::Result<HttpResponse> {
    let body = serde_json::to_string(&*doc).map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable ({}), waiting for Ctrl+C", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Connect to PostgreSQL, apply migrations and seed as configured.
async fn connect_postgres(config: &Config) -> io::Result<PgPool> {
    let db_cfg = &config.database;
    db_cfg.pool.log_config();

    let pool = create_pool(&db_cfg.pool).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("Failed to create database pool: {e}"),
        )
    })?;

    if db_cfg.run_migrations {
        db::run_migrations(&pool)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("{e:#}")))?;
    }

    if db_cfg.seed_demo_users {
        db::seed::seed_demo_users(&pool)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("{e:#}")))?;
    }

    Ok(pool)
}

/// Post Service
///
/// Serves the Posterr feed: listing, posting and reposting, with a per-user
/// daily limit.
///
/// # Routes
///
/// - `GET  /api/posts` - paginated feed (`page`, `limit`, `sort`, `search`)
/// - `POST /api/posts` - create a post as `X-User-ID`
/// - `POST /api/posts/{post_id}/repost` - repost as `X-User-ID`
/// - `GET  /api/users` - users available to act as
/// - `/api/health*`, `/metrics`, `/api/openapi.json`, `/swagger-ui/`
///
/// # Storage
///
/// `POST_STORAGE=postgres` (default) uses the `db-pool` crate and the
/// embedded migrations; `POST_STORAGE=memory` keeps everything in process.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("WARNING: failed to load .env: {}", e);
        }
    }

    init_tracing();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting post-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        env = %config.app.env,
        storage = %config.storage,
        daily_post_limit = config.limits.daily_post_limit,
        "Configuration loaded"
    );

    let (service, health_state) = match config.storage {
        StorageBackend::Postgres => {
            let pool = match connect_postgres(&config).await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!("Database initialization failed: {}", e);
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            };
            tracing::info!("Connected to database via db-pool crate");

            let service = PostService::new(
                Arc::new(PgPostRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool.clone())),
                config.limits,
            );
            (service, HealthState::new(Some(pool)))
        }
        StorageBackend::Memory => {
            let store = InMemoryStore::new();
            if config.database.seed_demo_users {
                let seeded = store.seed_demo_users().await;
                tracing::info!(count = seeded.len(), "Seeded in-memory demo users");
            }
            tracing::warn!("Using in-memory storage; data is lost on shutdown");

            let service = PostService::new(
                Arc::new(store.clone()),
                Arc::new(store),
                config.limits,
            );
            (service, HealthState::new(None))
        }
    };

    let service = web::Data::from(Arc::new(service));
    let health_state = web::Data::new(health_state);

    let bind_address = config.bind_address();
    let allowed_origins = config.cors.allowed_origins.clone();
    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin.is_empty() {
                continue;
            }
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let openapi_doc = ApiDoc::openapi();

        App::new()
            .app_data(web::Data::new(openapi_doc.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url(ApiDoc::openapi_json_path(), openapi_doc.clone()),
            )
            .route(ApiDoc::openapi_json_path(), web::get().to(openapi_json))
            .app_data(service.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(post_service::metrics::serve_metrics))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tokio::select! {
        result = server_task => {
            tracing::info!("post-service shutting down");
            return match result {
                Ok(inner) => inner,
                Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
            };
        }
        _ = &mut shutdown => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    tracing::info!("post-service shutting down");
    Ok(())
}

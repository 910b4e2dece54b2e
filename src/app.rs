use std::sync::Arc;

use axum::{Extension, Router};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::mail::{LogMailer, Mailer};
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;

/// The assembled ExamBook auth application.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    pub mailer: Arc<dyn Mailer>,
}

impl App {
    /// Create an application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Create an application with a given config.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        tracing::info!("Running pending database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations complete.");

        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.mail_sender.clone()));

        Ok(App { config, db, mailer })
    }

    /// Replace the notification sink (tests install a recording mailer).
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Re-run pending migrations (idempotent).
    pub async fn run_migrations(&self) -> Result<(), sea_orm::DbErr> {
        Migrator::up(&self.db, None).await
    }

    /// Build the axum router with all layers applied.
    pub fn router(&self) -> Router {
        let state = AppState {
            db: self.db.clone(),
            config: self.config.clone(),
            mailer: self.mailer.clone(),
        };

        Router::new()
            .nest("/api/auth", controllers::auth::routes())
            .with_state(state)
            .merge(Scalar::with_url("/api-docs", ApiDoc::openapi()))
            .layer(Extension(Arc::new(self.config.clone())))
            .layer(Extension(self.db.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CorsLayer::permissive())
    }

    /// Bind and serve until shutdown.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.config.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

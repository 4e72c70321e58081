use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::web::{Data, ServiceConfig};
use actix_web::{App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::routes::{auth_routes_config, health_check};
use crate::settings::{DatabaseSettings, Settings};
use crate::store::{AccountStore, PgAccountStore};
use crate::types::{AuthError, FrontendUrl, NotifyError, TokenError};
use crate::utils::{CredentialHasher, Notifier, ResetTokenManager, SessionTokens, SmtpNotifier};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to read settings: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("Invalid hasher settings: {0}")]
    Hasher(#[from] AuthError),
    #[error("Invalid session settings: {0}")]
    Session(#[from] TokenError),
    #[error("Invalid e-mail settings: {0}")]
    Notifier(#[from] NotifyError),
    #[error("Failed to migrate the database: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Everything the handlers extract from application data.
#[derive(Clone)]
pub struct AppState {
    store: Data<dyn AccountStore>,
    notifier: Data<dyn Notifier>,
    hasher: Data<CredentialHasher>,
    resets: Data<ResetTokenManager>,
    sessions: Data<SessionTokens>,
    frontend_url: Data<FrontendUrl>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        hasher: CredentialHasher,
        sessions: SessionTokens,
        frontend_url: String,
    ) -> Self {
        let resets = ResetTokenManager::new(store.clone(), hasher.clone());
        Self {
            store: Data::from(store),
            notifier: Data::from(notifier),
            hasher: Data::new(hasher),
            resets: Data::new(resets),
            sessions: Data::new(sessions),
            frontend_url: Data::new(FrontendUrl(frontend_url)),
        }
    }

    pub fn from_settings(
        settings: &Settings,
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, StartupError> {
        Ok(Self::new(
            store,
            notifier,
            CredentialHasher::new(&settings.hasher)?,
            SessionTokens::new(&settings.secret)?,
            settings.frontend_url.clone(),
        ))
    }

    /// Registers application data and every route on `cfg`.
    pub fn configure(&self, cfg: &mut ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.notifier.clone())
            .app_data(self.hasher.clone())
            .app_data(self.resets.clone())
            .app_data(self.sessions.clone())
            .app_data(self.frontend_url.clone())
            .service(health_check);
        auth_routes_config(cfg);
    }
}

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(settings: Settings, test_pool: Option<PgPool>) -> Result<Self, StartupError> {
        let connection_pool = if let Some(pool) = test_pool {
            pool
        } else {
            get_connection_pool(&settings.database)
        };

        sqlx::migrate!().run(&connection_pool).await?;

        let store: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(connection_pool));
        let notifier: Arc<dyn Notifier> = Arc::new(SmtpNotifier::new(&settings.email)?);
        let state = AppState::from_settings(&settings, store, notifier)?;

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );

        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, state)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(settings.connect_to_db())
}

fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || App::new().configure(|cfg| state.configure(cfg)))
        .listen(listener)?
        .run();

    Ok(server)
}

use std::sync::Arc;

use crate::auth::jwt::TokenSigner;
use crate::auth::service::AuthService;
use crate::auth::session::SessionStore;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: keygate_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Access-token signer, keyed once at startup.
    pub signer: Arc<TokenSigner>,
    /// Session store used by the auth gate and the user handlers.
    pub sessions: SessionStore,
    /// Sign-up / sign-in / sign-out / renewal use cases.
    pub auth: AuthService,
}

impl AppState {
    /// Wire every shared component from a pool and the loaded configuration.
    pub fn new(pool: keygate_db::DbPool, config: ServerConfig) -> Self {
        let signer = Arc::new(TokenSigner::new(&config.jwt));
        let sessions = SessionStore::new(pool.clone(), config.db_query_timeout());
        let auth = AuthService::new(
            pool.clone(),
            Arc::clone(&signer),
            sessions.clone(),
            config.jwt.session_ttl(),
            config.db_query_timeout(),
        );

        Self {
            pool,
            config: Arc::new(config),
            signer,
            sessions,
            auth,
        }
    }
}

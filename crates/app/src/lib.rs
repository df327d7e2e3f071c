//! ChatAI application composition root
//!
//! Composes the users and chat domain routers into a single application.

use std::sync::Arc;

use axum::Router;
use mockable::{Clock, DefaultClock};
use sqlx::PgPool;

use chatai_auth::AuthConfig;
use chatai_chat::{ChatRepositories, ChatService, ChatState, ThreadResolver};
use chatai_common::Config;
use chatai_llm::{LlmConfig, LlmService, LlmServiceFactory};
use chatai_users::{AuthService, InMemoryUserStore, UserRepository, UserStore, UsersState};

/// Everything the routers need, already constructed
#[derive(Clone)]
pub struct AppDependencies {
    pub users: Arc<dyn UserStore>,
    pub chat_repos: ChatRepositories,
    pub llm: Arc<dyn LlmService>,
    pub clock: Arc<dyn Clock>,
    pub auth_config: AuthConfig,
    pub thread_timeout_minutes: i64,
}

/// Auth settings derived from the application config
pub fn auth_config(config: &Config) -> AuthConfig {
    AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
        issuer: config.jwt_issuer.clone(),
        token_ttl_minutes: config.jwt_ttl_minutes,
    }
}

/// Create the main application router from configuration.
///
/// Uses Postgres (running pending migrations) when `DATABASE_URL` is set
/// and in-memory stores otherwise.
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let (users, chat_repos): (Arc<dyn UserStore>, ChatRepositories) = match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url)
                .await
                .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
            sqlx::migrate!("../../migrations").run(&pool).await?;
            tracing::info!("Database connection established, migrations applied");

            let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
            (users, ChatRepositories::postgres(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
            (users, ChatRepositories::in_memory())
        }
    };

    let llm_config = LlmConfig::for_client(&config.client_name, |key| std::env::var(key).ok());
    let llm = LlmServiceFactory::create(&config.llm_provider, llm_config)?;

    Ok(build_router(AppDependencies {
        users,
        chat_repos,
        llm,
        clock: Arc::new(DefaultClock),
        auth_config: auth_config(config),
        thread_timeout_minutes: config.thread_timeout_minutes,
    }))
}

/// Build the router over already constructed dependencies
pub fn build_router(deps: AppDependencies) -> Router {
    let auth = AuthService::new(deps.users.clone(), deps.clock.clone(), deps.auth_config.clone());
    let users_state = UsersState {
        auth,
        auth_config: deps.auth_config.clone(),
    };

    let chat = ChatService::new(
        deps.users,
        deps.chat_repos,
        deps.llm,
        deps.clock,
        ThreadResolver::new(deps.thread_timeout_minutes),
    );
    let chat_state = ChatState {
        chat,
        auth_config: deps.auth_config,
    };

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { concat!("ChatAI API v", env!("CARGO_PKG_VERSION")) }),
        )
        .merge(chatai_users::routes().with_state(users_state))
        .merge(chatai_chat::routes().with_state(chat_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

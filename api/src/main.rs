use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use dfm_api::app::create_app;
use dfm_api::middleware::create_cors;
use dfm_api::routes::AppState;

use dfm_core::repositories::{
    InMemoryTokenRepository, InMemoryUserRepository, TokenRepository, UserRepository,
};
use dfm_core::services::{
    AuthService, AuthServiceConfig, CodeStore, InMemoryCodeStore, SessionRotationService,
    TokenService, TokenServiceConfig, VerificationGate,
};
use dfm_infra::cache::{RedisClient, RedisCodeStore};
use dfm_infra::database::{DatabasePool, MySqlTokenRepository, MySqlUserRepository};
use dfm_infra::mail::LoggingMailService;
use dfm_shared::{AppConfig, LogFormat, LoggingConfig, StorageBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);
    config.validate().map_err(anyhow::Error::msg)?;

    tracing::info!(
        environment = %config.environment,
        storage = ?config.storage,
        "Starting DF Messenger API server"
    );

    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; sessions are lost on restart");
            serve(
                config,
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryTokenRepository::new()),
                Arc::new(InMemoryCodeStore::new()),
            )
            .await
        }
        StorageBackend::External => {
            let database = DatabasePool::new(config.database.clone())
                .await
                .context("failed to connect to MySQL")?;
            if !database.health_check().await.context("MySQL health check failed")? {
                anyhow::bail!("MySQL did not answer SELECT 1");
            }
            database
                .run_migrations()
                .await
                .context("failed to bootstrap the schema")?;

            let redis = RedisClient::new(config.cache.clone())
                .await
                .context("failed to connect to Redis")?;
            if !redis.health_check().await.context("Redis health check failed")? {
                anyhow::bail!("Redis did not answer PING");
            }

            let pool = database.get_pool().clone();
            let served = serve(
                config,
                Arc::new(MySqlUserRepository::new(pool.clone())),
                Arc::new(MySqlTokenRepository::new(pool)),
                Arc::new(RedisCodeStore::new(redis)),
            )
            .await;
            database.close().await;
            served
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Wire the services over the chosen storage and run the HTTP server
async fn serve<U, R, S>(
    config: AppConfig,
    users: Arc<U>,
    tokens: Arc<R>,
    codes: Arc<S>,
) -> anyhow::Result<()>
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    S: CodeStore + 'static,
{
    let token_service = Arc::new(TokenService::new(
        tokens,
        TokenServiceConfig::from(&config.auth.jwt),
    ));
    let sessions = Arc::new(SessionRotationService::new(token_service.clone()));
    let verification = Arc::new(VerificationGate::new(
        codes,
        config.auth.verification.code_ttl_seconds,
    ));
    let auth_service = Arc::new(AuthService::new(
        users,
        sessions,
        verification,
        Arc::new(LoggingMailService::default()),
        AuthServiceConfig::from(&config.auth.verification),
    ));

    let state = web::Data::new(AppState::new(auth_service, token_service));
    let environment = config.environment;
    let server_config = config.server.clone();
    let bind_address = config.server.bind_address();

    let mut server = HttpServer::new(move || {
        create_app(state.clone()).wrap(create_cors(environment, &server_config))
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    tracing::info!(address = %bind_address, "Listening");

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}

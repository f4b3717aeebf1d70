//! UserGate Server: authenticated, admission-controlled user API.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use usergate_auth::PasswordHasher;
use usergate_core::config::{AppConfig, BootstrapAdmin, LogFormat};
use usergate_core::error::AppError;
use usergate_database::{DatabasePool, MemoryUserStore, NewUser, PgUserStore, UserStore};
use usergate_entity::Role;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment, then validate it.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("USERGATE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = AppConfig::load(&env)?;
    config.validate(&env)?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting UserGate v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: User store ───────────────────────────────────────
    let (users, pool): (Arc<dyn UserStore>, Option<DatabasePool>) =
        if config.database.is_configured() {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;

            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                usergate_database::migration::run_migrations(pool.pool()).await?;
            }

            (Arc::new(PgUserStore::new(pool.pool().clone())), Some(pool))
        } else {
            tracing::warn!("No database configured, using the in-memory user store");
            (Arc::new(MemoryUserStore::new()), None)
        };

    // ── Step 2: Bootstrap administrator ──────────────────────────
    if let Some(admin) = &config.auth.bootstrap_admin {
        ensure_admin(users.as_ref(), admin).await?;
    }

    // ── Step 3: Serve ────────────────────────────────────────────
    let result = usergate_api::run_server(config, users).await;

    if let Some(pool) = pool {
        pool.close().await;
    }
    result
}

/// Creates the configured administrator unless an account already uses its email.
async fn ensure_admin(users: &dyn UserStore, admin: &BootstrapAdmin) -> Result<(), AppError> {
    if users.find_by_email(&admin.email).await?.is_some() {
        tracing::debug!("Bootstrap administrator already present");
        return Ok(());
    }

    let password_hash = PasswordHasher::new().hash_password(&admin.password)?;
    let created = users
        .create_user(NewUser {
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: Role::Admin,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = created.id, "Bootstrap administrator created");
    Ok(())
}

//! HOPE API server binary.
//!
//! Loads configuration from the environment (and `.env`), seeds the
//! in-memory credential store and serves the API until Ctrl-C.

use std::sync::Arc;

use clap::Parser;
use hope_api::config::ApiConfig;
use hope_core::auth::password::{BCRYPT_COST, init_dummy_hash};
use hope_core::auth::store::{InMemoryCredentialStore, SeedUser};
use hope_core::config::Environment;
use hope_core::models::auth::Role;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "hope_server", about = "HOPE API server")]
struct Args {
    /// Port to listen on; overrides the port in `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Host to listen on when `--port` is given.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

/// Seed accounts. Passwords come from the environment; in development the
/// well-known defaults are used when unset, in production an account with no
/// password configured is skipped.
fn seed_users(env: Environment) -> Vec<SeedUser> {
    let accounts = [
        ("admin", "HOPE_ADMIN_PASSWORD", "admin123", "Administrator", Role::Admin),
        ("user", "HOPE_USER_PASSWORD", "user123", "Default User", Role::User),
    ];
    accounts
        .into_iter()
        .filter_map(|(username, var, dev_default, name, role)| {
            let password = match std::env::var(var).ok().filter(|p| !p.is_empty()) {
                Some(p) => p,
                None if env.is_production() => {
                    warn!(username, var, "no password configured; account not seeded");
                    return None;
                }
                None => {
                    warn!(username, "seeding account with development default password");
                    dev_default.to_string()
                }
            };
            Some(SeedUser {
                username: username.to_string(),
                password,
                name: name.to_string(),
                role,
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,hope_api=debug,hope_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(port) = args.port {
        config.bind_addr = format!("{}:{port}", args.host);
    }

    info!(
        environment = %config.environment,
        bind_addr = %config.bind_addr,
        token_ttl_secs = config.token_ttl.num_seconds(),
        webhook_sources = ?config.webhooks,
        "starting hope_server"
    );

    let seed = seed_users(config.environment);
    let store = tokio::task::spawn_blocking(move || {
        if !init_dummy_hash() {
            warn!("unknown-user logins will not be timing-equalised");
        }
        InMemoryCredentialStore::from_seed(&seed, BCRYPT_COST)
    })
    .await??;

    let state = hope_api::AppState {
        store: Arc::new(store),
        config: config.clone(),
    };
    let app = hope_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}

use std::sync::Arc;

use anyhow::Context;

use drink_menu::auth::TokenVerifier;
use drink_menu::config::AppConfig;
use drink_menu::db::Database;
use drink_menu::drink::{DrinkStore, MemoryDrinkStore, PgDrinkRepository, seed_demo_drink};
use drink_menu::gateway::{run_server, state::AppState};
use drink_menu::logging::init_logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }
    let _log_guard = init_logging(&config)?;

    tracing::info!("Starting drink menu ({} config)", env);

    let (drinks, pg_db): (Arc<dyn DrinkStore>, Option<Arc<Database>>) =
        match &config.postgres_url {
            Some(url) => {
                let db = Arc::new(
                    Database::connect(url)
                        .await
                        .context("Failed to connect to PostgreSQL")?,
                );
                db.init_schema()
                    .await
                    .context("Failed to create drinks schema")?;
                let repo: Arc<dyn DrinkStore> =
                    Arc::new(PgDrinkRepository::new(db.pool().clone()));
                (repo, Some(db))
            }
            None => {
                tracing::warn!("No postgres_url configured, drinks are kept in memory");
                let memory: Arc<dyn DrinkStore> = Arc::new(MemoryDrinkStore::new());
                (memory, None)
            }
        };

    if config.seed_demo_drink {
        seed_demo_drink(drinks.as_ref())
            .await
            .context("Failed to seed demo drink")?;
    }

    let verifier =
        TokenVerifier::from_config(&config.auth).context("Failed to build token verifier")?;
    tracing::info!(
        "Accepting tokens from {} for audience {}",
        verifier.issuer(),
        verifier.audience()
    );

    let state = Arc::new(AppState::new(drinks, Arc::new(verifier), pg_db));
    run_server(&config.gateway, state).await
}

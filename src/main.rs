use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use vault_ca::authority::{AuthorityGateway, VaultAuthority, VaultToken};
use vault_ca::cache::InventoryCache;
use vault_ca::config::AppConfig;
use vault_ca::orchestrator::CertificateOrchestrator;
use vault_ca::web::{AppState, build_router};

/// Web front end for the Vault certificate authorities.
#[derive(Parser)]
#[command(name = "vault-ca-ui", version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "vault-ca.toml")]
    config: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    let config = AppConfig::load_or_default(&cli.config)
        .context("failed to load configuration")?
        .with_address_override(std::env::var("VAULT_ADDR").ok());
    info!("Use vault: {}", config.vault.address);

    let token = VaultToken::load(&config.vault.token_path).context("failed to read vault token")?;
    let authority = VaultAuthority::new(&config.vault.address, token, config.vault.timeout())?;
    authority
        .authenticate()
        .await
        .context("vault rejected the token")?;

    if config.authorities.is_empty() {
        warn!("no authorities configured, every /ca route will answer 404");
    }

    let cache = Arc::new(InventoryCache::new(
        config.cache.capacity,
        config.cache.ttl(),
    ));
    let orchestrator = Arc::new(CertificateOrchestrator::new(Arc::new(authority), cache));
    let app = build_router(AppState::new(orchestrator, config.authorities.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

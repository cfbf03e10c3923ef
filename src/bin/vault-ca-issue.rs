use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use vault_ca::{ErrorKind, PkiError};
use vault_ca::artifacts::ArtifactWriter;
use vault_ca::authority::{AuthorityGateway, VaultAuthority, VaultToken};
use vault_ca::cache::InventoryCache;
use vault_ca::config::AppConfig;
use vault_ca::orchestrator::{CertificateOrchestrator, FlowError, IssueRequest};

/// Create a certificate
#[derive(Parser, Debug)]
#[command(name = "vault-ca-issue", version)]
struct Cli {
    /// Issue certificate even if CN already exist
    #[arg(short, long)]
    force: bool,

    /// Create a file from given jinja2 template
    #[arg(long)]
    template: Option<PathBuf>,

    /// Requested validity, passed to the authority as is
    #[arg(long)]
    ttl: Option<String>,

    /// Directory receiving the certificate, key and rendered template
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, default_value = "vault-ca.toml")]
    config: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,

    /// CA Identifier
    ca: String,

    /// CA role
    role: String,

    /// Common name
    cn: String,
}

struct Failure {
    kind: ErrorKind,
    error: anyhow::Error,
}

impl From<PkiError> for Failure {
    fn from(err: PkiError) -> Self {
        Self {
            kind: err.kind(),
            error: err.into(),
        }
    }
}

impl From<FlowError> for Failure {
    fn from(err: FlowError) -> Self {
        Self {
            kind: err.kind(),
            error: err.into(),
        }
    }
}

async fn run(cli: Cli) -> Result<(), Failure> {
    let config = AppConfig::load_or_default(&cli.config)?
        .with_address_override(std::env::var("VAULT_ADDR").ok());
    info!("Use vault: {}", config.vault.address);

    let token = VaultToken::load(&config.vault.token_path)?;
    let authority = VaultAuthority::new(&config.vault.address, token, config.vault.timeout())?;
    authority.authenticate().await?;

    let cache = Arc::new(InventoryCache::new(1, config.cache.ttl()));
    let orchestrator = CertificateOrchestrator::new(Arc::new(authority), cache);

    let request = IssueRequest {
        ca: cli.ca,
        role: cli.role,
        common_name: cli.cn,
        ttl: cli.ttl.unwrap_or_else(|| config.vault.issue_ttl.clone()),
        force: cli.force,
    };
    let writer = ArtifactWriter::new(cli.output_dir).with_template(cli.template);

    let report = orchestrator.issue(&request, &writer).await?;

    info!(
        "certificate {} written to {}",
        report.serial,
        report.artifacts.certificate.display()
    );
    if let Some(rendered) = &report.artifacts.rendered {
        info!("rendered template written to {}", rendered.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!("{:#}", failure.error);
            ExitCode::from(failure.kind.issue_exit_code())
        }
    }
}

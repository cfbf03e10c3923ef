use clap::Parser;
use log::{debug, error};
use std::path::PathBuf;
use std::process::ExitCode;
use vault_ca::authority::VaultAuthority;
use vault_ca::config::AppConfig;
use vault_ca::orchestrator::check::{CheckError, RevocationVerdict, check_chain_position};
use vault_ca::pki::ChainEnvironment;

/// Check status for given certificate
#[derive(Parser, Debug)]
#[command(name = "vault-ca-check-revocation", version)]
struct Cli {
    #[arg(long, default_value = "vault-ca.toml")]
    config: PathBuf,

    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,

    /// Depth in certificate chain
    depth: u32,

    /// DN of the certificate. This argument IS NOT USED
    dn: String,
}

/// Exit code used when the tool cannot even get as far as a lookup.
const EXIT_SETUP_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();
    debug!("Arguments: depth ({}), X509_NAME_online ({})", cli.depth, cli.dn);

    let config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config.with_address_override(std::env::var("VAULT_ADDR").ok()),
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_SETUP_FAILURE);
        }
    };
    let authority = match VaultAuthority::anonymous(&config.vault.address, config.vault.timeout())
    {
        Ok(authority) => authority,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_SETUP_FAILURE);
        }
    };

    if config.dn_mapping.is_empty() {
        error!("no issuer names are mapped to authorities, every check will fail");
    }

    let chain = ChainEnvironment::from_os_vars(std::env::vars_os());
    let result = check_chain_position(&authority, &chain, cli.depth, &config.dn_mapping).await;

    match result {
        Ok(verdict @ RevocationVerdict::NotRevoked) => ExitCode::from(verdict.exit_code()),
        Ok(verdict @ RevocationVerdict::Revoked { .. }) => {
            error!(
                "Certificate {} is revoked",
                chain.serial(cli.depth).unwrap_or_default()
            );
            ExitCode::from(verdict.exit_code())
        }
        Err(err) => {
            match &err {
                CheckError::MissingSerial { .. } | CheckError::Resolution(_) => {
                    error!("{}", err)
                }
                CheckError::Authority(_) => error!("revocation status unavailable: {}", err),
            }
            ExitCode::from(err.exit_code())
        }
    }
}

use clap::Parser;
use composer::ComposerClient;
use gateway::AppState;
use gateway::auth::AuthClient;
use marketplace::{MarketplaceClient, ScannerConfig};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;

use config::{Config, MetricsConfig};

#[derive(Parser)]
#[command(name = "bidflow", about = "Backend for the freelance-bidding assistant")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "bidflow.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %cli.config.display(), error = %e, "failed to load config");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.gateway.validate() {
        tracing::error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }

    if let Some(metrics_config) = &config.metrics {
        init_metrics(metrics_config);
    }

    let pool = match store::open(&config.gateway.store.path).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to open bid store");
            std::process::exit(1);
        }
    };

    let gateway_config = config.gateway;
    let state = AppState {
        auth: AuthClient::new(&gateway_config.auth.url),
        marketplace: MarketplaceClient::new(
            &gateway_config.marketplace.base_url,
            &gateway_config.marketplace.token,
        ),
        composer: ComposerClient::new(
            &gateway_config.composer.base_url,
            &gateway_config.composer.model,
            &gateway_config.composer.api_key,
        ),
        pool,
        jwt_secret: gateway_config.auth.jwt_secret.clone(),
        agency: gateway_config.composer.agency.clone(),
        submit_bids: gateway_config.marketplace.submit_bids,
        scanner: ScannerConfig::default(),
    };

    if let Err(e) = gateway::serve(&gateway_config.listener, state).await {
        tracing::error!(error = %e, "gateway exited");
        std::process::exit(1);
    }
}

fn init_metrics(config: &MetricsConfig) {
    let recorder =
        StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port).build(Some("bidflow"));

    match recorder {
        Ok(recorder) => {
            if let Err(e) = metrics::set_global_recorder(recorder) {
                tracing::warn!(error = %e, "metrics recorder already installed");
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to build statsd exporter, metrics disabled");
        }
    }
}

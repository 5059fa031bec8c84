//! CORS Bypass Proxy
//!
//! Forwards `/<url>` to `<url>` and returns the response with permissive
//! CORS headers so browser clients can read cross-origin resources.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                    CORS PROXY                         │
//!                     │                                                       │
//!   Client Request    │  ┌─────────┐    ┌──────────────┐    ┌─────────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│   security   │───▶│ forwarding  │──┼──▶ Upstream
//!                     │  │ server  │    │ origin/header│    │ host check  │  │    (hop 1..N)
//!                     │  └─────────┘    └──────────────┘    │ redirects   │◀─┼───
//!                     │                                     └──────┬──────┘  │
//!   Client Response   │  ┌──────────────┐                          │         │
//!   ◀─────────────────┼──│ response +   │◀─────────────────────────┘         │
//!                     │  │ CORS headers │                                    │
//!                     │  └──────────────┘                                    │
//!                     │                                                       │
//!                     │  config · observability · resilience · lifecycle     │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_bypass_proxy::config::{load_settings, ConfigError, EnvOverrides, Environment, LogFormat};
use cors_bypass_proxy::http::HttpServer;
use cors_bypass_proxy::lifecycle::{spawn_signal_listener, Shutdown};
use cors_bypass_proxy::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "cors-bypass-proxy", version)]
#[command(about = "Public CORS bypass proxy", long_about = None)]
struct Cli {
    /// Optional TOML settings file
    #[arg(short, long, env = "CORS_PROXY_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Comma-separated origins allowed to use the proxy
    #[arg(long, env = "ORIGIN_WHITELIST")]
    origin_whitelist: Option<String>,

    /// Comma-separated origins always rejected
    #[arg(long, env = "ORIGIN_BLACKLIST")]
    origin_blacklist: Option<String>,

    /// Comma-separated hostnames that may be targeted
    #[arg(long, env = "ALLOWED_PROXY_HOSTS")]
    allowed_hosts: Option<String>,

    /// "true" to require Origin or X-Requested-With on proxied requests
    #[arg(long, env = "REQUIRE_HEADER")]
    require_header: Option<String>,

    /// development, production or test
    #[arg(long = "env", env = "APP_ENV")]
    environment: Option<Environment>,

    /// Base URL shown in the help text outside development
    #[arg(long, env = "PUBLIC_URL")]
    public_url: Option<String>,

    /// pretty or json
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Enable the Prometheus endpoint on this address
    #[arg(long, env = "METRICS_ADDRESS")]
    metrics_address: Option<String>,
}

impl Cli {
    fn overrides(&self) -> EnvOverrides {
        EnvOverrides {
            port: self.port,
            origin_whitelist: self.origin_whitelist.clone(),
            origin_blacklist: self.origin_blacklist.clone(),
            allowed_hosts: self.allowed_hosts.clone(),
            require_header: self.require_header.clone(),
            environment: self.environment,
            public_url: self.public_url.clone(),
            log_format: self.log_format,
            metrics_address: self.metrics_address.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref(), cli.overrides()) {
        Ok(settings) => settings,
        Err(ConfigError::Validation(errors)) => {
            eprintln!("Invalid configuration:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init_logging(&settings.observability);

    tracing::info!("cors-bypass-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = settings.listener.port,
        environment = %settings.environment,
        max_redirects = settings.forwarding.max_redirects,
        hop_timeout_secs = settings.forwarding.hop_timeout_secs,
        "Configuration loaded"
    );

    if settings.access.allowed_hosts.is_empty() {
        tracing::warn!("No host restrictions (open proxy)");
    } else {
        tracing::info!(
            allowed_hosts = %settings.access.allowed_hosts.join(", "),
            "Host allowlist active"
        );
    }

    if settings.observability.metrics_enabled {
        match settings.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(settings.listener.socket_address()).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    if settings.environment == Environment::Development {
        tracing::info!("Try: http://localhost:{}/https://api.github.com", local_addr.port());
    }

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let server = HttpServer::new(&settings)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

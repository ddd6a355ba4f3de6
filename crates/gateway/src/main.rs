use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use docent_domain::config::{Config, ConfigSeverity, ServerConfig};
use docent_gateway::api;
use docent_gateway::cli::{self, Cli, Command, ConfigCommand};
use docent_gateway::session_lock::SessionLockMap;
use docent_gateway::state::{build_pipeline, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let (config, config_path) = cli::load_config(cli.config.as_deref())?;
            init_tracing(&config.server);
            if let Some(path) = &config_path {
                tracing::info!(path = %path.display(), "config loaded");
            }
            run_server(Arc::new(config)).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = cli::load_config(cli.config.as_deref())?;
            let issues = config.validate();
            if let Some(path) = &config_path {
                println!("config: {}", path.display());
            }
            for issue in &issues {
                println!("{issue}");
            }
            if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
                std::process::exit(1);
            }
            println!("ok");
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _) = cli::load_config(cli.config.as_deref())?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Command::Version) => {
            println!("docent {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize structured tracing for the serve command.
fn init_tracing(server: &ServerConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,docent_gateway=debug"));

    if server.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    // Surface config issues at startup; refuse to run on hard errors.
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Error => tracing::error!(%issue, "config error"),
            ConfigSeverity::Warning => tracing::warn!(%issue, "config warning"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!("configuration has errors; fix them and restart");
    }

    let pipeline = Arc::new(build_pipeline(config.clone())?);
    let state = AppState {
        config: config.clone(),
        pipeline,
        session_locks: Arc::new(SessionLockMap::new()),
    };

    let app = api::router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, "docent gateway listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

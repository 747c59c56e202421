// HotKeyNDQ - button-grid remote control for flight-simulator servers
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;

use hotkeyndq::config::constants::DEFAULT_SERVER_BIND;
use hotkeyndq::config::{load_config_at, save_config_to, Catalog, Config};
use hotkeyndq::network::{ConnectionTarget, SendOutcome};
use hotkeyndq::panel::{apply_connection, format_catalog, format_page, Panel};
use hotkeyndq::server::{serve, ServerConfig};
use hotkeyndq::{CommandSender, DiscoveryClient};

#[derive(Parser, Debug)]
#[command(name = "hotkeyndq")]
#[command(about = "Button-grid remote control for flight-simulator control servers", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Use this config file instead of ~/.hotkeyndq/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Find a control server on the local network
    Discover {
        /// How long to wait for a reply (default from config: 3000)
        #[arg(long = "timeout-ms")]
        timeout_ms: Option<u64>,
        /// Save the discovered server as the connection target
        #[arg(long)]
        save: bool,
    },
    /// Send a command id to the control server
    Send {
        /// Command id, e.g. GEAR_TOGGLE
        command_id: String,
        /// Server address (default: saved connection)
        #[arg(long)]
        ip: Option<String>,
        /// Server port (default: saved connection)
        #[arg(long)]
        port: Option<String>,
    },
    /// Press a button from the catalog
    Press {
        /// Page id or number
        page: String,
        /// Button number or command id
        button: String,
    },
    /// List catalog pages, or show one page's buttons
    Pages {
        /// Page id or number
        page: Option<String>,
    },
    /// Save the control server address
    Connect { ip: String, port: String },
    /// Run the reference control server
    Serve {
        /// Bind address for commands
        #[arg(long, default_value = DEFAULT_SERVER_BIND)]
        bind: String,
        /// Name returned to discovering panels (default: hostname)
        #[arg(long)]
        name: Option<String>,
        /// Do not answer discovery requests
        #[arg(long = "no-discovery")]
        no_discovery: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => hotkeyndq::config::config_path()?,
    };
    let mut config = load_config_at(&config_path)?;

    match args.command.unwrap_or(Command::Pages { page: None }) {
        Command::Discover { timeout_ms, save } => {
            run_discover(&mut config, &config_path, timeout_ms, save).await
        }
        Command::Send {
            command_id,
            ip,
            port,
        } => run_send(&config, &command_id, ip, port).await,
        Command::Press { page, button } => {
            let catalog = Catalog::load_or_builtin(config.catalog_path.as_deref())?;
            let panel = Panel::new(catalog, &config);
            let outcome = panel.press(&page, &button).await?;
            report(outcome)
        }
        Command::Pages { page } => {
            let catalog = Catalog::load_or_builtin(config.catalog_path.as_deref())?;
            match page {
                Some(key) => {
                    let page = catalog
                        .page(&key)
                        .with_context(|| format!("Unknown page '{}'", key))?;
                    print!("{}", format_page(page));
                }
                None => print!("{}", format_catalog(&catalog)),
            }
            Ok(())
        }
        Command::Connect { ip, port } => match apply_connection(&mut config, &ip, &port) {
            Ok(status) => {
                save_config_to(&config, &config_path)?;
                println!("{}", status);
                Ok(())
            }
            Err(e) => {
                println!("{}", e.status_message());
                std::process::exit(1);
            }
        },
        Command::Serve {
            bind,
            name,
            no_discovery,
        } => {
            let server_config = ServerConfig {
                bind_address: bind,
                advertise: !no_discovery,
                service_name: name,
                ..ServerConfig::default()
            };
            run_server(server_config).await
        }
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Bridge log crate → tracing (for dependencies using log crate)
    tracing_log::LogTracer::init().ok();
}

async fn run_discover(
    config: &mut Config,
    config_path: &std::path::Path,
    timeout_ms: Option<u64>,
    save: bool,
) -> Result<()> {
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.discovery.timeout());

    let client = DiscoveryClient::from_config(&config.discovery);
    let Some(info) = client.discover(timeout).await else {
        println!("No server found");
        std::process::exit(1);
    };

    println!("Found {} at {}:{}", info.name, info.ip, info.port);

    if save {
        config.connection.ip = info.ip.clone();
        config.connection.port = u32::from(info.port);
        save_config_to(config, config_path)?;
        println!("Saved: {}:{}", info.ip, info.port);
    }
    Ok(())
}

async fn run_send(
    config: &Config,
    command_id: &str,
    ip: Option<String>,
    port: Option<String>,
) -> Result<()> {
    let ip = ip.unwrap_or_else(|| config.connection.ip.clone());
    let port = port.unwrap_or_else(|| config.connection.port.to_string());

    let outcome = match ConnectionTarget::parse(&ip, &port) {
        Ok(target) => {
            CommandSender::from_config(&config.command)
                .dispatch(target, command_id)
                .await
                .context("Send task failed")?
        }
        Err(e) => SendOutcome {
            success: false,
            message: e.status_message(),
        },
    };
    report(outcome)
}

fn report(outcome: SendOutcome) -> Result<()> {
    println!("{}", outcome.message);
    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let shutdown = CancellationToken::new();

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C detected, shutting down server...");
            ctrl_c.cancel();
        }
    });

    eprintln!("Press Ctrl+C to quit, or send QUIT_SERVER from the panel");
    serve(config, None, shutdown).await
}

//! TCP Forward command line tool
//!
//! This binary is the command-line interface for the relay: it wires up
//! logging, loads the configuration file and runs the server until the
//! process is terminated.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use tcpforward::common::init_logger;
use tcpforward::config::{RelayConfig, DEFAULT_CONFIG_FILE};
use tcpforward::{RelayServer, Result, APP_NAME, VERSION};

/// Transparent TCP relay: forwards every inbound connection to a fixed remote endpoint
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Configuration file path (created with defaults if missing)
    #[clap(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level
    #[clap(long, default_value = "info")]
    log_level: String,

    /// Log file receiving a timestamped copy of every log line
    #[clap(long, default_value = "logging.txt")]
    log_file: PathBuf,

    /// Log to the console only, without a log file
    #[clap(long)]
    no_log_file: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = (!args.no_log_file).then_some(args.log_file.as_path());
    init_logger(&args.log_level, log_file);

    info!("Starting {} v{}", APP_NAME, VERSION);

    // Configuration problems are fatal before any socket is bound.
    let config = match RelayConfig::load_or_create(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e);
        }
    };

    let listen_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.listen_port()?);
    let remote = config.remote()?;

    let server = match RelayServer::bind(listen_addr, remote, config.max_connections).await {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    info!("Relay ready, press Ctrl+C to stop");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, exiting");
            Ok(())
        }
    }
}

use clap::Parser;
use log::info;
use server::config::{ServerConfig, SessionConfig};
use server::network::Server;
use shared::{DEFAULT_PORT, IDLE_TIMEOUT_SECS, SWEEP_INTERVAL_SECS, TICK_INTERVAL_MS};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Simulation tick interval in milliseconds
    #[arg(short, long, default_value_t = TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Seconds an unjoined session may wait before it is evicted
    #[arg(long, default_value_t = IDLE_TIMEOUT_SECS)]
    idle_timeout: u64,

    /// Seconds between idle-session sweeps
    #[arg(long, default_value_t = SWEEP_INTERVAL_SECS)]
    sweep_interval: u64,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            session: SessionConfig {
                tick_interval: Duration::from_millis(self.tick_ms.max(1)),
                idle_timeout: Duration::from_secs(self.idle_timeout),
                sweep_interval: Duration::from_secs(self.sweep_interval.max(1)),
            },
            ..ServerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = Args::parse().into_config();
    info!(
        "Tick every {:?}, idle sessions evicted after {:?}",
        config.session.tick_interval, config.session.idle_timeout
    );

    let server = Server::bind(config).await?;

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

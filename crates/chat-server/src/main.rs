use chat_server::core::{ChatServerConfig, StoreBackend};
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreArg {
    Sqlite,
    Memory,
}

impl From<StoreArg> for StoreBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Sqlite => StoreBackend::Sqlite,
            StoreArg::Memory => StoreBackend::Memory,
        }
    }
}

#[derive(Parser)]
#[command(name = "chat-server")]
#[command(about = "Chat room server with participant liveness sweep")]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Storage backend
    #[arg(long, env = "CHAT_STORE", value_enum, default_value = "sqlite")]
    store: StoreArg,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://chat.sqlite")]
    database_url: String,

    /// Seconds between liveness sweeps
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 15)]
    sweep_interval_secs: u64,

    /// Seconds without a heartbeat before a participant is evicted
    #[arg(long, env = "STALE_AFTER_SECS", default_value_t = 10)]
    stale_after_secs: u64,
}

impl From<Cli> for ChatServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            bind_addr: SocketAddr::new(cli.host, cli.port),
            store: cli.store.into(),
            database_url: cli.database_url,
            sweep_interval: Duration::from_secs(cli.sweep_interval_secs),
            stale_after: Duration::from_secs(cli.stale_after_secs),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    chat_server::run(cli.into()).await
}

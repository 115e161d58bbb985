use akshara_server::Stub;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "akshara-stub",
    about = "Offline stub of the Aksharamukha public transliteration API"
)]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 8085)]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Answer every query with this body instead of echoing the input.
    #[arg(long)]
    fixed: Option<String>,

    /// Answer every query with this HTTP status.
    #[arg(long, conflicts_with = "fixed")]
    status: Option<u16>,

    /// Delay each response by this many milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let stub = match (&cli.fixed, cli.status) {
        (Some(body), _) => Stub::fixed(body),
        (None, Some(status)) => Stub::status(status),
        (None, None) => Stub::echo(),
    }
    .with_delay(Duration::from_millis(cli.delay_ms));

    let addr = format!("{}:{}", cli.bind, cli.port);
    info!("starting akshara-stub on {addr}");
    if let Err(e) = akshara_server::run_server(&Arc::new(stub), &addr) {
        error!("failed to start server on {addr}: {e}");
        std::process::exit(1);
    }
}

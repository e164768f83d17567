mod connection;
mod coordinator;
mod registry;
mod server;

use std::net::SocketAddr;

use clap::Parser;
use pairquiz_common::questions::QuestionDeck;

use crate::server::ServerState;

/// PairQuiz Server - two-player question/answer match server
#[derive(Parser, Debug)]
#[command(name = "pairquiz-server", version, about)]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:3001")]
    bind: String,

    /// Maximum simultaneous connections allowed
    #[arg(short, long, default_value_t = 100)]
    max_connections: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pairquiz_server=debug,pairquiz_common=debug".into()),
        )
        .init();

    let args = Args::parse();

    let addr: SocketAddr = args.bind.parse()?;
    let state = ServerState::new(QuestionDeck::standard(), args.max_connections);

    tracing::info!(
        "Starting pairquiz server on {} (max {} connections)",
        addr,
        args.max_connections
    );
    server::run(addr, state).await
}

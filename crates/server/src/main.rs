mod config;
mod events;
mod match_task;
mod net;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;

use config::ServerConfig;
use net::MatchDirectory;

#[derive(Parser)]
#[command(name = "goalkeeper-server")]
#[command(about = "Authoritative soccer match server")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = 7070)]
    port: u16,

    #[arg(short, long, default_value_t = goalkeeper_sim::config::TICK_RATE)]
    tick_rate: u32,

    #[arg(short, long, default_value_t = goalkeeper_sim::config::MAX_CLIENTS)]
    max_clients: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut match_config = goalkeeper_sim::MatchConfig::default();
    match_config.tick_rate = args.tick_rate;
    match_config.max_clients = args.max_clients;

    let config = ServerConfig {
        bind: args.bind,
        port: args.port,
        max_clients_per_match: args.max_clients,
        tick_rate: args.tick_rate,
        match_config,
    };

    let bind_addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    log::info!("server started on {bind_addr}");

    let directory = MatchDirectory::new(config.match_config);
    net::run(listener, directory, config).await;

    Ok(())
}

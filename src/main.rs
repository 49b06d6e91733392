#[macro_use]
extern crate rocket;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

mod api;
mod config_file;
mod docker_client;
mod docker_structs;
mod error;
mod health;
mod runtime;
mod server;
mod shaper;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to listen on [default: 3333]
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(short, long)]
    address: Option<String>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = config_file::process_config(cli.config.as_deref(), cli.port, cli.address)?;

    // DOCKER_HOST and friends are read once, connections are made per request
    let settings = docker_client::DockerSettings::from_env(config.docker_host.to_owned());
    docker_client::DockerHost::parse(&settings.host)?;

    let figment = server::figment(&config, cli.debug);
    let connector = docker_client::DockerConnector::new(settings);

    // Returns on the first fatal listener error, or after a graceful shutdown
    let _rocket = server::build(figment, config_file::AppInfo::new(), Box::new(connector))
        .launch()
        .await?;

    Ok(())
}

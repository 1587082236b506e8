//! FWC server binary

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use fwc_config::{ConfigLoader, FwcConfig};
use fwc_server::Server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address, overriding the configuration
    #[arg(short, long)]
    bind: Option<String>,

    /// Server port, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Database URL, overriding the configuration
    #[arg(long)]
    database_url: Option<String>,

    /// Print a sample configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", FwcConfig::generate_sample());
        return Ok(());
    }

    let mut config = ConfigLoader::new().load(cli.config.as_ref())?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    config.validate_all()?;

    let server = Server::new(config).await?;
    server.start().await
}

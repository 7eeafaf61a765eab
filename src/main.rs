use anyhow::Result;
use clap::Parser;
use tracing::info;

use wpadscout::{App, DiscoveryError, Payload};

/// Discover the WPAD proxy configuration for this host via DHCP and DNS.
#[derive(Debug, Parser)]
#[command(name = "wpadscout", version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Search domain for the DNS reduction search
    #[arg(short, long)]
    domain: Option<String>,

    /// Do not try DNS discovery
    #[arg(long)]
    skip_dns: bool,

    /// Do not try DHCP discovery
    #[arg(long)]
    skip_dhcp: bool,

    /// Print the fetched configuration file instead of the proxy list
    #[arg(long)]
    raw: bool,

    /// Only probe this network interface
    #[arg(short, long)]
    interface: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        // 配置加载、协作者初始化与发现本身的错误统一按类别输出
        eprintln!("[{}] {:#}", DiscoveryError::classify(&e).as_str(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => wpadscout::config::load_config(path)?,
        None => wpadscout::config::Config::default(),
    };
    if cli.domain.is_some() {
        config.discovery.domain = cli.domain.clone();
    }
    if cli.interface.is_some() {
        config.discovery.interface = cli.interface.clone();
    }
    config.discovery.skip_dns |= cli.skip_dns;
    config.discovery.skip_dhcp |= cli.skip_dhcp;
    config.discovery.raw |= cli.raw;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level)),
        )
        .init();

    info!("wpadscout starting...");

    let app = App::new(&config)?;
    let found = app.run().await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    match &found.payload {
        Payload::Raw(body) => print!("{}", body),
        Payload::Proxies(proxies) => {
            for proxy in proxies {
                println!("{}", proxy);
            }
        }
    }
    Ok(())
}

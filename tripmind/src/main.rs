use anyhow::{Context, Result};
use clap::Parser;
use std::net::TcpListener;
use std::path::PathBuf;

use tripmind::{ServeConfig, Session};

#[derive(Parser)]
#[command(name = "tripmind")]
#[command(about = "Mirror a strategy engine's game state and answer its move prompts")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Static map record (JSON)
    #[arg(short, long, env = "TRIPMIND_MAP")]
    map: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Move dictionary file
    #[arg(long)]
    move_dict: Option<PathBuf>,

    /// Directory for episode datasets
    #[arg(long)]
    dataset_dir: Option<PathBuf>,

    /// RNG seed for reproducible move sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ServeConfig> {
        let mut config = match &self.config {
            Some(path) => ServeConfig::load(path)?,
            None => ServeConfig::default(),
        };
        if let Some(map) = self.map {
            config.map_path = Some(map);
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.move_dict {
            config.move_dict_path = path;
        }
        if let Some(dir) = self.dataset_dir {
            config.dataset_dir = dir;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        cli.log_level.clone()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = cli.into_config()?;
    let mut session = Session::from_config(&config)?;

    let addr = config.bind_addr();
    let listener =
        TcpListener::bind(&addr).with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Server listening on {}", addr);

    session.serve(&listener)
}

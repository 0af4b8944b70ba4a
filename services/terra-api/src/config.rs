//! Command-line and environment configuration.

use clap::Parser;
use std::path::PathBuf;

use earth_engine::{EarthEngineConfig, DEFAULT_API_BASE};

/// Static assets shipped with the service.
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

#[derive(Parser, Debug, Clone)]
#[command(name = "terra-api")]
#[command(about = "TerraSight web viewer for Earth Engine datasets")]
pub struct Args {
    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:5000", env = "TERRA_LISTEN_ADDR")]
    pub listen: String,

    /// Show error details to users and log as plain text
    #[arg(long, env = "TERRA_DEBUG")]
    pub debug: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Number of tokio worker threads (defaults to CPU cores)
    #[arg(long, env = "TERRA_WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Service-account key file
    #[arg(long, default_value = "service-account.json", env = "TERRA_CREDENTIALS")]
    pub credentials: PathBuf,

    /// Earth Engine project (defaults to the key's project)
    #[arg(long, env = "TERRA_EE_PROJECT")]
    pub project: Option<String>,

    /// Earth Engine REST base URL
    #[arg(long, default_value = DEFAULT_API_BASE, env = "TERRA_EE_API_BASE")]
    pub api_base: String,

    /// Directory served under /static
    #[arg(long, default_value = DEFAULT_STATIC_DIR, env = "TERRA_STATIC_DIR")]
    pub static_dir: PathBuf,
}

impl Args {
    pub fn earth_engine_config(&self) -> EarthEngineConfig {
        EarthEngineConfig {
            credentials_path: self.credentials.clone(),
            project: self.project.clone(),
            api_base: self.api_base.clone(),
        }
    }
}

pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "docseal")]
#[command(about = "Seal documents, publish them and record them against an identity")]
#[command(version)]
pub struct Args {
    /// Daemon API URL (defaults to the api_port in config, then http://localhost:5001)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the docseal config directory (defaults to ~/.docseal)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}

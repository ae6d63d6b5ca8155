pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "onetime")]
#[command(about = "Share secrets that can be read exactly once")]
pub struct Args {
    /// API server base url (defaults to the configured listen port on localhost)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the onetime config directory (defaults to ~/.onetime)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}

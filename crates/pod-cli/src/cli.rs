use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pod", about = "Linked Data pod server", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the pod server
    Serve(ServeArgs),
    /// Validate a configuration file
    CheckConfig(CheckConfigArgs),
}

#[derive(Args, Default)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Address to listen on, overrides the configuration
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Public URL of the root container
    #[arg(long)]
    pub base_url: Option<String>,
    /// Directory holding the resources
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckConfigArgs {
    pub file: PathBuf,
}

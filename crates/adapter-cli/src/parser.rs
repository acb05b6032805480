//! Main CLI parser and top-level argument handling.

use adapter_core::AdapterSettings;
use clap::{Args, Parser, Subcommand};

/// Channel adapter: converts voice and text and relays results to a
/// downstream HTTP API.
#[derive(Debug, Parser)]
#[command(name = "channel-adapter")]
#[command(about = "Convert voice and text and forward results to a downstream API")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Print the effective settings as JSON
    Config,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Serve(ServeArgs::default())
    }
}

/// Overrides applied on top of environment settings.
#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Downstream endpoint that receives forwarded results
    #[arg(long = "target-url")]
    pub target_url: Option<String>,
}

impl ServeArgs {
    pub fn apply(&self, settings: &mut AdapterSettings) {
        if let Some(host) = &self.host {
            settings.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(url) = &self.target_url {
            settings.target_url.clone_from(url);
        }
    }
}

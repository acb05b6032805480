//! CLI entry point.
//!
//! Settings come from `ADAPTER_*` environment variables (a `.env` file is
//! loaded first), with `serve` flags applied on top.

use adapter_cli::config_commands::render_settings;
use adapter_cli::{Cli, Commands, init_tracing};
use adapter_core::AdapterSettings;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = AdapterSettings::from_lookup(|key| std::env::var(key).ok())?;

    match cli.command.unwrap_or_default() {
        Commands::Serve(args) => {
            args.apply(&mut settings);
            adapter_axum::start_server(settings).await?;
        }
        Commands::Config => {
            println!("{}", render_settings(&settings)?);
        }
    }

    Ok(())
}

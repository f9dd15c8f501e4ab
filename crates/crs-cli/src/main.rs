//! # crs CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Confidential Record Stack CLI.
///
/// Serves the record lifecycle API or runs scripted demo scenarios
/// against the in-process stack.
#[derive(Parser, Debug)]
#[command(name = "crs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the record lifecycle HTTP API.
    Serve(crs_cli::serve::ServeArgs),
    /// Run a scripted concurrent-verification scenario.
    Demo(crs_cli::demo::DemoArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => crs_cli::serve::run(args).await,
        Commands::Demo(args) => crs_cli::demo::run(args).await,
    }
}

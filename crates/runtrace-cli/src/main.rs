//! runtrace CLI entrypoint.

use clap::Parser;
use runtrace_api::ReceiverConfig;
use runtrace_trace::init_telemetry;
use std::path::PathBuf;

mod commands;
mod handlers;

use commands::Commands;

#[derive(Parser)]
#[command(name = "runtrace")]
#[command(author, version, about = "GitHub Actions webhook to trace receiver", long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true, env = "RUNTRACE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ReceiverConfig::from_file(path)?,
        None => ReceiverConfig::default(),
    };

    match cli.command {
        Commands::Serve(args) => {
            args.apply(&mut config);
            init_telemetry(&config.telemetry)?;
            handlers::serve(config).await?
        }
        Commands::Convert(args) => {
            init_telemetry(&config.telemetry)?;
            handlers::convert(config, args).await?
        }
        Commands::Sign { payload, secret } => handlers::sign(&payload, &secret)?,
    }

    Ok(())
}

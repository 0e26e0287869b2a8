use std::process::ExitCode;

use clap::Parser;
use scholar_cli::render::GENERIC_FAILURE;
use scholar_cli::{Args, run};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{e:#}");
            tracing::error!(error = %message, "error in main execution");
            println!("\n{GENERIC_FAILURE}");
            ExitCode::FAILURE
        }
    }
}

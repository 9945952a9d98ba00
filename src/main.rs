use anyhow::Context;
use clap::Parser;
use conversion_uploader::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Cancellation lets in-flight batches finish so the summary still prints
        let cancellation_token = CancellationToken::new();

        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, finishing in-flight batches...");
                signal_token.cancel();
            }
        });

        let input = args.input.display().to_string();
        commands::run(args, cancellation_token)
            .await
            .with_context(|| format!("Upload of '{}' failed", input))
    });

    match result {
        Ok(outcome) => process::exit(outcome.exit_code),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

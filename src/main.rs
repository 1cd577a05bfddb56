use std::process;

use clap::Parser;
use commit_buddy::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with RUST_LOG environment variable support. The
    // default level comes from --verbose. Write to stderr so debug logs
    // don't interfere with the interactive prompt on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.default_log_filter())),
        )
        .init();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e}");

        // Print the full error chain if available
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {err}");
            source = err.source();
        }

        process::exit(1);
    }
}

use clap::Parser;
use spyglass::cli::Cli;
use spyglass::error::ScanError;
use spyglass::output;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so stdout stays clean for scan output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        output::print_error(&e.to_string());
        let code = match e {
            ScanError::Ports(_) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

use clap::Parser;
use coldmail::cli::{self, Cli, Commands};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate(args)) => cli::generate(args).await,
        Some(Commands::History) => cli::history(),
        Some(Commands::Show { id }) => cli::show(id),
        Some(Commands::Delete { id }) => cli::delete(id),
        None => cli::interactive().await,
    }
}

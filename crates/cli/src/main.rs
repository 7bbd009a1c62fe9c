use clap::Parser;

use cli::Cli;

mod cli;
mod commands;

#[tokio::main]
async fn main() {
    elite_observability::init();

    let args = Cli::parse();
    if let Err(e) = commands::run(args).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

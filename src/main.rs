use clap::Parser;
use dagkit::cli::{Cli, Commands};
use dagkit::cli_handlers;
use std::process;

fn main() {
    // Diagnostics go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let result = match cli.command {
        Commands::Sort { file, layers } => cli_handlers::handle_sort(&file, layers, json),
        Commands::Check { file } => cli_handlers::handle_check(&file, json),
        Commands::Propagate {
            file,
            sources,
            rule,
            mode,
        } => cli_handlers::handle_propagate(&file, &sources, rule, mode, json),
        Commands::Components { file } => cli_handlers::handle_components(&file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

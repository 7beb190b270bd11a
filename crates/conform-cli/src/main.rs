//! # conform CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

/// Validate documents against declarative schemas.
#[derive(Parser, Debug)]
#[command(name = "conform", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate JSON/YAML documents against a schema definition.
    Validate(conform_cli::validate::ValidateArgs),
    /// Compile a schema definition and print its outline.
    Check(conform_cli::check::CheckArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => {
            let outcome = conform_cli::validate::run_validate(&args)?;
            println!("{}", outcome.rendered);
            if outcome.all_passed() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Check(args) => {
            println!("{}", conform_cli::check::run_check(&args)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

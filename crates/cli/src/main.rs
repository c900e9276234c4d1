//! `apibind`: generate typed bindings and inspect definition tables.

mod commands;
mod config;
mod logging;

use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "apibind",
    version,
    about = "Typed bindings generator and definition cache for versioned web APIs"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Rust bindings module from an OpenAPI document
    Generate(commands::generate::GenerateArgs),
    /// Print one definition record, fetching its table as needed
    Definition(commands::definition::DefinitionArgs),
    /// List the definition tables of the current manifest
    Tables(commands::tables::TablesArgs),
}

fn main() -> ExitCode {
    logging::init_tracing();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run_cli_async(std::env::args_os()));
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn run_cli_async<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => commands::generate::run(args),
            Some(Commands::Definition(args)) => commands::definition::run(args).await,
            Some(Commands::Tables(args)) => commands::tables::run(args).await,
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

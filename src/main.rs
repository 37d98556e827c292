//! Astrolabe CLI - persistent code-knowledge store
//!
//! Usage: astrolabe <command> [arguments]

mod cli;
mod errors_cmd;
mod init_cmd;
mod load_cmd;
mod search_cmd;
mod status_cmd;
mod vacuum_cmd;

use std::process::ExitCode;

use cli::{parse_args, print_usage, Command};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = match parse_args(std::env::args().collect()) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Init { db_path } => init_cmd::run(&db_path),
        Command::Status {
            db_path,
            output_format,
        } => status_cmd::run(&db_path, output_format),
        Command::Search {
            db_path,
            term,
            output_format,
        } => search_cmd::run(&db_path, &term, output_format),
        Command::Errors {
            db_path,
            fatal_only,
            output_format,
        } => errors_cmd::run(&db_path, fatal_only, output_format),
        Command::Vacuum { db_path } => vacuum_cmd::run(&db_path),
        Command::Load {
            project_path,
            settings_path,
        } => load_cmd::run(project_path, settings_path),
        Command::Version => {
            println!("{}", astrolabe::version::version());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

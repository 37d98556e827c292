//! CLI argument parsing
//!
//! Defines the Command enum and parse_args() function for all CLI commands.

use std::path::PathBuf;

use anyhow::Result;

use astrolabe::output::OutputFormat;

pub fn print_usage() {
    eprintln!("Astrolabe - persistent code-knowledge store");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  astrolabe <command> [arguments]");
    eprintln!("  astrolabe --help");
    eprintln!();
    eprintln!("  astrolabe init --db <FILE>");
    eprintln!("  astrolabe status --db <FILE> [--output text|json]");
    eprintln!("  astrolabe search --db <FILE> --term <TERM> [--output text|json]");
    eprintln!("  astrolabe errors --db <FILE> [--fatal-only] [--output text|json]");
    eprintln!("  astrolabe vacuum --db <FILE>");
    eprintln!("  astrolabe load --project <FILE> [--settings <FILE>]");
    eprintln!("  astrolabe version");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  init     Create or upgrade a database in place");
    eprintln!("  status   Show storage statistics and versions");
    eprintln!("  search   Full-text search over stored file content");
    eprintln!("  errors   List stored analysis diagnostics");
    eprintln!("  vacuum   Compact the database and merge FTS segments");
    eprintln!("  load     Load a project through the application runtime");
    eprintln!("  version  Show version and build metadata");
    eprintln!();
    eprintln!("Common arguments:");
    eprintln!("  --db <FILE>         Path to the storage database");
    eprintln!("  --output <FORMAT>   Output format: text (default) or json");
    eprintln!();
    eprintln!("Search arguments:");
    eprintln!("  --term <TERM>       Term to search for");
    eprintln!();
    eprintln!("Errors arguments:");
    eprintln!("  --fatal-only        Only list fatal diagnostics");
    eprintln!();
    eprintln!("Load arguments:");
    eprintln!("  --project <FILE>    Project settings file to load");
    eprintln!("  --settings <FILE>   Application settings file (default: astrolabe_settings.json)");
}

pub enum Command {
    Init {
        db_path: PathBuf,
    },
    Status {
        db_path: PathBuf,
        output_format: OutputFormat,
    },
    Search {
        db_path: PathBuf,
        term: String,
        output_format: OutputFormat,
    },
    Errors {
        db_path: PathBuf,
        fatal_only: bool,
        output_format: OutputFormat,
    },
    Vacuum {
        db_path: PathBuf,
    },
    Load {
        project_path: PathBuf,
        settings_path: PathBuf,
    },
    Version,
}

struct ArgParser {
    args: Vec<String>,
    index: usize,
}

impl ArgParser {
    fn new(args: Vec<String>) -> ArgParser {
        ArgParser { args, index: 2 }
    }

    fn next_flag(&mut self) -> Option<String> {
        let flag = self.args.get(self.index).cloned();
        if flag.is_some() {
            self.index += 1;
        }
        flag
    }

    fn value_for(&mut self, flag: &str) -> Result<String> {
        let value = self
            .args
            .get(self.index)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} requires an argument", flag))?;
        self.index += 1;
        Ok(value)
    }
}

fn parse_output_format(value: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(value)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", value))
}

pub fn parse_args(args: Vec<String>) -> Result<Command> {
    if args.len() < 2 {
        return Err(anyhow::anyhow!("Missing command"));
    }

    let command = args[1].clone();
    let mut parser = ArgParser::new(args);

    match command.as_str() {
        "init" | "vacuum" => {
            let mut db_path: Option<PathBuf> = None;
            while let Some(flag) = parser.next_flag() {
                match flag.as_str() {
                    "--db" => db_path = Some(PathBuf::from(parser.value_for("--db")?)),
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }
            let db_path = db_path.ok_or_else(|| anyhow::anyhow!("--db is required"))?;
            Ok(match command.as_str() {
                "init" => Command::Init { db_path },
                _ => Command::Vacuum { db_path },
            })
        }
        "status" => {
            let mut db_path: Option<PathBuf> = None;
            let mut output_format = OutputFormat::Human;
            while let Some(flag) = parser.next_flag() {
                match flag.as_str() {
                    "--db" => db_path = Some(PathBuf::from(parser.value_for("--db")?)),
                    "--output" => output_format = parse_output_format(&parser.value_for("--output")?)?,
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }
            Ok(Command::Status {
                db_path: db_path.ok_or_else(|| anyhow::anyhow!("--db is required"))?,
                output_format,
            })
        }
        "search" => {
            let mut db_path: Option<PathBuf> = None;
            let mut term: Option<String> = None;
            let mut output_format = OutputFormat::Human;
            while let Some(flag) = parser.next_flag() {
                match flag.as_str() {
                    "--db" => db_path = Some(PathBuf::from(parser.value_for("--db")?)),
                    "--term" => term = Some(parser.value_for("--term")?),
                    "--output" => output_format = parse_output_format(&parser.value_for("--output")?)?,
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }
            Ok(Command::Search {
                db_path: db_path.ok_or_else(|| anyhow::anyhow!("--db is required"))?,
                term: term.ok_or_else(|| anyhow::anyhow!("--term is required"))?,
                output_format,
            })
        }
        "errors" => {
            let mut db_path: Option<PathBuf> = None;
            let mut fatal_only = false;
            let mut output_format = OutputFormat::Human;
            while let Some(flag) = parser.next_flag() {
                match flag.as_str() {
                    "--db" => db_path = Some(PathBuf::from(parser.value_for("--db")?)),
                    "--fatal-only" => fatal_only = true,
                    "--output" => output_format = parse_output_format(&parser.value_for("--output")?)?,
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }
            Ok(Command::Errors {
                db_path: db_path.ok_or_else(|| anyhow::anyhow!("--db is required"))?,
                fatal_only,
                output_format,
            })
        }
        "load" => {
            let mut project_path: Option<PathBuf> = None;
            let mut settings_path = PathBuf::from("astrolabe_settings.json");
            while let Some(flag) = parser.next_flag() {
                match flag.as_str() {
                    "--project" => {
                        project_path = Some(PathBuf::from(parser.value_for("--project")?))
                    }
                    "--settings" => settings_path = PathBuf::from(parser.value_for("--settings")?),
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }
            Ok(Command::Load {
                project_path: project_path
                    .ok_or_else(|| anyhow::anyhow!("--project is required"))?,
                settings_path,
            })
        }
        "version" | "--version" | "-V" => Ok(Command::Version),
        "--help" | "-h" => {
            print_usage();
            std::process::exit(0);
        }
        other => Err(anyhow::anyhow!("Unknown command: {}", other)),
    }
}

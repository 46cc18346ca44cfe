use clap::{Parser, Subcommand};
use scene_router::core::config::{self, CliOverrides};
use scene_router::core::error::RouterError;
use scene_router::core::history::History;
use scene_router::core::navigator::Navigator;
use scene_router::core::route::compile;
use scene_router::core::scene::{load_scene_file, scene_schema};
use scene_router::shell::{self, TextRenderer};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "scene-router", about = "Declarative scene navigation core")]
struct Args {
    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log file path
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Compile a scene file and print the route table
    Check {
        scenes: PathBuf,
    },
    /// Replay a navigation script against a scene file
    Run {
        scenes: PathBuf,
        /// Script to replay (stdin when omitted)
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Print only the active scene after each command
        #[arg(short, long)]
        compact: bool,
    },
    /// Print the JSON Schema of the scene file format
    Schema,
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Ignoring config file: {e}");
        config::RouterConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            log_level: args.log_level.clone(),
            log_file: args.log_file.clone(),
        },
    );

    // Initialize file logger
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!("scene-router starting up with {:?}", resolved);

    match run(args.command, resolved.history_limit) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            match e.downcast_ref::<RouterError>() {
                Some(router_error) if router_error.is_compile_time() => {
                    eprintln!("invalid scene tree: {e}");
                    ExitCode::from(2)
                }
                _ => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run(command: CliCommand, history_limit: usize) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        CliCommand::Check { scenes } => {
            let table = compile(&load_scene_file(&scenes)?)?;
            print!("{}", table.describe());
            println!(
                "{} routes, triggers: {}",
                table.len(),
                table.trigger_names().collect::<Vec<_>>().join(", ")
            );
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Run {
            scenes,
            script,
            compact,
        } => {
            let table = compile(&load_scene_file(&scenes)?)?;
            let mut navigator =
                Navigator::new(table).with_history(History::with_limit(history_limit));
            navigator.mount();

            let mut renderer = TextRenderer { compact };
            let mut stdout = io::stdout().lock();
            let summary = match script {
                Some(path) => {
                    let input = BufReader::new(File::open(&path)?);
                    shell::replay(&mut navigator, input, &mut stdout, &mut renderer)?
                }
                None => shell::replay(&mut navigator, io::stdin().lock(), &mut stdout, &mut renderer)?,
            };

            log::info!("Replay summary: {:?}", summary);
            if summary.errors > 0 {
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Schema => {
            println!("{}", serde_json::to_string_pretty(&scene_schema())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

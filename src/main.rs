use std::io::{stdin, stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use tracing::Level;
use sketch_interpreter::config::Config;
use sketch_interpreter::error::Error;
use sketch_interpreter::interpreter::{self, Interpreter};

#[derive(Parser)]
#[command(name = "sketch", version, about = "Interpreter for small Arduino-style sketches")]
struct Cli {
    /// Script to run once; starts the REPL when omitted
    file: Option<PathBuf>,

    /// TOML file with session limits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Loop iteration cap, overrides the config file
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Evaluate against a fresh environment
    #[arg(long)]
    fresh: bool,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Error> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations;
    }

    let path = match cli.file {
        Some(path) => path,
        None => {
            interpreter::start(stdin(), stdout(), &config)?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    let source = std::fs::read_to_string(&path)?;
    let mut session = Interpreter::with_config(&config);
    let result = if cli.fresh {
        session.run_code_fresh(&source)
    } else {
        session.run_code(&source)
    };
    for msg in &result.parse_errors {
        eprintln!("{}: {}", path.display(), msg);
    }
    println!("{}", result.result_text);

    Ok(if result.is_error { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

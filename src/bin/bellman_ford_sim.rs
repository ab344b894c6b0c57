//! CLI entry point: loads a connectivity file, runs the simulation, and
//! reports each process's result as it converges.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use bellman_ford::{CliError, Driver};

#[derive(Parser)]
#[command(name = "bellman-ford-sim", about = "Asynchronous distributed Bellman-Ford simulator")]
struct Args {
  /// Path to a connectivity file: `N R` on line 1, then N rows of N
  /// signed integers (-1 meaning no edge).
  connectivity_file: PathBuf,
}

fn run(args: Args) -> Result<(), CliError> {
  let file = File::open(&args.connectivity_file)
    .map_err(|source| CliError::FileOpen { path: args.connectivity_file.clone(), source })?;
  let (matrix, root) = bellman_ford::parser::parse_connectivity(BufReader::new(file))?;

  for result in Driver::new(matrix, root).run() {
    if result.is_source {
      println!("proc {} (source) converge-cast complete, broadcast terminate", result.id);
    } else {
      println!(
        "proc {}: parent = {} dist = {}",
        result.id,
        result.parent.expect("a non-source actor always has a parent once converged"),
        result.dist
      );
    }
  }
  Ok(())
}

fn main() -> ExitCode {
  env_logger::init();

  match run(Args::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("{} {err}", "error:".red().bold());
      ExitCode::FAILURE
    }
  }
}

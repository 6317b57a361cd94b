//! Minimal CLI driver: load a file, run it, exit.
//!
//! The REPL, argument parsing beyond a single filename, and most of the
//! exit-code contract are out of scope for this crate's core (the host
//! driver is an external collaborator per the language spec); this binary
//! exists only so the library is runnable from a terminal during
//! development.

use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "que", about = "Run a Que script")]
struct Args {
  /// Path to a `.que` source file.
  path: std::path::PathBuf,

  /// Print the disassembled bytecode of the script before running it.
  #[arg(long)]
  disassemble: bool,
}

fn main() -> ExitCode {
  let args = Args::parse();

  let source = match std::fs::read_to_string(&args.path) {
    Ok(s) => s,
    Err(e) => {
      eprintln!("{}: {e}", args.path.display());
      return ExitCode::from(75);
    }
  };

  let filename = args.path.to_string_lossy().into_owned();

  if args.disassemble {
    match que::compiler::compile(&filename, &source) {
      Ok(function) => print!("{}", function.chunk.disassemble(&filename)),
      Err(e) => {
        eprintln!("{e}");
        return ExitCode::from(65);
      }
    }
  }

  let mut state = que::State::new();
  que::builtins::install(&mut state);

  match state.execute_string(&filename, &source) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{}", e.report(&filename, &source));
      ExitCode::FAILURE
    }
  }
}

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use emulator::vm::Vm;
use miette::IntoDiagnostic;
use tracing::Level;

/// Run an LS-8 program
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
  /// Program to load, one 8-digit binary literal per line
  #[arg(value_name = "FILE")]
  program: PathBuf,

  /// Enable debug logging
  #[arg(long)]
  debug: bool,

  /// Print the machine state before every instruction
  #[arg(long)]
  trace: bool,
}

fn main() -> miette::Result<()> {
  let cli = Cli::parse();
  if cli.trace {
    init_tracing(Level::TRACE);
  } else if cli.debug {
    init_tracing(Level::DEBUG);
  } else {
    init_tracing(Level::WARN);
  }

  let mut vm = Vm::new();
  vm.load_file(&cli.program).into_diagnostic()?;

  let stdout = io::stdout();
  let mut out = stdout.lock();
  vm.run(&mut out).into_diagnostic()?;
  out.flush().into_diagnostic()?;
  Ok(())
}

fn init_tracing(level: Level) {
  let _ = tracing_subscriber::fmt()
    .without_time()
    .with_target(false)
    .with_max_level(level)
    .with_writer(io::stderr)
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_defaults() {
    let cli = Cli::parse_from(["ls8", "print8.ls8"]);
    assert_eq!(cli.program, PathBuf::from("print8.ls8"));
    assert!(!cli.debug);
    assert!(!cli.trace);
  }

  #[test]
  fn parse_flags() {
    let cli = Cli::parse_from(["ls8", "--trace", "call.ls8", "--debug"]);
    assert_eq!(cli.program, PathBuf::from("call.ls8"));
    assert!(cli.debug);
    assert!(cli.trace);
  }

  #[test]
  fn program_is_required() {
    assert!(Cli::try_parse_from(["ls8"]).is_err());
  }
}

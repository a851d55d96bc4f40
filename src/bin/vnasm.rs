//! Assembles a source file into a binary image.
//!
//!   vnasm <source> <output> [--listing]

use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use vncomputer::Assembly;

#[derive(Parser, Debug)]
#[command(name = "vnasm", version, about = "Assembler for the 128 word von Neumann machine")]
struct Cli {
  /// Assembly source file.
  source  : PathBuf,
  /// Where to write the little-endian binary image.
  output  : PathBuf,
  /// Print the label table and the assembled code to stderr.
  #[arg(short = 'l', long = "listing")]
  listing : bool,
}

fn main() {
  let cli = Cli::parse();

  #[cfg(feature = "trace_computation")]
    eprintln!("Computation Tracing ENABLED");

  let text =
    match fs::read_to_string(&cli.source) {
      Ok(text) => text,
      Err(e)   => {
        eprintln!("Error: cannot read {}: {}", cli.source.display(), e);
        exit(1);
      }
    };

  let assembly =
    match Assembly::assemble(&text) {
      Ok(assembly) => assembly,
      Err(e)       => {
        eprintln!("{}", e);
        exit(1);
      }
    };

  if cli.listing {
    eprintln!("{}", assembly);
  }

  if let Err(e) = fs::write(&cli.output, assembly.to_bytes()) {
    eprintln!("Error: cannot write {}: {}", cli.output.display(), e);
    exit(1);
  }
}

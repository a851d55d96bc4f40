//! Loads a binary image and runs it until `halt`. Bytes written by `put` go to stdout.
//!
//!   vnsim <image> <start_pc> [--dump]

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use vncomputer::Machine;

#[derive(Parser, Debug)]
#[command(name = "vnsim", version, about = "Simulator for the 128 word von Neumann machine")]
struct Cli {
  /// Binary image produced by `vnasm`.
  image : PathBuf,
  /// Address of the first instruction.
  #[arg(allow_negative_numbers = true)]
  start : i64,
  /// Print the registers and memory to stderr after the machine halts.
  #[arg(short = 'd', long = "dump")]
  dump  : bool,
}

fn main() {
  let cli = Cli::parse();

  #[cfg(feature = "trace_computation")]
    eprintln!("Computation Tracing ENABLED");

  let image =
    match fs::read(&cli.image) {
      Ok(image) => image,
      Err(e)    => {
        eprintln!("Error: cannot read {}: {}", cli.image.display(), e);
        exit(1);
      }
    };

  let mut machine =
    match Machine::boot(&image, cli.start) {
      Ok(machine) => machine,
      Err(e)      => {
        eprintln!("{}", e);
        exit(1);
      }
    };

  let stdout     = io::stdout();
  let mut output = stdout.lock();
  let result     = machine.run(&mut output);
  // Output written before a fault is still shown.
  let flushed    = output.flush();

  if cli.dump {
    eprintln!("{}", machine);
  }

  match result {
    Ok(_cycles) => {
      #[cfg(feature = "trace_computation")]
        eprintln!("Halted after {} cycles.", _cycles);
    }
    Err(e) => {
      eprintln!("{}", e);
      exit(1);
    }
  }

  if let Err(e) = flushed {
    eprintln!("Error: could not write output: {}", e);
    exit(1);
  }
}

/*!
  An assembler and a simulator for a small von Neumann computer with 128 words of memory.

  `Assembly::assemble` turns source text into a little-endian binary image, and `Machine::boot`
  followed by `Machine::run` executes such an image. The `vnasm` and `vnsim` binaries wrap the
  two halves.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod register;
pub mod symboltable;
mod table;
pub mod error;
pub mod assembler;
pub mod machine;
pub mod engine;

pub use assembler::Assembly;
pub use engine::State;
pub use error::{AssemblyError, MachineError};
pub use machine::Machine;

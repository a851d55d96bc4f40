//! Errors reported by the assembler and the machine. Every error is fatal to the run that
//! produced it; there is nothing to recover from.

use std::fmt::{Display, Formatter};

use crate::bytecode::{Operation, MEMORY_WORDS};

/// Why a code line failed to encode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyntaxErrorKind {
  /// A line beginning with `.` that is not a well formed `.word`.
  MalformedDirective,
  UnknownMnemonic(String),
  MalformedOperands {
    operation : Operation,
    operands  : String
  },
  UnresolvedLabel(String)
}

impl Display for SyntaxErrorKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      SyntaxErrorKind::MalformedDirective => {
        write!(f, "malformed directive, expected `.word <integer>`")
      }
      SyntaxErrorKind::UnknownMnemonic(name) => {
        write!(f, "{} is not an operation", name)
      }
      SyntaxErrorKind::MalformedOperands { operation, operands } => {
        write!(f, "malformed operands for {}: `{}`", operation, operands)
      }
      SyntaxErrorKind::UnresolvedLabel(name) => {
        write!(f, "label {} is never defined", name)
      }
    }
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssemblyError {
  /// Empty, or contains a character other than an ASCII alphanumeric or `_`.
  InvalidLabel {
    line  : usize,
    label : String
  },
  LabelTooLong {
    line  : usize,
    label : String
  },
  DuplicateLabel {
    line  : usize,
    label : String
  },
  /// More code lines than fit in memory.
  ProgramTooLarge {
    words : usize
  },
  /// `index` is the emission index of the code line; `line` is its 1-based source line.
  Syntax {
    index : usize,
    line  : usize,
    kind  : SyntaxErrorKind
  }
}

impl AssemblyError {
  /// The emission index of the offending code line, if the error is tied to one. A program that
  /// is too large fails at the first index past the end of memory.
  pub fn index(&self) -> Option<usize> {
    match self {
      AssemblyError::Syntax { index, .. }   => Some(*index),
      AssemblyError::ProgramTooLarge { .. } => Some(MEMORY_WORDS),
      _                                     => None
    }
  }
}

impl Display for AssemblyError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      AssemblyError::InvalidLabel { line, label } => {
        write!(f, "Syntax Error on source line {}: label `{}` is invalid.", line, label)
      }
      AssemblyError::LabelTooLong { line, label } => {
        write!(f, "Syntax Error on source line {}: label {} is too long.", line, label)
      }
      AssemblyError::DuplicateLabel { line, label } => {
        write!(f, "Syntax Error on source line {}: label {} is already defined.", line, label)
      }
      AssemblyError::ProgramTooLarge { words } => {
        write!(f, "Error in line {}: program is {} words but memory holds only {}.",
               MEMORY_WORDS, words, MEMORY_WORDS)
      }
      AssemblyError::Syntax { index, line, kind } => {
        write!(f, "Syntax Error in line {} (source line {}): {}.", index, line, kind)
      }
    }
  }
}

impl std::error::Error for AssemblyError {}

#[derive(Debug)]
pub enum MachineError {
  ImageTooLarge {
    bytes : usize
  },
  /// The image length is not a whole number of words.
  MisalignedImage {
    bytes : usize
  },
  StartAddressOutOfRange {
    pc : i64
  },
  PcOutOfBounds {
    pc : u32
  },
  InvalidOpcode {
    pc     : u32,
    opcode : u8
  },
  /// A register field above 64.
  InvalidRegister {
    pc       : u32,
    register : u8
  },
  /// The output stream rejected a `put`.
  Output(std::io::Error)
}

impl Display for MachineError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      MachineError::ImageTooLarge { bytes } => {
        write!(f, "Error: program is too big ({} bytes, at most {}).", bytes, MEMORY_WORDS * 4)
      }
      MachineError::MisalignedImage { bytes } => {
        write!(f, "Error: image of {} bytes is not a whole number of words.", bytes)
      }
      MachineError::StartAddressOutOfRange { pc } => {
        write!(f, "Error: start address {} should be in 0-{}.", pc, MEMORY_WORDS - 1)
      }
      MachineError::PcOutOfBounds { pc } => {
        write!(f, "Error: PC {} is outside memory.", pc)
      }
      MachineError::InvalidOpcode { pc, opcode } => {
        write!(f, "Error: invalid opcode 0x{:x} at address {}.", opcode, pc)
      }
      MachineError::InvalidRegister { pc, register } => {
        write!(f, "Error: invalid register {} at address {}.", register, pc)
      }
      MachineError::Output(e) => {
        write!(f, "Error: could not write output: {}", e)
      }
    }
  }
}

impl std::error::Error for MachineError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      MachineError::Output(e) => Some(e),
      _                       => None
    }
  }
}

impl From<std::io::Error> for MachineError {
  fn from(e: std::io::Error) -> MachineError {
    MachineError::Output(e)
  }
}

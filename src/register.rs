//! A register name, either one of the general purpose registers `R0`..`R63` or the stack
//! pointer `sp`, with some convenience functions.

use std::fmt::{Display, Formatter};

/// The number of general purpose registers, `R0`..`R63`.
pub const GENERAL_REGISTER_COUNT: u8 = 64;
/// The register file index of the stack pointer.
pub const SP_INDEX: u8 = 64;
/// The total number of addressable registers, including `sp`.
pub const REGISTER_COUNT: usize = 65;

// `RegisterNumberType` is `u8`, as that is the width of a register field in an encoded word.
pub type RegisterNumberType = u8;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Register {
  /// One of `R0`..`R63`.
  General(RegisterNumberType),
  /// `sp`, which lives in the register file at index 64.
  StackPointer
}

impl Register {
  /// Converts the register to an index into the register file.
  pub fn idx(&self) -> usize {
    match self {
      Register::General(n)    => *n as usize,
      Register::StackPointer  => SP_INDEX as usize
    }
  }

  /// The value stored in a register field of an encoded word.
  pub fn code(&self) -> RegisterNumberType {
    match self {
      Register::General(n)    => *n,
      Register::StackPointer  => SP_INDEX
    }
  }

  /// Interprets a register field of a decoded word. Field values above 64 name no register.
  pub fn from_code(code: RegisterNumberType) -> Option<Register> {
    match code {
      n if n < GENERAL_REGISTER_COUNT => Some(Register::General(n)),
      SP_INDEX                        => Some(Register::StackPointer),
      _                               => None
    }
  }
}

/// Fields an instruction does not use are encoded as zero, which reads back as `R0`.
impl Default for Register {
  fn default() -> Register {
    Register::General(0)
  }
}

impl Display for Register {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Register::General(n) => {
        write!(f, "R{}", n)
      },
      Register::StackPointer => {
        write!(f, "sp")
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_round_trip_through_the_register_file() {
    assert_eq!(Register::from_code(0), Some(Register::General(0)));
    assert_eq!(Register::from_code(63), Some(Register::General(63)));
    assert_eq!(Register::from_code(64), Some(Register::StackPointer));
    assert_eq!(Register::StackPointer.idx(), 64);
    assert_eq!(Register::General(3).code(), 3);
  }

  #[test]
  fn codes_above_sp_are_not_registers() {
    assert_eq!(Register::from_code(65), None);
    assert_eq!(Register::from_code(0xFF), None);
  }

  #[test]
  fn display() {
    assert_eq!(Register::General(12).to_string(), "R12");
    assert_eq!(Register::StackPointer.to_string(), "sp");
  }
}

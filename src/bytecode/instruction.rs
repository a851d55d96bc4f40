use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::register::Register;

/**
  Opcodes of the machine.

  The discriminants are the opcode bytes themselves, so `num_enum` converts between an
  `Operation` and byte 3 of an encoded word, and `strum` converts between an `Operation` and its
  mnemonic. Note the gap between `jmp` (0x0c) and `iret` (0x10).
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,           Hash
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Operation {
  Halt    = 0x00, // halt
  Nop     = 0x01, // nop
  Addi    = 0x02, // addi Rs, Rt, imm
  MoveReg = 0x03, // move_reg Rs, Rt
  Movei   = 0x04, // movei Rt, imm
  Lw      = 0x05, // lw Rs, Rt, imm
  Sw      = 0x06, // sw Rs, Rt, imm
  Blez    = 0x07, // blez Rs, label
  La      = 0x08, // la Rt, label
  Push    = 0x09, // push Rs
  Pop     = 0x0a, // pop Rt
  Add     = 0x0b, // add Rs, Rt
  Jmp     = 0x0c, // jmp label

  Iret    = 0x10, // iret
  Put     = 0x11, // put Rs
}

/// The operand shapes of the assembly language. Each `Operation` has exactly one.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Operands {
  /// `halt`, `nop`, `iret`
  Nullary,
  /// `push Rs`, `put Rs`
  Source,
  /// `pop Rt`
  Target,
  /// `add Rs, Rt`, `move_reg Rs, Rt`
  SourceTarget,
  /// `addi Rs, Rt, imm`, `lw Rs, Rt, imm`, `sw Rs, Rt, imm`
  SourceTargetImmediate,
  /// `movei Rt, imm`
  TargetImmediate,
  /// `blez Rs, label`
  SourceLabel,
  /// `la Rt, label`
  TargetLabel,
  /// `jmp label`
  Label,
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn mnemonic(&self) -> &'static str {
    self.into()
  }

  pub fn operands(&self) -> Operands {
    match self {
      Operation::Halt | Operation::Nop | Operation::Iret  => Operands::Nullary,
      Operation::Push | Operation::Put                    => Operands::Source,
      Operation::Pop                                      => Operands::Target,
      Operation::Add  | Operation::MoveReg                => Operands::SourceTarget,
      Operation::Addi | Operation::Lw | Operation::Sw     => Operands::SourceTargetImmediate,
      Operation::Movei                                    => Operands::TargetImmediate,
      Operation::Blez                                     => Operands::SourceLabel,
      Operation::La                                       => Operands::TargetLabel,
      Operation::Jmp                                      => Operands::Label,
    }
  }

  /// Whether the immediate field holds a label offset relative to the instruction's address.
  pub fn is_relative(&self) -> bool {
    match self.operands() {
      Operands::SourceLabel | Operands::TargetLabel | Operands::Label => true,
      _                                                               => false
    }
  }
}

/**
  Holds the unencoded components of an instruction. Fields an operation does not use are zero,
  i.e. `R0` and an immediate of `0`, which is exactly how they are encoded.

  For the label forms, `imm` is the relative offset `target - index - 1`, not the label address.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub operation : Operation,
  pub sreg      : Register,
  pub treg      : Register,
  pub imm       : i8
}

impl Instruction {
  pub fn nullary(operation: Operation) -> Instruction {
    Instruction {
      operation,
      sreg : Register::default(),
      treg : Register::default(),
      imm  : 0
    }
  }

  pub fn new(operation: Operation, sreg: Register, treg: Register, imm: i8) -> Instruction {
    Instruction { operation, sreg, treg, imm }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let Instruction { operation, sreg, treg, imm } = self;
    match operation.operands() {

      Operands::Nullary => {
        write!(f, "{}", operation)
      }

      Operands::Source => {
        write!(f, "{} {}", operation, sreg)
      }

      Operands::Target => {
        write!(f, "{} {}", operation, treg)
      }

      Operands::SourceTarget => {
        write!(f, "{} {}, {}", operation, sreg, treg)
      }

      Operands::SourceTargetImmediate => {
        write!(f, "{} {}, {}, {}", operation, sreg, treg, imm)
      }

      Operands::TargetImmediate => {
        write!(f, "{} {}, {}", operation, treg, imm)
      }

      // Relative offsets are shown with an explicit sign, e.g. `jmp +3`.
      Operands::SourceLabel => {
        write!(f, "{} {}, {:+}", operation, sreg, imm)
      }

      Operands::TargetLabel => {
        write!(f, "{} {}, {:+}", operation, treg, imm)
      }

      Operands::Label => {
        write!(f, "{} {:+}", operation, imm)
      }

    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::convert::TryFrom;
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  #[test]
  fn mnemonics() {
    assert_eq!(Operation::from_str("move_reg"), Ok(Operation::MoveReg));
    assert_eq!(Operation::from_str("movei"), Ok(Operation::Movei));
    assert_eq!(Operation::from_str("iret"), Ok(Operation::Iret));
    assert!(Operation::from_str("HALT").is_err());
    assert!(Operation::from_str("mov").is_err());
    assert_eq!(Operation::MoveReg.mnemonic(), "move_reg");
  }

  #[test]
  fn every_operation_round_trips_through_its_opcode_and_mnemonic() {
    for operation in Operation::iter() {
      assert_eq!(Operation::try_from(operation.code()).ok(), Some(operation));
      assert_eq!(Operation::from_str(operation.mnemonic()), Ok(operation));
    }
  }

  #[test]
  fn opcodes() {
    assert_eq!(Operation::Halt.code(), 0x00);
    assert_eq!(Operation::Jmp.code(), 0x0c);
    assert_eq!(Operation::Iret.code(), 0x10);
    assert_eq!(Operation::Put.code(), 0x11);
    assert!(Operation::try_from(0x0du8).is_err());
    assert!(Operation::try_from(0xffu8).is_err());
  }

  #[test]
  fn only_label_operations_are_relative() {
    let relative: Vec<Operation> = Operation::iter().filter(|op| op.is_relative()).collect();
    assert_eq!(relative, vec![Operation::Blez, Operation::La, Operation::Jmp]);
  }

  #[test]
  fn display() {
    let addi = Instruction::new(Operation::Addi, Register::General(1), Register::General(2), -3);
    assert_eq!(addi.to_string(), "addi R1, R2, -3");

    let jmp = Instruction::new(Operation::Jmp, Register::default(), Register::default(), 2);
    assert_eq!(jmp.to_string(), "jmp +2");

    let push = Instruction::new(Operation::Push, Register::StackPointer, Register::default(), 0);
    assert_eq!(push.to_string(), "push sp");

    assert_eq!(Instruction::nullary(Operation::Halt).to_string(), "halt");
  }
}

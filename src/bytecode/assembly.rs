/*!
  The human readable textual form of bytecode is called assembly. This module holds the `nom`
  parsers for the pieces of an assembly line: registers, immediates, label names, operand lists,
  and the `.word` directive. Mnemonics are not parsed here; they are looked up with the `strum`
  derives on `Operation`.

  Operand lists are parsed after all whitespace has been removed from them, so the parsers below
  do not skip whitespace themselves. The `.word` directive is parsed from the raw line.
*/

use nom::{
  IResult,
  branch::alt,
  bytes::complete::{tag, take_while1, take_while_m_n},
  character::complete::{
    char as one_char,
    digit1,
    multispace0,
    multispace1
  },
  combinator::{all_consuming, eof, map, map_opt, opt, recognize, rest, value},
  sequence::{delimited, pair, preceded, separated_pair, tuple},
};

use crate::bytecode::{Operands, Word};
use crate::register::{Register, GENERAL_REGISTER_COUNT};

/// Characters allowed in a label name.
pub fn is_label_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

/// `R0`..`R63`, with one or two digits, or `sp`.
pub fn register(input: &str) -> IResult<&str, Register> {
  alt((
    value(Register::StackPointer, tag("sp")),
    map_opt(
      preceded(one_char('R'), take_while_m_n(1, 2, |c: char| c.is_ascii_digit())),
      |digits: &str| {
        match digits.parse::<u8>() {
          Ok(n) if n < GENERAL_REGISTER_COUNT => Some(Register::General(n)),
          _                                  => None
        }
      }
    )
  ))(input)
}

/// An optionally negative decimal literal, accumulated modulo 2^64. The narrower truncations
/// below keep exact low bits regardless of how long the literal is.
fn decimal(input: &str) -> IResult<&str, i64> {
  map(
    pair(opt(one_char('-')), digit1),
    |(sign, digits): (Option<char>, &str)| {
      let magnitude =
        digits.bytes()
              .fold(0i64, |n, d| n.wrapping_mul(10).wrapping_add((d - b'0') as i64));
      match sign {
        Some(_) => magnitude.wrapping_neg(),
        None    => magnitude
      }
    }
  )(input)
}

/// A decimal literal truncated to its low 8 bits. Out of range values wrap silently.
pub fn immediate(input: &str) -> IResult<&str, i8> {
  map(decimal, |n| n as i8)(input)
}

pub fn label_name(input: &str) -> IResult<&str, &str> {
  take_while1(is_label_char)(input)
}

/// A decimal literal truncated to its low 32 bits.
pub fn word_literal(input: &str) -> IResult<&str, Word> {
  map(decimal, |n| n as Word)(input)
}

/// `.word <literal>`, followed only by whitespace and an optional comment.
pub fn word_directive(input: &str) -> IResult<&str, Word> {
  delimited(
    pair(tag(".word"), multispace1),
    word_literal,
    pair(multispace0, alt((eof, recognize(pair(one_char(';'), rest)))))
  )(input)
}

/// The operand values of one instruction, before label resolution. Operands absent from the
/// instruction's shape keep their zero defaults.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OperandValues<'a> {
  pub sreg  : Register,
  pub treg  : Register,
  pub imm   : i8,
  pub label : Option<&'a str>
}

fn two_registers(input: &str) -> IResult<&str, (Register, Register)> {
  separated_pair(register, one_char(','), register)(input)
}

fn register_label(input: &str) -> IResult<&str, (Register, &str)> {
  separated_pair(register, one_char(','), label_name)(input)
}

/// Runs `parser` over the whole of `text`.
fn complete<'a, O, P>(parser: P, text: &'a str) -> Option<O>
  where P: FnMut(&'a str) -> IResult<&'a str, O>
{
  all_consuming(parser)(text).ok().map(|(_rest, out)| out)
}

/**
  Parses a whitespace-free, comma-separated operand list of the given shape. Returns `None` if
  the text does not match the shape exactly.
*/
pub fn parse_operands(shape: Operands, text: &str) -> Option<OperandValues<'_>> {
  let defaults = OperandValues::default();

  match shape {

    Operands::Nullary => {
      match text.is_empty() {
        true  => Some(defaults),
        false => None
      }
    }

    Operands::Source => {
      complete(register, text).map(|sreg| OperandValues{ sreg, ..defaults })
    }

    Operands::Target => {
      complete(register, text).map(|treg| OperandValues{ treg, ..defaults })
    }

    Operands::SourceTarget => {
      complete(two_registers, text).map(|(sreg, treg)| OperandValues{ sreg, treg, ..defaults })
    }

    Operands::SourceTargetImmediate => {
      complete(
        tuple((register, one_char(','), register, one_char(','), immediate)),
        text
      ).map(|(sreg, _, treg, _, imm)| OperandValues{ sreg, treg, imm, ..defaults })
    }

    Operands::TargetImmediate => {
      complete(separated_pair(register, one_char(','), immediate), text)
        .map(|(treg, imm)| OperandValues{ treg, imm, ..defaults })
    }

    Operands::SourceLabel => {
      complete(register_label, text)
        .map(|(sreg, label)| OperandValues{ sreg, label: Some(label), ..defaults })
    }

    Operands::TargetLabel => {
      complete(register_label, text)
        .map(|(treg, label)| OperandValues{ treg, label: Some(label), ..defaults })
    }

    Operands::Label => {
      complete(label_name, text).map(|label| OperandValues{ label: Some(label), ..defaults })
    }

  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn reg(text: &str) -> Option<Register> {
    complete(register, text)
  }

  #[test]
  fn registers() {
    assert_eq!(reg("R0"), Some(Register::General(0)));
    assert_eq!(reg("R07"), Some(Register::General(7)));
    assert_eq!(reg("R63"), Some(Register::General(63)));
    assert_eq!(reg("sp"), Some(Register::StackPointer));
  }

  #[test]
  fn malformed_registers() {
    assert_eq!(reg("R64"), None);
    assert_eq!(reg("R100"), None);
    assert_eq!(reg("r1"), None);
    assert_eq!(reg("R"), None);
    assert_eq!(reg("SP"), None);
    assert_eq!(reg("R-1"), None);
  }

  #[test]
  fn immediates_are_truncated_to_eight_bits() {
    assert_eq!(complete(immediate, "127"), Some(127));
    assert_eq!(complete(immediate, "-128"), Some(-128));
    assert_eq!(complete(immediate, "128"), Some(-128));
    assert_eq!(complete(immediate, "200"), Some(-56));
    assert_eq!(complete(immediate, "-129"), Some(127));
    assert_eq!(complete(immediate, "256"), Some(0));
    // Past the range of i64 the low byte is still exact.
    assert_eq!(complete(immediate, "99999999999999999999"), Some(-1));
    assert_eq!(complete(immediate, "18446744073709551743"), Some(127));
    assert_eq!(complete(immediate, "-99999999999999999999"), Some(1));
    assert_eq!(complete(immediate, "12a"), None);
    assert_eq!(complete(immediate, "-"), None);
  }

  #[test]
  fn word_directives() {
    assert_eq!(complete(word_directive, ".word 5"), Some(5));
    assert_eq!(complete(word_directive, ".word\t-1   ; all ones"), Some(0xFFFF_FFFF));
    assert_eq!(complete(word_directive, ".word 42;no space"), Some(42));
    assert_eq!(complete(word_directive, ".word 4294967296"), Some(0));
    assert_eq!(complete(word_directive, ".word 2147483648"), Some(0x8000_0000));
    assert_eq!(complete(word_directive, ".word 99999999999999999999"), Some(0x630F_FFFF));
    assert_eq!(complete(word_directive, ".word -18446744073709551617"), Some(0xFFFF_FFFF));
  }

  #[test]
  fn malformed_word_directives() {
    assert_eq!(complete(word_directive, ".word"), None);
    assert_eq!(complete(word_directive, ".word5"), None);
    assert_eq!(complete(word_directive, ".word 5 6"), None);
    assert_eq!(complete(word_directive, ".word 5x"), None);
    assert_eq!(complete(word_directive, ".word x"), None);
    assert_eq!(complete(word_directive, ".words 5"), None);
  }

  #[test]
  fn operand_shapes() {
    assert_eq!(
      parse_operands(Operands::SourceTargetImmediate, "R1,R2,-3"),
      Some(OperandValues{
        sreg: Register::General(1), treg: Register::General(2), imm: -3, label: None
      })
    );
    assert_eq!(
      parse_operands(Operands::TargetImmediate, "R3,72"),
      Some(OperandValues{ treg: Register::General(3), imm: 72, ..Default::default() })
    );
    assert_eq!(
      parse_operands(Operands::SourceLabel, "R0,loop_1"),
      Some(OperandValues{ sreg: Register::General(0), label: Some("loop_1"), ..Default::default() })
    );
    assert_eq!(
      parse_operands(Operands::Target, "sp"),
      Some(OperandValues{ treg: Register::StackPointer, ..Default::default() })
    );
    assert_eq!(parse_operands(Operands::Nullary, ""), Some(OperandValues::default()));
  }

  #[test]
  fn operand_shape_mismatches() {
    assert_eq!(parse_operands(Operands::Nullary, "R0"), None);
    assert_eq!(parse_operands(Operands::SourceTarget, "R0"), None);
    assert_eq!(parse_operands(Operands::SourceTarget, "R0,R1,R2"), None);
    assert_eq!(parse_operands(Operands::SourceTargetImmediate, "R0,R1"), None);
    assert_eq!(parse_operands(Operands::Label, "R0,done"), None);
    assert_eq!(parse_operands(Operands::Label, ""), None);
    assert_eq!(parse_operands(Operands::TargetLabel, "R0,"), None);
  }
}

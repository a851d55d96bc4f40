/*!
  This module is responsible for the encoding and decoding of binary instructions, and for
  converting between words and the little-endian byte stream of an image file.

  ```text
    byte 3     byte 2     byte 1     byte 0
  [OpCode:8] [SReg:8]   [TReg:8]   [Imm:8]
  ```
*/
use std::convert::TryFrom;

use super::{Instruction, Operation};
use crate::register::Register;

// If you change this you must also change `encode_fields` and `decode_fields`.
pub type Word = u32;
pub const WORD_BYTES: usize = 4;

/// The raw fields of a word, extracted without any interpretation. Register fields may hold
/// values that name no register, and the opcode may be unassigned; the engine checks both.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Fields {
  pub opcode : u8,
  pub sreg   : u8,
  pub treg   : u8,
  pub imm    : i8
}

pub fn encode_fields(fields: Fields) -> Word {
  ((fields.opcode as Word) << 24) |
  ((fields.sreg   as Word) << 16) |
  ((fields.treg   as Word) << 8 ) |
   (fields.imm    as u8 as Word)
}

pub fn decode_fields(word: Word) -> Fields {
  Fields {
    opcode : (word >> 24)          as u8,
    sreg   : ((word >> 16) & 0xFF) as u8,
    treg   : ((word >> 8)  & 0xFF) as u8,
    // The low byte reinterpreted as a signed value.
    imm    : (word & 0xFF)         as u8 as i8
  }
}

/**
  Encodes the instruction into a word. It is the caller's responsibility to leave unused fields
  at their zero defaults.
*/
pub fn encode_instruction(instruction: Instruction) -> Word {
  encode_fields(Fields {
    opcode : instruction.operation.code(),
    sreg   : instruction.sreg.code(),
    treg   : instruction.treg.code(),
    imm    : instruction.imm
  })
}

/// Decodes a word for display. Returns `None` for words that are not instructions, which in a
/// running program are most likely `.word` data.
pub fn try_decode_instruction(word: Word) -> Option<Instruction> {
  let fields    = decode_fields(word);
  let operation = Operation::try_from(fields.opcode).ok()?;

  Some(Instruction {
    operation,
    sreg : Register::from_code(fields.sreg)?,
    treg : Register::from_code(fields.treg)?,
    imm  : fields.imm
  })
}

/// Serializes words in program order, each one little-endian.
pub fn words_to_bytes(words: &[Word]) -> Vec<u8> {
  words.iter()
       .flat_map(|word| word.to_le_bytes().to_vec())
       .collect()
}

/// Splits a byte stream into little-endian words. Returns `None` if the stream has a
/// trailing partial word.
pub fn bytes_to_words(bytes: &[u8]) -> Option<Vec<Word>> {
  if bytes.len() % WORD_BYTES != 0 {
    return None;
  }
  Some(
    bytes.chunks_exact(WORD_BYTES)
         .map(|chunk| Word::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
         .collect()
  )
}

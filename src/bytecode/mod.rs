/*!

  The machine uses a 32 bit little-endian word size, and every instruction is exactly one word.
  Memory addresses are word indices, not byte offsets. The components of an instruction are:

    Opcode:    8 bits, byte 3
    SReg:      8 bits, byte 2, the source register
    TReg:      8 bits, byte 1, the target register
    Immediate: 8 bits, byte 0, signed

  Registers are numbered `R0`..`R63`, and the stack pointer `sp` is register 64.

  Labels do not appear in the bytecode. An instruction that refers to a label at address `addr`
  from emission index `idx` stores the offset `addr - idx - 1` in its immediate field. Because the
  machine always advances the program counter by `1 + imm` from the instruction's own address,
  the program counter lands exactly on `addr`.

  A `.word` directive stores an arbitrary 32 bit value instead of an instruction. The machine does
  not distinguish code from data: a data word reached by the program counter is executed.

*/

mod binary;
mod instruction;
pub mod assembly;

pub use binary::{encode_fields, decode_fields, encode_instruction, try_decode_instruction,
                 words_to_bytes, bytes_to_words, Fields, Word, WORD_BYTES};
pub use instruction::{Instruction, Operation, Operands};

/// The number of words of memory, and so the largest possible program.
pub const MEMORY_WORDS: usize = 128;

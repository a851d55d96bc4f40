//! Structures and functions for the state of the machine: a fixed 128 word memory and the
//! register file. The fetch-decode-execute cycle lives in `crate::engine`.

use std::fmt::{Display, Formatter};

use prettytable::Table;

use crate::bytecode::{bytes_to_words, try_decode_instruction, Word, MEMORY_WORDS, WORD_BYTES};
use crate::error::MachineError;
use crate::register::{Register, REGISTER_COUNT, SP_INDEX};
use crate::table::{new_table, TABLE_DISPLAY_FORMAT};

/// Interrupt enable bit of the PSR.
pub const PSR_INT_EN: u32 = 0x1;
/// Interrupt pending bit of the PSR.
pub const PSR_INT_PEND: u32 = 0x2;

/// Word-addressed memory. Addresses computed by the program wrap around modulo the memory size;
/// there is no memory protection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  words: [Word; MEMORY_WORDS]
}

impl Memory {
  pub fn new() -> Memory {
    Memory{ words: [0; MEMORY_WORDS] }
  }

  /// Maps a computed address onto memory.
  pub fn wrap(address: i32) -> usize {
    address.rem_euclid(MEMORY_WORDS as i32) as usize
  }

  pub fn read(&self, address: i32) -> Word {
    self.words[Memory::wrap(address)]
  }

  pub fn write(&mut self, address: i32, word: Word) {
    self.words[Memory::wrap(address)] = word;
  }

  /// Reads an address that is already known to be in range, such as a fetch address.
  pub fn get(&self, address: usize) -> Option<Word> {
    self.words.get(address).cloned()
  }

  pub fn words(&self) -> &[Word] {
    &self.words
  }
}

impl Default for Memory {
  fn default() -> Memory {
    Memory::new()
  }
}

/// The register file and control registers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cpu {
  /// Program counter, the address of the next fetch.
  pub pc        : u32,
  /// Instruction register, the last fetched word.
  pub ir        : Word,
  /// Processor status register.
  pub psr       : u32,
  /// `R0`..`R63`, and `sp` at index 64.
  pub registers : [i32; REGISTER_COUNT],
  /// Incremented once per cycle. Drives the interrupt timer.
  pub counter   : u64
}

impl Cpu {
  pub fn new() -> Cpu {
    Cpu {
      pc        : 0,
      ir        : 0,
      psr       : PSR_INT_EN,
      registers : [0; REGISTER_COUNT],
      counter   : 0
    }
  }

  pub fn sp(&self) -> i32 {
    self.registers[SP_INDEX as usize]
  }

  pub fn set_sp(&mut self, value: i32) {
    self.registers[SP_INDEX as usize] = value;
  }

  pub fn interrupts_enabled(&self) -> bool {
    self.psr & PSR_INT_EN != 0
  }

  pub fn interrupt_pending(&self) -> bool {
    self.psr & PSR_INT_PEND != 0
  }
}

impl Default for Cpu {
  fn default() -> Cpu {
    Cpu::new()
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Machine {
  pub cpu    : Cpu,
  pub memory : Memory
}

impl Machine {

  // region Loading

  pub fn new() -> Machine {
    Machine {
      cpu    : Cpu::new(),
      memory : Memory::new()
    }
  }

  /// Copies a binary image into memory starting at address 0. Memory past the image is zero.
  pub fn load(image: &[u8]) -> Result<Machine, MachineError> {
    if image.len() > MEMORY_WORDS * WORD_BYTES {
      return Err(MachineError::ImageTooLarge{ bytes: image.len() });
    }
    let words =
      match bytes_to_words(image) {
        Some(words) => words,
        None        => return Err(MachineError::MisalignedImage{ bytes: image.len() })
      };

    let mut machine = Machine::new();
    machine.memory.words[..words.len()].copy_from_slice(&words);
    Ok(machine)
  }

  /// Sets the address of the first fetch. It must be inside memory.
  pub fn start_at(&mut self, start: i64) -> Result<(), MachineError> {
    if start < 0 || start >= MEMORY_WORDS as i64 {
      return Err(MachineError::StartAddressOutOfRange{ pc: start });
    }
    self.cpu.pc = start as u32;
    Ok(())
  }

  /// Loads an image and sets the start address, ready for the first cycle.
  pub fn boot(image: &[u8], start: i64) -> Result<Machine, MachineError> {
    let mut machine = Machine::load(image)?;
    machine.start_at(start)?;
    Ok(machine)
  }

  // endregion

  pub fn register(&self, register: Register) -> i32 {
    self.cpu.registers[register.idx()]
  }

  pub fn set_register(&mut self, register: Register, value: i32) {
    self.cpu.registers[register.idx()] = value;
  }

  // region Display methods

  fn make_register_table(&self) -> Table {
    let cpu       = &self.cpu;
    let mut table = new_table(row![ubr->"Register", ubl->"Contents"]);

    table.add_row(row![r->"PC =",  cpu.pc]);
    table.add_row(row![r->"IR =",  format!("0x{:08x}", cpu.ir)]);
    table.add_row(row![r->"PSR =", format!("0x{:x}", cpu.psr)]);
    table.add_row(row![r->"SP =",  cpu.sp()]);
    // R0-R3 are the registers programs use. Others are shown only when they are in use.
    for (i, value) in cpu.registers[..SP_INDEX as usize].iter().enumerate() {
      if i < 4 || *value != 0 {
        table.add_row(row![r->format!("R[{}] =", i), value]);
      }
    }
    table.add_row(row![r->"counter =", cpu.counter]);
    table
  }

  fn make_memory_table(&self) -> Table {
    let mut table = new_table(row![ubr->"Address", ubl->"Contents", ubl->"Decoded"]);

    for (i, word) in self.memory.words.iter().enumerate() {
      let decoded = match try_decode_instruction(*word) {
        Some(instruction) => instruction.to_string(),
        None              => "".to_string()
      };

      match i == self.cpu.pc as usize {

        true  => {
          table.add_row(
            row![r->format!("* --> M[{}] =", i), format!("0x{:08x}", word), decoded]
          );
        }

        false => {
          table.add_row(
            row![r->format!("M[{}] =", i), format!("0x{:08x}", word), decoded]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion
}

impl Default for Machine {
  fn default() -> Machine {
    Machine::new()
  }
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = self.make_register_table();
    let m_table = self.make_memory_table();

    let mut combined_table = table!([r_table, m_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Memory"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let interrupts = match self.cpu.interrupts_enabled() {
      true  => "Interrupts enabled.",
      false => "Interrupts disabled."
    };

    write!(f, "{}\n{}", interrupts, combined_table)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn power_on_state() {
    let machine = Machine::load(&[]).unwrap();
    assert_eq!(machine.cpu.psr, PSR_INT_EN);
    assert_eq!(machine.cpu.pc, 0);
    assert_eq!(machine.cpu.counter, 0);
    assert_eq!(machine.cpu.sp(), 0);
    assert!(machine.cpu.registers.iter().all(|r| *r == 0));
    assert!(machine.memory.words().iter().all(|w| *w == 0));
  }

  #[test]
  fn images_load_little_endian_at_address_zero() {
    let machine = Machine::load(&[0x48, 0x00, 0x00, 0x04, 0x01, 0x02, 0x03, 0x04]).unwrap();
    assert_eq!(machine.memory.get(0), Some(0x04_00_00_48));
    assert_eq!(machine.memory.get(1), Some(0x04_03_02_01));
    assert_eq!(machine.memory.get(2), Some(0));
  }

  #[test]
  fn full_image_fits() {
    let image = vec![0xAB; MEMORY_WORDS * WORD_BYTES];
    let machine = Machine::load(&image).unwrap();
    assert_eq!(machine.memory.get(MEMORY_WORDS - 1), Some(0xABAB_ABAB));
    assert_eq!(machine.memory.get(MEMORY_WORDS), None);
  }

  #[test]
  fn oversized_images_are_rejected() {
    let image = vec![0; MEMORY_WORDS * WORD_BYTES + 4];
    match Machine::load(&image) {
      Err(MachineError::ImageTooLarge{ bytes }) => assert_eq!(bytes, 516),
      other                                     => panic!("unexpected {:?}", other)
    }
  }

  #[test]
  fn misaligned_images_are_rejected() {
    match Machine::load(&[1, 2, 3]) {
      Err(MachineError::MisalignedImage{ bytes }) => assert_eq!(bytes, 3),
      other                                       => panic!("unexpected {:?}", other)
    }
  }

  #[test]
  fn start_address_must_be_in_memory() {
    assert!(Machine::boot(&[], 0).is_ok());
    assert_eq!(Machine::boot(&[], 127).unwrap().cpu.pc, 127);
    match Machine::boot(&[], 128) {
      Err(MachineError::StartAddressOutOfRange{ pc }) => assert_eq!(pc, 128),
      other                                           => panic!("unexpected {:?}", other)
    }
    assert!(Machine::boot(&[], -1).is_err());
  }

  #[test]
  fn addresses_wrap() {
    let mut memory = Memory::new();
    memory.write(-1, 7);
    assert_eq!(memory.get(127), Some(7));
    assert_eq!(memory.read(255), 7);
    memory.write(130, 9);
    assert_eq!(memory.get(2), Some(9));
  }

  #[test]
  fn display_highlights_the_pc() {
    let mut machine = Machine::load(&[0x48, 0x00, 0x00, 0x04]).unwrap();
    machine.cpu.pc = 0;
    let text = machine.to_string();
    assert!(text.contains("* --> M[0]"));
    assert!(text.contains("movei R0, 72"));
    assert!(text.contains("Interrupts enabled."));
  }
}

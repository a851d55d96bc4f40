/*!
  Functions to produce a binary image from assembly source code.

  The assembly pipeline is this:
  ```text
  text -> [`classify::build_symbols`] -> `SymbolTable` + `CodeLine`s ->⋯

  ⋯-> [`encode::encode_line`] -> `Word`s -> [`words_to_bytes`] -> image
  ```
  The first error stops the whole assembly. There is no partial output.
*/

mod classify;
mod encode;

use std::fmt::{Display, Formatter};

use crate::bytecode::{try_decode_instruction, words_to_bytes, Word, MEMORY_WORDS};
use crate::error::AssemblyError;
use crate::symboltable::SymbolTable;
use crate::table::new_table;

pub use classify::{build_symbols, classify_line, strip_comment, CodeLine, LineKind, MAX_LABEL_LENGTH};
pub use encode::{encode_line, relative_offset};

/// An `Assembly` is the result of executing `Assembly::assemble(source)`. It owns the code words,
/// the label table, and the code lines they came from.
#[derive(Clone, Debug)]
pub struct Assembly {
  pub code    : Vec<Word>,
  pub symbols : SymbolTable,
  pub lines   : Vec<CodeLine>,
}

impl Assembly {

  /// Assembles source text, one line per line of text.
  pub fn assemble(text: &str) -> Result<Assembly, AssemblyError> {
    Assembly::assemble_lines(text.lines())
  }

  pub fn assemble_lines<'a, I>(lines: I) -> Result<Assembly, AssemblyError>
    where I: IntoIterator<Item = &'a str>
  {
    let (symbols, lines) = build_symbols(lines)?;

    #[cfg(feature = "trace_computation")]
      eprintln!("Pass 1: {} labels, {} code lines.", symbols.len(), lines.len());

    // Lines are encoded in order, so an error in a line that fits is reported before the
    // first line that does not.
    let mut code = Vec::<Word>::with_capacity(lines.len().min(MEMORY_WORDS));
    for line in lines.iter() {
      if line.index >= MEMORY_WORDS {
        return Err(AssemblyError::ProgramTooLarge{ words: lines.len() });
      }
      code.push(encode_line(line, &symbols)?);
    }

    let assembly = Assembly{ code, symbols, lines };

    #[cfg(feature = "trace_computation")]
      eprintln!("Pass 2: assembled {} bytes.\n{}", assembly.code.len() * 4, assembly);

    Ok(assembly)
  }

  /// The binary image: every word in program order, little-endian.
  pub fn to_bytes(&self) -> Vec<u8> {
    words_to_bytes(&self.code)
  }

  pub fn len(&self) -> usize {
    self.code.len()
  }

  pub fn is_empty(&self) -> bool {
    self.code.is_empty()
  }
}

impl Display for Assembly {
  /// The label table followed by a listing of every word beside its source line.
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut label_table = new_table(row![ubl->"Label", ubr->"Address"]);
    for label in self.symbols.labels() {
      label_table.add_row(row![label.name, r->label.address]);
    }

    let mut code_table = new_table(row![ubr->"Index", ubl->"Word", ubl->"Decoded", ubl->"Source"]);
    for (line, word) in self.lines.iter().zip(self.code.iter()) {
      // `.word` data that happens to look like an instruction is shown as one anyway.
      // Relative operands also show the address they resolve to.
      let decoded = match try_decode_instruction(*word) {
        Some(instruction) if instruction.operation.is_relative() => {
          let target = line.index as i64 + 1 + instruction.imm as i64;
          format!("{} (-> {})", instruction, target)
        }
        Some(instruction) => instruction.to_string(),
        None              => "".to_string()
      };
      code_table.add_row(
        row![r->line.index, format!("0x{:08x}", word), decoded, strip_comment(&line.text)]
      );
    }

    write!(f, "{}\n{}", label_table, code_table)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn assembles_to_little_endian_bytes() {
    let assembly = Assembly::assemble("movei R0, 72\nput R0\nhalt\n").unwrap();
    assert_eq!(assembly.code, vec![0x04_00_00_48, 0x11_00_00_00, 0x00_00_00_00]);
    assert_eq!(
      assembly.to_bytes(),
      vec![0x48, 0x00, 0x00, 0x04,  0x00, 0x00, 0x00, 0x11,  0x00, 0x00, 0x00, 0x00]
    );
  }

  #[test]
  fn forward_references_resolve() {
    let source = "
      movei R0, 0
      jmp skip      ; over the next line
      movei R0, 99
    skip:
      halt
    ";
    let assembly = Assembly::assemble(source).unwrap();
    assert_eq!(assembly.symbols.get_address("skip"), Some(3));
    // jmp at index 1 to address 3
    assert_eq!(assembly.code[1], 0x0c_00_00_01);
  }

  #[test]
  fn errors_cite_the_emission_index() {
    let source = "
      ; a comment line
      start:
      nop
      nop
      bogus R1
      halt
    ";
    let error = Assembly::assemble(source).unwrap_err();
    assert_eq!(error.index(), Some(2));
    match error {
      AssemblyError::Syntax{ line, .. } => assert_eq!(line, 6),
      other                             => panic!("unexpected error {:?}", other)
    }
  }

  #[test]
  fn the_first_error_wins() {
    let error = Assembly::assemble("jmp nowhere\nbogus\n").unwrap_err();
    assert_eq!(error.index(), Some(0));
  }

  #[test]
  fn programs_must_fit_in_memory() {
    let fits = "nop\n".repeat(MEMORY_WORDS);
    assert_eq!(Assembly::assemble(&fits).unwrap().len(), MEMORY_WORDS);

    let too_big = "nop\n".repeat(MEMORY_WORDS + 1);
    assert_eq!(
      Assembly::assemble(&too_big).unwrap_err(),
      AssemblyError::ProgramTooLarge{ words: MEMORY_WORDS + 1 }
    );
  }

  #[test]
  fn errors_in_lines_that_fit_come_before_the_size_limit() {
    let source = format!("bogus\n{}", "nop\n".repeat(200));
    let error = Assembly::assemble(&source).unwrap_err();
    assert_eq!(error.index(), Some(0));

    let error = Assembly::assemble(&"nop\n".repeat(201)).unwrap_err();
    assert_eq!(error.index(), Some(MEMORY_WORDS));
  }

  #[test]
  fn empty_source_is_an_empty_image() {
    let assembly = Assembly::assemble("; nothing here\n\n").unwrap();
    assert!(assembly.is_empty());
    assert!(assembly.to_bytes().is_empty());
  }

  #[test]
  fn listing() {
    let assembly = Assembly::assemble("top:\n  jmp top ; forever\n").unwrap();
    let listing = assembly.to_string();
    assert!(listing.contains("top"));
    assert!(listing.contains("0x0c0000ff"));
    assert!(listing.contains("jmp -1 (-> 0)"));
  }
}

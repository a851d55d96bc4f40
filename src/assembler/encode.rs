/*!
  The second pass of the assembler: each code line becomes exactly one word. Label operands are
  resolved against the symbol table built by the first pass and stored as offsets relative to the
  line's own address.
*/

use std::str::FromStr;

use nom::combinator::all_consuming;

use crate::bytecode::assembly::{parse_operands, word_directive};
use crate::bytecode::{encode_instruction, Instruction, Operation, Word};
use crate::error::{AssemblyError, SyntaxErrorKind};
use crate::symboltable::{Address, SymbolTable};
use super::classify::{strip_comment, CodeLine};

/**
  The immediate for a reference from `index` to `target`. Adding `1 + offset` to `index` gives
  back `target`. Offsets that do not fit in a byte wrap silently.
*/
pub fn relative_offset(target: Address, index: Address) -> i8 {
  (target as i64 - index as i64 - 1) as i8
}

pub fn encode_line(code_line: &CodeLine, symbols: &SymbolTable) -> Result<Word, AssemblyError> {
  let syntax_error = |kind: SyntaxErrorKind| {
    AssemblyError::Syntax{ index: code_line.index, line: code_line.line, kind }
  };
  let text = code_line.text.as_str();

  if text.starts_with('.') {
    return match all_consuming(word_directive)(text) {
      Ok((_, word)) => Ok(word),
      Err(_)        => Err(syntax_error(SyntaxErrorKind::MalformedDirective))
    };
  }

  let code = strip_comment(text);
  let (mnemonic, rest) =
    match code.find(char::is_whitespace) {
      Some(i) => code.split_at(i),
      None    => (code, "")
    };

  let operation =
    match Operation::from_str(mnemonic) {
      Ok(operation) => operation,
      Err(_)        => {
        return Err(syntax_error(SyntaxErrorKind::UnknownMnemonic(mnemonic.to_string())));
      }
    };

  // Operands are not whitespace sensitive.
  let operand_text: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
  let operands =
    match parse_operands(operation.operands(), &operand_text) {
      Some(operands) => operands,
      None           => {
        return Err(syntax_error(SyntaxErrorKind::MalformedOperands{
          operation,
          operands: operand_text.clone()
        }));
      }
    };

  let imm =
    match operands.label {
      Some(label) => {
        match symbols.get_address(label) {
          Some(target) => relative_offset(target, code_line.index),
          None         => {
            return Err(syntax_error(SyntaxErrorKind::UnresolvedLabel(label.to_string())));
          }
        }
      }
      None => operands.imm
    };

  Ok(encode_instruction(Instruction::new(operation, operands.sreg, operands.treg, imm)))
}

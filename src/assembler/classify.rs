/*!
  The first pass of the assembler. Each source line is classified as blank, a label definition,
  or a code line. Labels are entered into the symbol table with the address of the next code line,
  and code lines are kept, in order, for the second pass.
*/

use crate::bytecode::assembly::is_label_char;
use crate::error::AssemblyError;
use crate::symboltable::{Address, SymbolTable};

pub const MAX_LABEL_LENGTH: usize = 30;

/// A retained code or data line, numbered by its position in the output.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CodeLine {
  /// The emission index, which is also the line's address in memory.
  pub index : Address,
  /// The 1-based line number in the source text, for diagnostics.
  pub line  : usize,
  /// The line from its first non-whitespace character; the comment is still attached.
  pub text  : String
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineKind<'a> {
  /// Empty, whitespace, or a comment.
  Blank,
  /// The text before the `:`, not yet validated.
  Label(&'a str),
  /// The line from its first non-whitespace character.
  Code(&'a str)
}

/// Strips a `;` comment and trailing whitespace.
pub fn strip_comment(text: &str) -> &str {
  let code = match text.find(';') {
    Some(i) => &text[..i],
    None    => text
  };
  code.trim_end()
}

pub fn classify_line(raw: &str) -> LineKind<'_> {
  let text = raw.trim_start();

  if text.is_empty() || text.starts_with(';') {
    return LineKind::Blank;
  }
  // Directives are data, never labels.
  if text.starts_with('.') {
    return LineKind::Code(text);
  }

  let code = strip_comment(text);
  match code.strip_suffix(':') {
    Some(name) => LineKind::Label(name),
    None       => LineKind::Code(text)
  }
}

fn validate_label(name: &str, line: usize) -> Result<(), AssemblyError> {
  if name.len() > MAX_LABEL_LENGTH {
    return Err(AssemblyError::LabelTooLong{ line, label: name.to_string() });
  }
  if name.is_empty() || !name.chars().all(is_label_char) {
    return Err(AssemblyError::InvalidLabel{ line, label: name.to_string() });
  }
  Ok(())
}

/**
  Builds the symbol table and the list of code lines. A label's address is the number of code
  lines seen before it, so a label at the end of the source refers to one past the last word.
*/
pub fn build_symbols<'a, I>(lines: I) -> Result<(SymbolTable, Vec<CodeLine>), AssemblyError>
  where I: IntoIterator<Item = &'a str>
{
  let mut symbols = SymbolTable::new();
  let mut code    = Vec::<CodeLine>::new();

  for (i, raw) in lines.into_iter().enumerate() {
    let line = i + 1;
    match classify_line(raw) {

      LineKind::Blank => {}

      LineKind::Label(name) => {
        validate_label(name, line)?;
        if symbols.insert(name, code.len()).is_err() {
          return Err(AssemblyError::DuplicateLabel{ line, label: name.to_string() });
        }
      }

      LineKind::Code(text) => {
        code.push(CodeLine{ index: code.len(), line, text: text.to_string() });
      }

    }
  }

  Ok((symbols, code))
}

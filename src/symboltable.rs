use std::collections::HashMap;

use string_cache::DefaultAtom;

/// An address in code memory, i.e. an emission index.
pub type Address = usize;

/// A label definition. Names are interned, so clones are cheap.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Label {
  pub name    : DefaultAtom,
  pub address : Address
}

/**
  A symbol table maps label names to their address in code memory. Several labels may share an
  address, so unlike a bimap only the names are required to be unique. Definition order is kept
  for listings.
*/
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SymbolTable {
  table  : HashMap<DefaultAtom, Address>,
  labels : Vec<Label>
}

impl SymbolTable {

  pub fn new() -> SymbolTable {
    SymbolTable {
      table  : HashMap::new(),
      labels : Vec::new()
    }
  }

  pub fn get_address(&self, name: &str) -> Option<Address> {
    self.table.get(&DefaultAtom::from(name)).cloned()
  }

  /// Inserts a new label, returning the existing address if the name is already defined.
  pub fn insert(&mut self, name: &str, address: Address) -> Result<(), Address> {
    let name = DefaultAtom::from(name);
    if let Some(existing) = self.table.get(&name) {
      return Err(*existing);
    }
    self.table.insert(name.clone(), address);
    self.labels.push(Label{ name, address });
    Ok(())
  }

  /// Labels in definition order.
  pub fn labels(&self) -> &[Label] {
    &self.labels
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }
}

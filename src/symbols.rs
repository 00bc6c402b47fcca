//! Symbol lookup for bare identifiers in expressions.

use std::collections::HashMap;
use std::collections::hash_map;
use std::error::Error;
use std::fmt;

/// Trait for symbol tables that resolve names to addresses or values.
pub trait SymbolTable {
    fn resolve(&self, name: &str) -> Option<u32>;
}

/// A symbol table backed by a `HashMap`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolMap {
    symbols: HashMap<String, u32>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the output of `nm`.
    ///
    /// Each line has the form `<hex address> <type> <name>`. Undefined symbols
    /// (listed without an address) and blank lines are skipped.
    pub fn parse_nm(listing: &str) -> Result<Self, SymbolParseError> {
        let mut map = Self::new();
        map.extend_from_nm(listing)?;
        Ok(map)
    }

    /// Adds all symbols from an `nm` listing, replacing existing ones.
    ///
    /// Returns the number of symbols read. On error, symbols from the lines
    /// before the offending one have already been added.
    pub fn extend_from_nm(&mut self, listing: &str) -> Result<usize, SymbolParseError> {
        let mut count = 0;
        for (index, line) in listing.lines().enumerate() {
            let line_no = index + 1;
            let fields: Vec<_> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => {}
                [kind, _name] if kind.len() == 1 => {}
                [addr, kind, name] if kind.len() == 1 => {
                    let value = u64::from_str_radix(addr, 16)
                        .ok()
                        .filter(|value| *value <= u64::from(u32::max_value()))
                        .ok_or_else(|| SymbolParseError::BadAddress {
                            line: line_no,
                            text: addr.to_string(),
                        })?;
                    self.insert(*name, value as u32);
                    count += 1;
                }
                _ => return Err(SymbolParseError::Malformed { line: line_no }),
            }
        }

        debug!("read {} symbols from nm listing", count);
        Ok(count)
    }

    /// Adds or replaces a symbol, returning its previous value.
    pub fn insert<S: Into<String>>(&mut self, name: S, value: u32) -> Option<u32> {
        self.symbols.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<String, u32> {
        self.symbols.iter()
    }
}

impl SymbolTable for SymbolMap {
    fn resolve(&self, name: &str) -> Option<u32> {
        self.symbols.get(name).cloned()
    }
}

/// Error returned when an `nm` listing cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolParseError {
    /// The line doesn't have the `<address> <type> <name>` shape.
    Malformed { line: usize },
    /// The address is not a hexadecimal 32-bit value.
    BadAddress { line: usize, text: String },
}

impl fmt::Display for SymbolParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolParseError::Malformed { line } => {
                write!(f, "line {}: expected `<address> <type> <name>`", line)
            }
            SymbolParseError::BadAddress { line, text } => {
                write!(f, "line {}: invalid symbol address '{}'", line, text)
            }
        }
    }
}

impl Error for SymbolParseError {}

//! Symbol streams held in memory.
use super::{SymbolReader, SymbolWriter};
use crate::error::Result;
use crate::Symbol;

/// An owned symbol stream together with its algorithm name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolBuffer {
    algorithm: Option<String>,
    symbols: Vec<Symbol>,
}

/// A borrowed symbol stream, optionally tagged with an algorithm name.
#[derive(Clone, Debug)]
pub struct SymbolSlice<'a> {
    algorithm: Option<&'a str>,
    rest: &'a [Symbol],
}

impl SymbolBuffer {
    pub fn new() -> Self {
        SymbolBuffer::default()
    }

    /// The declared algorithm, if one was set.
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }

    /// Read the stream back from the start.
    pub fn reader(&self) -> SymbolSlice<'_> {
        SymbolSlice {
            algorithm: self.algorithm.as_deref(),
            rest: &self.symbols,
        }
    }
}

impl SymbolWriter for SymbolBuffer {
    fn set_algorithm(&mut self, name: &str) -> Result<()> {
        self.algorithm = Some(name.to_owned());
        Ok(())
    }

    fn write_symbol(&mut self, symbol: Symbol) -> Result<()> {
        self.symbols.push(symbol);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A plain vector collects symbols and ignores the algorithm name.
impl SymbolWriter for Vec<Symbol> {
    fn set_algorithm(&mut self, _: &str) -> Result<()> {
        Ok(())
    }

    fn write_symbol(&mut self, symbol: Symbol) -> Result<()> {
        self.push(symbol);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<'a> SymbolSlice<'a> {
    /// A stream without an algorithm name; any algorithm will accept it.
    pub fn untagged(symbols: &'a [Symbol]) -> Self {
        SymbolSlice {
            algorithm: None,
            rest: symbols,
        }
    }

    /// A stream declaring `algorithm`.
    pub fn tagged(algorithm: &'a str, symbols: &'a [Symbol]) -> Self {
        SymbolSlice {
            algorithm: Some(algorithm),
            rest: symbols,
        }
    }
}

impl SymbolReader for SymbolSlice<'_> {
    fn algorithm(&self) -> Option<&str> {
        self.algorithm
    }

    fn read_symbol(&mut self) -> Result<Option<Symbol>> {
        Ok(match self.rest.split_first() {
            Some((&symbol, rest)) => {
                self.rest = rest;
                Some(symbol)
            }
            None => None,
        })
    }
}

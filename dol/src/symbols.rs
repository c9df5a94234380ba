//! Interface to symbol-map loaders.
//!
//! Parsing symbol maps is left to the host; this crate only hands it the addresses it needs
//! to relocate the map onto the loaded image.

use crate::{config::LoaderConfig, header::DolHeader};
use gekko_core::VirtAddr;
use thiserror::Error;

/// Addresses a symbol loader needs from the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolContext {
    /// Address of the first text section.
    pub base_text_address: VirtAddr,
    pub address_size_bits: u32,
    pub bss_address: VirtAddr,
}

impl SymbolContext {
    #[must_use]
    pub const fn new(header: &DolHeader, config: &LoaderConfig) -> Self {
        Self {
            base_text_address: VirtAddr::new(header.text_addresses[0]),
            address_size_bits: config.address_size_bits(),
            bss_address: header.bss_address(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("malformed symbol map at line {line}")]
    Malformed { line: usize },
}

/// Applies a symbol map to a loaded program.
pub trait SymbolLoader {
    /// Apply the symbols in `map`, returning how many were applied.
    ///
    /// # Errors
    ///
    /// Returns a `SymbolError` if the map cannot be applied.
    fn load_symbols(&mut self, ctx: &SymbolContext, map: &[u8]) -> Result<usize, SymbolError>;
}

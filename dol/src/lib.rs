//! GameCube/Wii DOL executable loader
//!
//! Decodes the fixed DOL header and turns it into the list of memory regions making up the
//! program image: text and data sections backed by file bytes, plus the zero-initialized
//! `.bss` and `.sbss` blocks whose extents are derived from neighbouring data sections.
//!
//! # Usage
//!
//! ```rust
//! use dol::{AddressSpace, DolLoader, LoaderConfig};
//!
//! # let mut input = vec![0u8; 0x120];
//! # input[0x00..0x04].copy_from_slice(&0x100u32.to_be_bytes());
//! # input[0x48..0x4C].copy_from_slice(&0x8000_3100u32.to_be_bytes());
//! # input[0x90..0x94].copy_from_slice(&0x20u32.to_be_bytes());
//! # input[0xE0..0xE4].copy_from_slice(&0x8000_3100u32.to_be_bytes());
//! let config = LoaderConfig::default();
//! let mut space = AddressSpace::new(config.image_base());
//!
//! match DolLoader::new(config).load(&input, &mut space) {
//!     Ok(loaded) => {
//!         assert!(loaded.is_complete());
//!         assert!(space.block_named(".text").is_some());
//!     }
//!     Err(e) => panic!("{e}"),
//! }
//! ```

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]
#![no_std]

extern crate alloc;

pub mod config;
mod error;
pub mod header;
pub mod image;
pub mod layout;
mod loader;
pub mod mapper;
pub mod source;
pub mod symbols;

pub use config::LoaderConfig;
pub use error::{FormatError, LoadError, RegionError};
pub use header::{DolHeader, Section, SectionKind};
pub use image::AddressSpace;
pub use layout::{BssLayout, DolLayout, MemoryRegionRequest, RegionKind};
pub use loader::{DolLoader, LoadedDol, RegionFailure};
pub use mapper::{MappedRegion, RegionFlags, RegionMapper};
pub use source::ByteSource;
pub use symbols::{SymbolContext, SymbolError, SymbolLoader};

/// Result type for DOL loading operations
pub type Result<T> = core::result::Result<T, LoadError>;

//! Error types for DOL decoding and loading.
use thiserror::Error;

/// Errors raised while decoding the fixed-size DOL header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The input is shorter than the header.
    #[error("DOL header truncated: expected {expected:#x} bytes, got {actual:#x}")]
    Truncated { expected: usize, actual: usize },
    /// Reserved for stricter field validation; the decoder does not produce it yet.
    #[error("invalid DOL header field `{0}`")]
    InvalidField(&'static str),
}

/// Fatal errors that abort a whole layout build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("invalid header: {0}")]
    InvalidHeader(#[from] FormatError),
    /// A section's file range runs past the end of the input.
    #[error("section {name} at offset {offset:#x} (+{size:#x}) exceeds the {source_len:#x}-byte input")]
    OutOfRange {
        name: &'static str,
        offset: u32,
        size: u32,
        source_len: u64,
    },
}

/// Errors reported by a [`RegionMapper`](crate::RegionMapper) for a single region.
///
/// None of these abort a load: the region is skipped and the next one is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("region overlaps existing block {existing}")]
    Conflict { existing: &'static str },
    #[error("region is empty")]
    Empty,
    #[error("region runs past the end of the 32-bit address space")]
    AddressOverflow,
    #[error("region rejected by the address space")]
    Rejected,
}

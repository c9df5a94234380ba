//! In-memory address space that DOL regions can be mapped into.

use crate::{
    error::RegionError,
    mapper::{MappedRegion, RegionFlags, RegionMapper},
};
use alloc::{borrow::Cow, vec, vec::Vec};
use gekko_core::{
    VirtAddr,
    mem::ranges::{MemoryRange, MemoryRanges},
};

/// Upper bound on blocks: every text and data slot plus the derived bss blocks, with headroom.
pub const MAX_BLOCKS: usize = 32;

/// A named block of the address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    name: &'static str,
    range: MemoryRange,
    flags: RegionFlags,
    /// File bytes; `None` for zero-filled blocks, which are never materialized.
    data: Option<Vec<u8>>,
}

impl Block {
    #[must_use]
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    #[inline]
    pub const fn range(&self) -> MemoryRange {
        self.range
    }

    #[must_use]
    #[inline]
    pub const fn flags(&self) -> RegionFlags {
        self.flags
    }

    #[must_use]
    #[inline]
    /// Whether the block was filled from file bytes rather than zeroed.
    pub const fn is_initialized(&self) -> bool {
        self.data.is_some()
    }

    #[must_use]
    #[inline]
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

/// A flat 32-bit address space made of non-overlapping blocks.
///
/// Blocks are kept in creation order. A block overlapping an existing one is refused
/// with `RegionError::Conflict`.
#[derive(Debug, Clone, Default)]
pub struct AddressSpace {
    image_base: VirtAddr,
    blocks: Vec<Block>,
}

impl AddressSpace {
    #[must_use]
    pub const fn new(image_base: VirtAddr) -> Self {
        Self {
            image_base,
            blocks: Vec::new(),
        }
    }

    #[must_use]
    #[inline]
    pub const fn image_base(&self) -> VirtAddr {
        self.image_base
    }

    #[must_use]
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[must_use]
    pub fn block_named(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.name == name)
    }

    #[must_use]
    pub fn block_containing(&self, addr: VirtAddr) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|block| block.range.contains_addr(addr))
    }

    #[must_use]
    /// Reads `len` bytes at `addr`. The bytes must lie within a single block.
    ///
    /// Zero-filled blocks yield an owned buffer of `len` zeros.
    pub fn read(&self, addr: VirtAddr, len: u32) -> Option<Cow<'_, [u8]>> {
        let block = self.block_containing(addr)?;
        let start = addr.checked_offset_from(block.range.start())?;
        let end = start.checked_add(len)?;
        if u64::from(end) > block.range.size() {
            return None;
        }

        match &block.data {
            Some(data) => data
                .get(usize::try_from(start).ok()?..usize::try_from(end).ok()?)
                .map(Cow::Borrowed),
            None => Some(Cow::Owned(vec![0; usize::try_from(len).ok()?])),
        }
    }

    #[must_use]
    /// Reads a big-endian word at `addr`.
    pub fn read_u32(&self, addr: VirtAddr) -> Option<u32> {
        let bytes = self.read(addr, 4)?.as_ref().try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    #[must_use]
    /// Merged address ranges covered by all blocks.
    pub fn covered(&self) -> MemoryRanges<MAX_BLOCKS> {
        let mut ranges = MemoryRanges::new();
        for block in &self.blocks {
            ranges.insert(block.range);
        }
        ranges
    }

    fn insert(
        &mut self,
        name: &'static str,
        virt_addr: VirtAddr,
        size: u32,
        flags: RegionFlags,
        data: Option<&[u8]>,
    ) -> Result<MappedRegion, RegionError> {
        if size == 0 {
            return Err(RegionError::Empty);
        }
        let range =
            MemoryRange::from_start_size(virt_addr, size).ok_or(RegionError::AddressOverflow)?;

        if let Some(existing) = self
            .blocks
            .iter()
            .find(|block| block.range.overlaps(&range).is_some())
        {
            return Err(RegionError::Conflict {
                existing: existing.name,
            });
        }
        if self.blocks.len() >= MAX_BLOCKS {
            return Err(RegionError::Rejected);
        }

        self.blocks.push(Block {
            name,
            range,
            flags,
            data: data.map(<[u8]>::to_vec),
        });

        Ok(MappedRegion {
            name,
            virt_addr,
            size,
        })
    }
}

impl RegionMapper for AddressSpace {
    fn create_initialized_region(
        &mut self,
        name: &'static str,
        virt_addr: VirtAddr,
        data: &[u8],
        flags: RegionFlags,
    ) -> Result<MappedRegion, RegionError> {
        let size = u32::try_from(data.len()).map_err(|_| RegionError::AddressOverflow)?;
        self.insert(name, virt_addr, size, flags, Some(data))
    }

    fn create_uninitialized_region(
        &mut self,
        name: &'static str,
        virt_addr: VirtAddr,
        size: u32,
        flags: RegionFlags,
    ) -> Result<MappedRegion, RegionError> {
        self.insert(name, virt_addr, size, flags, None)
    }
}

//! Memory mapping abstractions for DOL loading.
use crate::{
    error::RegionError,
    layout::{MemoryRegionRequest, RegionKind},
};
pub use gekko_core::VirtAddr;

/// Access rights of a mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionFlags(u8);

impl RegionFlags {
    const READ: u8 = 0b001;
    const WRITE: u8 = 0b010;
    const EXECUTE: u8 = 0b100;

    #[must_use]
    #[inline]
    /// Create read-write executable flags
    pub const fn rwx() -> Self {
        Self(Self::READ | Self::WRITE | Self::EXECUTE)
    }
    #[must_use]
    #[inline]
    /// Create read-write data flags
    pub const fn rw() -> Self {
        Self(Self::READ | Self::WRITE)
    }

    #[must_use]
    #[inline]
    pub const fn is_readable(&self) -> bool {
        (self.0 & Self::READ) != 0
    }
    #[must_use]
    #[inline]
    pub const fn is_writable(&self) -> bool {
        (self.0 & Self::WRITE) != 0
    }
    #[must_use]
    #[inline]
    pub const fn is_executable(&self) -> bool {
        (self.0 & Self::EXECUTE) != 0
    }
}

impl core::fmt::Display for RegionFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let bit = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            bit(self.is_readable(), 'r'),
            bit(self.is_writable(), 'w'),
            bit(self.is_executable(), 'x')
        )
    }
}

/// Information about a region created by a [`RegionMapper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedRegion {
    pub name: &'static str,
    /// Virtual address of the region
    pub virt_addr: VirtAddr,
    /// Size of the region in bytes
    pub size: u32,
}

/// Sink that instantiates the regions of a DOL image in some address space.
///
/// Failures are reported per region and never abort a load.
pub trait RegionMapper {
    /// Create a region backed by `data`, placed at `virt_addr`.
    ///
    /// # Errors
    ///
    /// Returns a `RegionError` if the region cannot be created.
    fn create_initialized_region(
        &mut self,
        name: &'static str,
        virt_addr: VirtAddr,
        data: &[u8],
        flags: RegionFlags,
    ) -> Result<MappedRegion, RegionError>;

    /// Create a zero-filled region of `size` bytes at `virt_addr`.
    ///
    /// # Errors
    ///
    /// Returns a `RegionError` if the region cannot be created.
    fn create_uninitialized_region(
        &mut self,
        name: &'static str,
        virt_addr: VirtAddr,
        size: u32,
        flags: RegionFlags,
    ) -> Result<MappedRegion, RegionError>;

    /// Dispatch a layout request to the matching creation method.
    ///
    /// # Errors
    ///
    /// Forwards the error of the underlying creation method.
    fn map_request(&mut self, request: &MemoryRegionRequest) -> Result<MappedRegion, RegionError> {
        match request.kind {
            RegionKind::Initialized(data) => self.create_initialized_region(
                request.name,
                request.virt_addr,
                data,
                request.flags,
            ),
            RegionKind::Uninitialized => self.create_uninitialized_region(
                request.name,
                request.virt_addr,
                request.size,
                request.flags,
            ),
        }
    }
}

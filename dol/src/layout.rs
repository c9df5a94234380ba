//! Projection of a decoded header onto the list of regions to create.

use crate::{
    Result,
    config::LoaderConfig,
    error::LoadError,
    header::{DATA_SECTION_COUNT, DolHeader, TEXT_SECTION_COUNT},
    mapper::RegionFlags,
    source::ByteSource,
};
use alloc::vec::Vec;
use gekko_core::VirtAddr;

/// Data slot whose address marks the end of the primary `.bss` block.
const BSS_BOUNDARY_SLOT: usize = 6;
/// Data slot whose address marks the end of `.sbss`.
const SBSS_BOUNDARY_SLOT: usize = 7;

/// Backing of a requested region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind<'a> {
    /// Filled from the file.
    Initialized(&'a [u8]),
    /// Zero-filled.
    Uninitialized,
}

/// A region the host should create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegionRequest<'a> {
    pub name: &'static str,
    pub virt_addr: VirtAddr,
    pub size: u32,
    pub kind: RegionKind<'a>,
    pub flags: RegionFlags,
}

/// A zero-initialized block derived from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroRegion {
    pub name: &'static str,
    pub start: VirtAddr,
    pub size: u32,
}

impl ZeroRegion {
    #[must_use]
    #[inline]
    const fn request<'a>(self) -> MemoryRegionRequest<'a> {
        MemoryRegionRequest {
            name: self.name,
            virt_addr: self.start,
            size: self.size,
            kind: RegionKind::Uninitialized,
            flags: RegionFlags::rw(),
        }
    }
}

/// Resolved extent of the zero-initialized area.
///
/// The header only declares where bss starts and how large it is in total. The area may be split
/// in two around the small data section in slot 6:
///
/// ```text
/// bss_address          data[6]            data[6] + size[6]         data[7]
///     | .bss ............ | .data6 (file) .... | .sbss .................. |
/// ```
///
/// `.sbss` is only present when `.bss` and `.data6` together fall short of the declared size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BssLayout {
    /// Distance from the bss address to data slot 6, if that slot lies above it.
    pub bss_span: Option<u32>,
    pub bss: Option<ZeroRegion>,
    pub sbss: Option<ZeroRegion>,
}

impl BssLayout {
    #[must_use]
    pub fn resolve(header: &DolHeader) -> Self {
        let boundary = header.data_addresses[BSS_BOUNDARY_SLOT];
        // Negative when bss starts above the boundary slot
        let span = i64::from(boundary) - i64::from(header.bss_address);
        let bss_span = u32::try_from(span).ok();

        let bss = match bss_span {
            Some(0) => {
                log::debug!("bss block is empty");
                None
            }
            Some(size) => Some(ZeroRegion {
                name: ".bss",
                start: header.bss_address(),
                size,
            }),
            None => {
                log::warn!(
                    "bss address {:#010x} lies above .data{BSS_BOUNDARY_SLOT} at {boundary:#010x}, no bss mapped",
                    header.bss_address
                );
                None
            }
        };

        let boundary_size = header.data_sizes[BSS_BOUNDARY_SLOT];
        let sbss = if span + i64::from(boundary_size) < i64::from(header.bss_size) {
            // .sdata2/.sbss2 are not accounted for by the declared bss size and stay unmapped
            log::debug!("bss is split around .data{BSS_BOUNDARY_SLOT}, .sdata2/.sbss2 not mapped");
            Self::resolve_sbss(header, boundary, boundary_size)
        } else {
            None
        };

        Self {
            bss_span,
            bss,
            sbss,
        }
    }

    fn resolve_sbss(header: &DolHeader, boundary: u32, boundary_size: u32) -> Option<ZeroRegion> {
        let Some(start) = boundary.checked_add(boundary_size) else {
            log::warn!(".data{BSS_BOUNDARY_SLOT} runs past the address space, no sbss mapped");
            return None;
        };
        let end = header.data_addresses[SBSS_BOUNDARY_SLOT];
        match end.checked_sub(start) {
            Some(size) if size > 0 => Some(ZeroRegion {
                name: ".sbss",
                start: VirtAddr::new(start),
                size,
            }),
            _ => {
                log::warn!(
                    "sbss would end at {end:#010x}, before its start at {start:#010x}, no sbss mapped"
                );
                None
            }
        }
    }

    /// Resolves the layout, dropping `.sbss` if `config` disables it.
    #[must_use]
    pub fn resolve_with(header: &DolHeader, config: &LoaderConfig) -> Self {
        let layout = Self::resolve(header);
        if config.load_sbss() {
            layout
        } else {
            layout.without_sbss()
        }
    }

    /// Drops the derived `.sbss` block, keeping `.bss`.
    #[must_use]
    pub const fn without_sbss(mut self) -> Self {
        self.sbss = None;
        self
    }

    /// Requests for the derived blocks, `.bss` first.
    pub fn requests<'a>(self) -> impl Iterator<Item = MemoryRegionRequest<'a>> {
        self.bss
            .into_iter()
            .chain(self.sbss)
            .map(ZeroRegion::request)
    }
}

/// Builds the ordered list of regions described by a DOL header.
pub struct DolLayout;

impl DolLayout {
    /// Compute every region to create for `header`, with payloads borrowed from `source`.
    ///
    /// Requests come in creation order: text sections, data sections, `.bss`, then `.sbss`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::OutOfRange` if a present section's payload is not entirely
    /// contained in `source`. No requests are returned in that case.
    pub fn build<'a, S: ByteSource + ?Sized>(
        header: &DolHeader,
        source: &'a S,
    ) -> Result<Vec<MemoryRegionRequest<'a>>> {
        Self::build_with(header, source, &LoaderConfig::default())
    }

    /// Same as [`DolLayout::build`], honouring the options of `config`.
    ///
    /// # Errors
    ///
    /// See [`DolLayout::build`].
    pub fn build_with<'a, S: ByteSource + ?Sized>(
        header: &DolHeader,
        source: &'a S,
        config: &LoaderConfig,
    ) -> Result<Vec<MemoryRegionRequest<'a>>> {
        let mut requests = Self::section_requests(header, source)?;
        requests.extend(BssLayout::resolve_with(header, config).requests());
        Ok(requests)
    }

    /// Requests for the present text and data sections only.
    pub(crate) fn section_requests<'a, S: ByteSource + ?Sized>(
        header: &DolHeader,
        source: &'a S,
    ) -> Result<Vec<MemoryRegionRequest<'a>>> {
        let mut requests = Vec::with_capacity(TEXT_SECTION_COUNT + DATA_SECTION_COUNT + 2);

        for section in header.sections() {
            let data = source.read(section.offset, section.size).ok_or(LoadError::OutOfRange {
                name: section.name,
                offset: section.offset,
                size: section.size,
                source_len: ByteSource::len(source),
            })?;

            log::debug!(
                "{} at {} (+{:#x}) from file offset {:#x}",
                section.name,
                section.address,
                section.size,
                section.offset
            );

            requests.push(MemoryRegionRequest {
                name: section.name,
                virt_addr: section.address,
                size: section.size,
                kind: RegionKind::Initialized(data),
                flags: section.kind.flags(),
            });
        }

        Ok(requests)
    }
}

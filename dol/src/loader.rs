//! DOL loader driving a [`RegionMapper`].

use crate::{
    Result,
    config::LoaderConfig,
    error::RegionError,
    header::DolHeader,
    layout::{BssLayout, DolLayout},
    mapper::RegionMapper,
    source::ByteSource,
    symbols::{SymbolContext, SymbolError, SymbolLoader},
};
use alloc::vec::Vec;
use gekko_core::VirtAddr;

/// A region the mapper refused to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionFailure {
    pub name: &'static str,
    pub virt_addr: VirtAddr,
    pub size: u32,
    pub error: RegionError,
}

/// Outcome of a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDol {
    pub header: DolHeader,
    pub image_base: VirtAddr,
    pub entry_point: VirtAddr,
    /// Derived zero-initialized blocks, after applying the configuration.
    pub bss: BssLayout,
    /// Number of regions the mapper created.
    pub mapped: usize,
    /// Regions the mapper refused, in request order.
    pub failures: Vec<RegionFailure>,
}

impl LoadedDol {
    #[must_use]
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// DOL loader with pluggable region mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct DolLoader {
    config: LoaderConfig,
}

impl DolLoader {
    #[must_use]
    pub const fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    #[inline]
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Decode `input` and map its regions with `mapper`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidHeader` if the header cannot be decoded and
    /// `LoadError::OutOfRange` if a section lies outside `input`. In both cases
    /// `mapper` is never called.
    pub fn load<M: RegionMapper + ?Sized>(
        &self,
        input: &[u8],
        mapper: &mut M,
    ) -> Result<LoadedDol> {
        let header = DolHeader::parse(input)?;
        self.load_header(&header, input, mapper)
    }

    /// Map the regions of an already decoded `header`, reading payloads from `source`.
    ///
    /// Regions the mapper refuses are logged and recorded in [`LoadedDol::failures`];
    /// the remaining regions are still attempted.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::OutOfRange` if a section lies outside `source`, before any
    /// region is created.
    pub fn load_header<S: ByteSource + ?Sized, M: RegionMapper + ?Sized>(
        &self,
        header: &DolHeader,
        source: &S,
        mapper: &mut M,
    ) -> Result<LoadedDol> {
        let mut requests = DolLayout::section_requests(header, source)?;
        let bss = BssLayout::resolve_with(header, &self.config);
        requests.extend(bss.requests());

        let mut mapped = 0;
        let mut failures = Vec::new();
        for request in &requests {
            match mapper.map_request(request) {
                Ok(region) => {
                    log::trace!(
                        "created {} at {} (+{:#x}, {})",
                        region.name,
                        region.virt_addr,
                        region.size,
                        request.flags
                    );
                    mapped += 1;
                }
                Err(error) => {
                    log::warn!("{} section creation failed: {error}", request.name);
                    failures.push(RegionFailure {
                        name: request.name,
                        virt_addr: request.virt_addr,
                        size: request.size,
                        error,
                    });
                }
            }
        }

        let entry_point = header.entry_point();
        if header.entry_section().is_none() {
            log::warn!("entry point {entry_point} is not inside a text section");
        }

        log::info!(
            "DOL mapped: {mapped}/{} regions, entry point {entry_point}",
            requests.len()
        );

        Ok(LoadedDol {
            header: *header,
            image_base: self.config.image_base(),
            entry_point,
            bss,
            mapped,
            failures,
        })
    }

    /// Hand a symbol map to `symbols` for the image described by `loaded`.
    ///
    /// # Errors
    ///
    /// Forwards the error of the symbol loader.
    pub fn load_symbols<L: SymbolLoader + ?Sized>(
        &self,
        loaded: &LoadedDol,
        symbols: &mut L,
        map: &[u8],
    ) -> core::result::Result<usize, SymbolError> {
        let ctx = SymbolContext::new(&loaded.header, &self.config);
        let count = symbols.load_symbols(&ctx, map)?;
        log::info!("applied {count} symbols");
        Ok(count)
    }
}

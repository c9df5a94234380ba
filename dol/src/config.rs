//! Loader configuration.
use gekko_core::VirtAddr;

/// Base of cached main memory, where DOL images are linked.
pub const DEFAULT_IMAGE_BASE: VirtAddr = VirtAddr::new(0x8000_0000);

/// Width of Gekko/Broadway effective addresses.
const ADDRESS_SIZE_BITS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    image_base: VirtAddr,
    /// Whether the small bss block following `.data6` is derived.
    load_sbss: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderConfig {
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            image_base: DEFAULT_IMAGE_BASE,
            load_sbss: true,
        }
    }

    #[must_use]
    #[inline]
    pub const fn with_image_base(mut self, image_base: VirtAddr) -> Self {
        self.image_base = image_base;
        self
    }

    #[must_use]
    #[inline]
    pub const fn with_sbss(mut self, load_sbss: bool) -> Self {
        self.load_sbss = load_sbss;
        self
    }

    #[must_use]
    #[inline]
    pub const fn image_base(&self) -> VirtAddr {
        self.image_base
    }

    #[must_use]
    #[inline]
    pub const fn load_sbss(&self) -> bool {
        self.load_sbss
    }

    #[must_use]
    #[inline]
    pub const fn address_size_bits(&self) -> u32 {
        ADDRESS_SIZE_BITS
    }
}

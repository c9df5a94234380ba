//! Abstraction of Gekko/Broadway effective addresses.
use core::fmt;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
/// A 32-bit virtual (effective) address.
pub struct VirtAddr(u32);

impl VirtAddr {
    #[must_use]
    #[inline]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    #[must_use]
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[must_use]
    #[inline]
    /// Returns the distance from `rhs` up to `self`, if `rhs <= self`.
    pub const fn checked_offset_from(self, rhs: Self) -> Option<u32> {
        self.0.checked_sub(rhs.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::format;

    #[test]
    fn test_v() {
        let addr = VirtAddr::new(0x8000_3100);
        assert_eq!(addr.as_u32(), 0x8000_3100);
        assert!(addr > VirtAddr::new(0x8000_3000));
    }

    #[test]
    fn test_v_offset() {
        let addr = VirtAddr::new(0x8000_4000);
        assert_eq!(
            addr.checked_offset_from(VirtAddr::new(0x8000_3F00)),
            Some(0x100)
        );
        assert_eq!(VirtAddr::new(0x8000_3F00).checked_offset_from(addr), None);
    }

    #[test]
    fn test_v_display() {
        let addr = VirtAddr::new(0x8000_3000);
        assert_eq!(format!("{addr}"), "0x80003000");
        assert_eq!(format!("{}", VirtAddr::new(0x10)), "0x00000010");
    }
}

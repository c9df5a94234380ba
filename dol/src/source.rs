//! Read access to the bytes of a DOL file.
use alloc::vec::Vec;

/// A random-access, read-only view of a DOL file.
pub trait ByteSource {
    /// Total number of bytes available.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `size` bytes starting at `offset`, or `None` if they run past the end.
    fn read(&self, offset: u32, size: u32) -> Option<&[u8]>;
}

impl ByteSource for [u8] {
    #[inline]
    fn len(&self) -> u64 {
        u64::try_from(<[u8]>::len(self)).unwrap_or(u64::MAX)
    }

    #[inline]
    fn read(&self, offset: u32, size: u32) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(usize::try_from(size).ok()?)?;
        self.get(start..end)
    }
}

impl ByteSource for Vec<u8> {
    #[inline]
    fn len(&self) -> u64 {
        ByteSource::len(self.as_slice())
    }

    #[inline]
    fn read(&self, offset: u32, size: u32) -> Option<&[u8]> {
        self.as_slice().read(offset, size)
    }
}

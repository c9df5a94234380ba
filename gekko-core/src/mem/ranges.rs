use crate::addrs::VirtAddr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Represents a range of 32-bit addresses.
///
/// It is guaranteed that the range is valid, i.e. start <= end.
pub struct MemoryRange {
    /// The start address of the range.
    start: u32,
    /// The end (inclusive) address of the range.
    end: u32,
}

impl MemoryRange {
    #[must_use]
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "Invalid range");
        Self { start, end }
    }

    #[must_use]
    #[inline]
    /// Builds the range `[start, start + size)`.
    ///
    /// Returns `None` for empty ranges and for ranges running past the end of the address space.
    pub const fn from_start_size(start: VirtAddr, size: u32) -> Option<Self> {
        if size == 0 {
            return None;
        }
        match start.as_u32().checked_add(size - 1) {
            Some(end) => Some(Self {
                start: start.as_u32(),
                end,
            }),
            None => None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn overlaps(&self, other: &Self) -> Option<Self> {
        if self.start > other.end || self.end < other.start {
            None
        } else {
            Some(Self {
                start: if self.start > other.start {
                    self.start
                } else {
                    other.start
                },
                end: if self.end < other.end {
                    self.end
                } else {
                    other.end
                },
            })
        }
    }

    #[must_use]
    #[inline]
    pub const fn contains_addr(&self, addr: VirtAddr) -> bool {
        self.start <= addr.as_u32() && addr.as_u32() <= self.end
    }

    #[must_use]
    #[inline]
    pub const fn start(&self) -> VirtAddr {
        VirtAddr::new(self.start)
    }

    #[must_use]
    #[inline]
    pub const fn end(&self) -> VirtAddr {
        VirtAddr::new(self.end)
    }

    #[must_use]
    #[inline]
    /// Size in bytes. A range spanning the whole address space is `1 << 32` bytes.
    pub const fn size(&self) -> u64 {
        (self.end - self.start) as u64 + 1
    }
}

#[derive(Debug, Clone, Copy)]
/// An array-backed `Vec` (thus statically sized) of disjoint `MemoryRange`s.
pub struct MemoryRanges<const N: usize> {
    /// Array of ranges
    ranges: [MemoryRange; N],
    /// Number of ranges that are currently in use
    used: usize,
}

impl<const N: usize> Default for MemoryRanges<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryRanges<N> {
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            ranges: [MemoryRange { start: 0, end: 0 }; N],
            used: 0,
        }
    }

    #[must_use]
    #[inline]
    pub fn entries(&self) -> &[MemoryRange] {
        &self.ranges[..self.used]
    }

    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.used
    }

    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.used == 0
    }

    fn delete(&mut self, index: usize) {
        debug_assert!(index < self.used, "Index out of bounds");

        if index < self.used {
            // Note that self.used is not 0
            self.used -= 1;
            self.ranges.swap(index, self.used);
        }
    }

    fn create(&mut self, range: MemoryRange) {
        debug_assert!(self.used < N, "MemoryRanges is full");

        if self.used < N {
            self.ranges[self.used] = range;
            self.used += 1;
        }
    }

    /// Inserts a range, merging it with every overlapping or adjacent range.
    pub fn insert(&mut self, mut range: MemoryRange) {
        let mut i = 0;
        while i < self.used {
            let current = self.ranges[i];

            if range.start <= current.end.saturating_add(1)
                && current.start <= range.end.saturating_add(1)
            {
                range.start = range.start.min(current.start);
                range.end = range.end.max(current.end);

                self.delete(i);
                // Don't increment i to check the swapped element
            } else {
                i += 1;
            }
        }

        self.create(range);
    }

    #[must_use]
    #[inline]
    pub fn sum(&self) -> u64 {
        self.entries().iter().map(MemoryRange::size).sum::<u64>()
    }
}

//! DOL header decoding.
//!
//! The header is a fixed 0x100-byte block of big-endian `u32` tables at the start of the file:
//!
//! | Offset | Field |
//! |---|---|
//! | 0x00 | 7 text section file offsets |
//! | 0x1C | 11 data section file offsets |
//! | 0x48 | 7 text section virtual addresses |
//! | 0x64 | 11 data section virtual addresses |
//! | 0x90 | 7 text section sizes |
//! | 0xAC | 11 data section sizes |
//! | 0xD8 | bss virtual address |
//! | 0xDC | bss size |
//! | 0xE0 | entry point |
//! | 0xE4 | padding up to 0x100 |

use crate::{error::FormatError, mapper::RegionFlags};
use gekko_core::{VirtAddr, mem::ranges::MemoryRange, static_assert};

pub const TEXT_SECTION_COUNT: usize = 7;
pub const DATA_SECTION_COUNT: usize = 11;

/// Size of the fixed header preceding the section payloads.
pub const HEADER_SIZE: usize = 0x100;

const TEXT_OFFSETS_OFF: usize = 0x00;
const DATA_OFFSETS_OFF: usize = 0x1C;
const TEXT_ADDRESSES_OFF: usize = 0x48;
const DATA_ADDRESSES_OFF: usize = 0x64;
const TEXT_SIZES_OFF: usize = 0x90;
const DATA_SIZES_OFF: usize = 0xAC;
const BSS_ADDRESS_OFF: usize = 0xD8;
const BSS_SIZE_OFF: usize = 0xDC;
const ENTRY_POINT_OFF: usize = 0xE0;

static_assert!(DATA_OFFSETS_OFF == TEXT_OFFSETS_OFF + TEXT_SECTION_COUNT * 4);
static_assert!(TEXT_ADDRESSES_OFF == DATA_OFFSETS_OFF + DATA_SECTION_COUNT * 4);
static_assert!(BSS_ADDRESS_OFF == DATA_SIZES_OFF + DATA_SECTION_COUNT * 4);
static_assert!(ENTRY_POINT_OFF + 4 <= HEADER_SIZE);

pub const TEXT_NAMES: [&str; TEXT_SECTION_COUNT] = [
    ".text", ".text1", ".text2", ".text3", ".text4", ".text5", ".text6",
];

pub const DATA_NAMES: [&str; DATA_SECTION_COUNT] = [
    ".data", ".data1", ".data2", ".data3", ".data4", ".data5", ".data6", ".data7", ".data8",
    ".data9", ".data10",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Decoded DOL header.
///
/// A slot whose size is 0 is absent; its offset and address carry no meaning.
pub struct DolHeader {
    pub text_offsets: [u32; TEXT_SECTION_COUNT],
    pub text_addresses: [u32; TEXT_SECTION_COUNT],
    pub text_sizes: [u32; TEXT_SECTION_COUNT],
    pub data_offsets: [u32; DATA_SECTION_COUNT],
    pub data_addresses: [u32; DATA_SECTION_COUNT],
    pub data_sizes: [u32; DATA_SECTION_COUNT],
    /// Declared start of the zero-initialized area.
    pub bss_address: u32,
    /// Declared total size of the zero-initialized area.
    ///
    /// This may cover more than the primary `.bss` block (see [`BssLayout`](crate::BssLayout)).
    pub bss_size: u32,
    pub entry_point: u32,
}

impl DolHeader {
    /// Decode the header at the start of `input`.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Truncated` if `input` is shorter than [`HEADER_SIZE`].
    pub fn parse(input: &[u8]) -> Result<Self, FormatError> {
        let header = input.get(..HEADER_SIZE).ok_or(FormatError::Truncated {
            expected: HEADER_SIZE,
            actual: input.len(),
        })?;

        Ok(Self {
            text_offsets: read_table(header, TEXT_OFFSETS_OFF)?,
            text_addresses: read_table(header, TEXT_ADDRESSES_OFF)?,
            text_sizes: read_table(header, TEXT_SIZES_OFF)?,
            data_offsets: read_table(header, DATA_OFFSETS_OFF)?,
            data_addresses: read_table(header, DATA_ADDRESSES_OFF)?,
            data_sizes: read_table(header, DATA_SIZES_OFF)?,
            bss_address: read_u32(header, BSS_ADDRESS_OFF)?,
            bss_size: read_u32(header, BSS_SIZE_OFF)?,
            entry_point: read_u32(header, ENTRY_POINT_OFF)?,
        })
    }

    #[must_use]
    #[inline]
    pub const fn entry_point(&self) -> VirtAddr {
        VirtAddr::new(self.entry_point)
    }

    #[must_use]
    #[inline]
    pub const fn bss_address(&self) -> VirtAddr {
        VirtAddr::new(self.bss_address)
    }

    #[must_use]
    /// Returns text slot `slot` if it is present.
    pub fn text_section(&self, slot: usize) -> Option<Section> {
        let size = *self.text_sizes.get(slot)?;
        (size > 0).then(|| Section {
            kind: SectionKind::Text,
            slot,
            name: TEXT_NAMES[slot],
            offset: self.text_offsets[slot],
            address: VirtAddr::new(self.text_addresses[slot]),
            size,
        })
    }

    #[must_use]
    /// Returns data slot `slot` if it is present.
    pub fn data_section(&self, slot: usize) -> Option<Section> {
        let size = *self.data_sizes.get(slot)?;
        (size > 0).then(|| Section {
            kind: SectionKind::Data,
            slot,
            name: DATA_NAMES[slot],
            offset: self.data_offsets[slot],
            address: VirtAddr::new(self.data_addresses[slot]),
            size,
        })
    }

    /// Iterates over present sections, text slots first, then data slots.
    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        (0..TEXT_SECTION_COUNT)
            .filter_map(|slot| self.text_section(slot))
            .chain((0..DATA_SECTION_COUNT).filter_map(|slot| self.data_section(slot)))
    }

    #[must_use]
    pub fn section_containing(&self, addr: VirtAddr) -> Option<Section> {
        self.sections().find(|section| section.contains(addr))
    }

    #[must_use]
    /// Translates a virtual address into an offset in the DOL file.
    pub fn file_offset_of(&self, addr: VirtAddr) -> Option<u32> {
        let section = self.section_containing(addr)?;
        section
            .offset
            .checked_add(addr.checked_offset_from(section.address)?)
    }

    #[must_use]
    /// Returns the text section holding the entry point.
    pub fn entry_section(&self) -> Option<Section> {
        self.section_containing(self.entry_point())
            .filter(|section| section.kind == SectionKind::Text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Text,
    Data,
}

impl SectionKind {
    #[must_use]
    #[inline]
    /// Access rights given to sections of this kind.
    ///
    /// Text sections stay writable, as the loaders this layout is consumed by expect.
    pub const fn flags(self) -> RegionFlags {
        match self {
            Self::Text => RegionFlags::rwx(),
            Self::Data => RegionFlags::rw(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A present text or data section.
pub struct Section {
    pub kind: SectionKind,
    /// Index in the text or data table.
    pub slot: usize,
    pub name: &'static str,
    /// File offset of the payload.
    pub offset: u32,
    pub address: VirtAddr,
    pub size: u32,
}

impl Section {
    #[must_use]
    #[inline]
    /// Virtual address range covered by the section, `None` if it wraps the address space.
    pub const fn range(&self) -> Option<MemoryRange> {
        MemoryRange::from_start_size(self.address, self.size)
    }

    #[must_use]
    #[inline]
    pub fn contains(&self, addr: VirtAddr) -> bool {
        self.range().is_some_and(|range| range.contains_addr(addr))
    }
}

fn read_u32(input: &[u8], offset: usize) -> Result<u32, FormatError> {
    input
        .get(offset..offset + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or(FormatError::Truncated {
            expected: offset + 4,
            actual: input.len(),
        })
}

fn read_table<const N: usize>(input: &[u8], base: usize) -> Result<[u32; N], FormatError> {
    let mut table = [0; N];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = read_u32(input, base + i * 4)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes() -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut put = |offset: usize, value: u32| {
            bytes[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
        };
        put(TEXT_OFFSETS_OFF, 0x100);
        put(TEXT_ADDRESSES_OFF, 0x8000_3100);
        put(TEXT_SIZES_OFF, 0x200);
        put(DATA_OFFSETS_OFF + 4 * 6, 0x300);
        put(DATA_ADDRESSES_OFF + 4 * 6, 0x8000_4000);
        put(DATA_SIZES_OFF + 4 * 6, 0x40);
        put(DATA_ADDRESSES_OFF + 4 * 10, 0x8000_5000);
        put(BSS_ADDRESS_OFF, 0x8000_3F00);
        put(BSS_SIZE_OFF, 0x180);
        put(ENTRY_POINT_OFF, 0x8000_3140);
        bytes
    }

    #[test]
    fn test_parse_fields() {
        let header = DolHeader::parse(&header_bytes()).unwrap();

        assert_eq!(header.text_offsets[0], 0x100);
        assert_eq!(header.text_addresses[0], 0x8000_3100);
        assert_eq!(header.text_sizes[0], 0x200);
        assert_eq!(header.data_offsets[6], 0x300);
        assert_eq!(header.data_addresses[6], 0x8000_4000);
        assert_eq!(header.data_sizes[6], 0x40);
        assert_eq!(header.data_addresses[10], 0x8000_5000);
        assert_eq!(header.data_sizes[10], 0);
        assert_eq!(header.bss_address, 0x8000_3F00);
        assert_eq!(header.bss_size, 0x180);
        assert_eq!(header.entry_point(), VirtAddr::new(0x8000_3140));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let bytes = header_bytes();
        assert_eq!(DolHeader::parse(&bytes), DolHeader::parse(&bytes));
    }

    #[test]
    fn test_parse_truncated() {
        let bytes = header_bytes();
        assert_eq!(
            DolHeader::parse(&bytes[..0xFF]),
            Err(FormatError::Truncated {
                expected: HEADER_SIZE,
                actual: 0xFF
            })
        );
        assert!(DolHeader::parse(&[]).is_err());
    }

    #[test]
    fn test_parse_ignores_trailing_payload() {
        let mut bytes = header_bytes().to_vec();
        bytes.extend_from_slice(&[0xFF; 0x40]);
        assert_eq!(
            DolHeader::parse(&bytes).unwrap(),
            DolHeader::parse(&header_bytes()).unwrap()
        );
    }

    #[test]
    fn test_sections_skip_empty_slots() {
        let header = DolHeader::parse(&header_bytes()).unwrap();
        let mut sections = header.sections();

        let text = sections.next().unwrap();
        assert_eq!(text.kind, SectionKind::Text);
        assert_eq!(text.name, ".text");
        assert_eq!(text.address, VirtAddr::new(0x8000_3100));

        let data = sections.next().unwrap();
        assert_eq!(data.kind, SectionKind::Data);
        assert_eq!(data.slot, 6);
        assert_eq!(data.name, ".data6");

        assert!(sections.next().is_none());
        assert!(header.data_section(10).is_none());
        assert!(header.text_section(TEXT_SECTION_COUNT).is_none());
    }

    #[test]
    fn test_file_offset_translation() {
        let header = DolHeader::parse(&header_bytes()).unwrap();

        assert_eq!(header.file_offset_of(VirtAddr::new(0x8000_3100)), Some(0x100));
        assert_eq!(header.file_offset_of(VirtAddr::new(0x8000_32FF)), Some(0x2FF));
        assert_eq!(header.file_offset_of(VirtAddr::new(0x8000_4010)), Some(0x310));
        assert_eq!(header.file_offset_of(VirtAddr::new(0x8000_3300)), None);
    }

    #[test]
    fn test_entry_section() {
        let header = DolHeader::parse(&header_bytes()).unwrap();
        assert_eq!(header.entry_section().map(|s| s.name), Some(".text"));

        let mut bytes = header_bytes();
        bytes[ENTRY_POINT_OFF..ENTRY_POINT_OFF + 4].copy_from_slice(&0x8000_4000u32.to_be_bytes());
        let header = DolHeader::parse(&bytes).unwrap();
        assert!(header.entry_section().is_none());
    }

    #[test]
    fn test_section_flags() {
        assert!(SectionKind::Text.flags().is_executable());
        assert!(SectionKind::Text.flags().is_writable());
        assert!(!SectionKind::Data.flags().is_executable());
        assert!(SectionKind::Data.flags().is_writable());
    }
}

//! Guest memory as seen by the monitor.
//!
//! The emulated machine uses flat segmentation: `CS`, `DS`, `ES` and `SS` all
//! describe the same linear 4 GB address space, so a segment-relative address
//! is also the virtual address. `FS` and `GS` are free for custom use by the
//! guest OS and are not modeled.
//!
//! Two implementations are provided. `ArrayMemory` stores a contiguous block
//! starting at address 0 in a `Vec` and is mostly useful for tests. `MmapMemory`
//! reserves the whole 4 GB space as an anonymous mapping, so that memory images
//! can be placed at their real load address.

use memmap::MmapMut;

use std::{fmt, io, iter, ptr};
use std::ops::RangeInclusive;
use std::error::Error;
use std::borrow::Cow;

/// Size of the guest's address space in bytes.
const ADDRESS_SPACE: u64 = 1 << 32;

/// x86 segment registers.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Segment {
    Cs,
    Ds,
    Es,
    Fs,
    Gs,
    Ss,
}

impl Segment {
    /// Whether the segment maps the flat virtual address space.
    ///
    /// Only `FS` and `GS` may be set up differently by the OS.
    pub fn is_flat(&self) -> bool {
        match self {
            Segment::Fs | Segment::Gs => false,
            _ => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Segment::Cs => "cs",
            Segment::Ds => "ds",
            Segment::Es => "es",
            Segment::Fs => "fs",
            Segment::Gs => "gs",
            Segment::Ss => "ss",
        }
    }
}

pub trait VirtualMemory {
    /// Maps a block of data into the virtual address space.
    ///
    /// It is an error to call this when `virt_range` overlaps an already mapped
    /// piece of memory.
    ///
    /// If `data` is too small to fill the entire virtual range, it is padded
    /// with 0 bytes. If it is too large, the excess is ignored.
    ///
    /// # Parameters
    ///
    /// * `virt_range`: The virtual memory range where the data should be mapped.
    /// * `data`: The data to map into the virtual address space.
    /// * `name`: Debug name of the mapping, for example the name of the image
    ///   file it was loaded from.
    fn add_mapping(&mut self, virt_range: RangeInclusive<u32>, data: &[u8], name: &str) -> Result<(), MapError>;

    /// Returns an iterator over all currently installed memory mappings.
    fn mappings(&self) -> Mappings;

    /// Determines the mapping the given address is a part of.
    fn mapping_containing_addr(&self, virt_addr: u32) -> Option<Mapping> {
        self.mappings().find(|mapping| {
            *mapping.virt_range().start() <= virt_addr && *mapping.virt_range().end() >= virt_addr
        })
    }

    fn load(&self, virt_addr: u32) -> Result<u8, MemoryError>;

    fn load_i32(&self, virt_addr: u32) -> Result<i32, MemoryError> {
        let (b0, b1, b2, b3) = (
            self.load(virt_addr)? as u32,
            self.load(virt_addr.wrapping_add(1))? as u32,
            self.load(virt_addr.wrapping_add(2))? as u32,
            self.load(virt_addr.wrapping_add(3))? as u32,
        );

        Ok((
            b3 << 24 |
            b2 << 16 |
            b1 << 8 |
            b0
        ) as i32)
    }

    fn load_i16(&self, virt_addr: u32) -> Result<i16, MemoryError> {
        let (b0, b1) = (
            self.load(virt_addr)? as u16,
            self.load(virt_addr.wrapping_add(1))? as u16,
        );

        Ok((
            b1 << 8 |
            b0
        ) as i16)
    }

    /// Reads a little-endian value of `len` bytes (1, 2 or 4) at the
    /// segment-relative address `addr`, zero-extended to 32 bits.
    fn read(&self, addr: u32, len: usize, segment: Segment) -> Result<u32, MemoryError> {
        if !segment.is_flat() {
            return Err(MemoryError::Segment(segment));
        }

        match len {
            1 => Ok(self.load(addr)?.into()),
            2 => Ok(self.load_i16(addr)? as u16 as u32),
            4 => Ok(self.load_i32(addr)? as u32),
            _ => Err(MemoryError::Size(len)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mapping<'a> {
    virt_range: RangeInclusive<u32>,
    name: Cow<'a, str>,
}

impl<'a> Mapping<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn virt_range(&self) -> RangeInclusive<u32> {
        self.virt_range.clone()
    }

    fn overlaps(&self, range: &RangeInclusive<u32>) -> bool {
        self.virt_range.start() <= range.end() && range.start() <= self.virt_range.end()
    }
}

impl<'a> fmt::Display for Mapping<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (start, end) = (self.virt_range.start(), self.virt_range.end());
        write!(f, "{:08X}-{:08X} {}", start, end, self.name)
    }
}

/// Iterator over memory mappings.
#[allow(missing_debug_implementations)] // annoying to do here
pub struct Mappings<'a> {
    inner: Box<dyn Iterator<Item=Mapping<'a>> + 'a>,
}

impl<'a> Mappings<'a> {
    fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item=Mapping<'a>>,
        I::IntoIter: 'a
    {
        Self {
            inner: Box::new(iter.into_iter()),
        }
    }
}

impl<'a> Iterator for Mappings<'a> {
    type Item = Mapping<'a>;

    fn next(&mut self) -> Option<<Self as Iterator>::Item> {
        self.inner.next()
    }
}

/// Checks that `virt_range` is non-empty and does not overlap `existing`.
fn check_mapping(existing: &[Mapping], virt_range: &RangeInclusive<u32>) -> Result<(), MapError> {
    if virt_range.start() > virt_range.end() {
        return Err(MapError::Empty);
    }

    match existing.iter().find(|mapping| mapping.overlaps(virt_range)) {
        Some(mapping) => Err(MapError::Overlap(mapping.name().to_string())),
        None => Ok(()),
    }
}

/// Copies `data` into `dest`, zero-filling whatever `data` doesn't cover.
fn fill(dest: &mut [u8], data: &[u8]) {
    let n = data.len().min(dest.len());
    dest[..n].copy_from_slice(&data[..n]);
    for byte in &mut dest[n..] {
        *byte = 0;
    }
}

/// A static, contiguous virtual memory implementation that stores everything in
/// a `Vec`, starting at address 0.
///
/// This is mostly useful for tests and benchmarks.
#[derive(Debug)]
pub struct ArrayMemory {
    mem: Vec<u8>,
    mappings: Vec<Mapping<'static>>,
}

impl ArrayMemory {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            mem: data,
            mappings: Vec::new(),
        }
    }

    pub fn as_vec_mut(&mut self) -> &mut Vec<u8> {
        &mut self.mem
    }
}

impl VirtualMemory for ArrayMemory {
    /// Copies `data` into the backing `Vec`, growing it as needed.
    fn add_mapping(&mut self, virt_range: RangeInclusive<u32>, data: &[u8], name: &str) -> Result<(), MapError> {
        check_mapping(&self.mappings, &virt_range)?;

        let range = *virt_range.start() as usize ..= *virt_range.end() as usize;
        if self.mem.len() <= *range.end() {
            self.mem.resize(*range.end() + 1, 0);
        }
        fill(&mut self.mem[range], data);

        self.mappings.push(Mapping {
            virt_range,
            name: name.to_owned().into(),
        });

        Ok(())
    }

    fn mappings(&self) -> Mappings {
        Mappings::new(self.mappings.iter().cloned())
    }

    fn load(&self, virt_addr: u32) -> Result<u8, MemoryError> {
        self.mem.get(virt_addr as usize).cloned().ok_or(MemoryError::Fault(virt_addr))
    }
}

#[derive(Debug)]
pub struct MmapMemory {
    mapping: MmapMut,
    mappings: Vec<Mapping<'static>>,
}

impl MmapMemory {
    /// Reserves the guest's 4 GB address space.
    ///
    /// Pages are only committed once written to, but this still requires a
    /// 64-bit host.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            mapping: MmapMut::map_anon(ADDRESS_SPACE as usize)?,
            mappings: Vec::new(),
        })
    }

    fn ptr(&self, virt_addr: u32) -> *const u8 {
        unsafe {
            self.mapping.as_ptr().offset(virt_addr as usize as isize)
        }
    }

    /// Whether `len` bytes starting at `virt_addr` can be read without
    /// wrapping around the end of the address space.
    fn in_bounds(virt_addr: u32, len: u32) -> bool {
        u64::from(virt_addr) + u64::from(len) <= ADDRESS_SPACE
    }
}

impl VirtualMemory for MmapMemory {
    fn add_mapping(&mut self, virt_range: RangeInclusive<u32>, data: &[u8], name: &str) -> Result<(), MapError> {
        check_mapping(&self.mappings, &virt_range)?;

        let range = *virt_range.start() as usize ..= *virt_range.end() as usize;
        fill(&mut self.mapping[range], data);

        self.mappings.push(Mapping {
            virt_range,
            name: name.to_owned().into(),
        });

        Ok(())
    }

    fn mappings(&self) -> Mappings {
        Mappings::new(self.mappings.iter().cloned())
    }

    fn load(&self, virt_addr: u32) -> Result<u8, MemoryError> {
        // unchecked indexing possible since we map the whole 4G
        let val = unsafe { self.mapping.get_unchecked(virt_addr as usize) };
        Ok(*val)
    }

    fn load_i32(&self, virt_addr: u32) -> Result<i32, MemoryError> {
        if !Self::in_bounds(virt_addr, 4) {
            return Ok(i32::from_le_bytes([
                self.load(virt_addr)?,
                self.load(virt_addr.wrapping_add(1))?,
                self.load(virt_addr.wrapping_add(2))?,
                self.load(virt_addr.wrapping_add(3))?,
            ]));
        }

        unsafe {
            Ok(i32::from_le(ptr::read_unaligned(self.ptr(virt_addr) as *const i32)))
        }
    }

    fn load_i16(&self, virt_addr: u32) -> Result<i16, MemoryError> {
        if !Self::in_bounds(virt_addr, 2) {
            return Ok(i16::from_le_bytes([
                self.load(virt_addr)?,
                self.load(virt_addr.wrapping_add(1))?,
            ]));
        }

        unsafe {
            Ok(i16::from_le(ptr::read_unaligned(self.ptr(virt_addr) as *const i16)))
        }
    }
}

/// An error that can occur when reading memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Accessed address is not backed by any memory.
    Fault(u32),
    /// Accessed through a segment that doesn't map the flat address space.
    Segment(Segment),
    /// Unsupported access size in bytes.
    Size(usize),
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MemoryError::Fault(addr) => write!(f, "cannot access memory at address {:#010x}", addr),
            MemoryError::Segment(seg) => write!(f, "segment {} is not supported", seg.name()),
            MemoryError::Size(len) => write!(f, "invalid access size of {} bytes", len),
        }
    }
}

impl Error for MemoryError {}

/// Error returned by `add_mapping`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The mapping would overlap with an existing one (whose name is given).
    Overlap(String),

    /// The virtual range of the mapping is empty.
    Empty,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MapError::Overlap(name) => write!(f, "existing mapping '{}' overlaps", name),
            MapError::Empty => write!(f, "attempt to create an empty mapping"),
        }
    }
}

impl Error for MapError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_loads() {
        let mem = ArrayMemory::new(vec![0x78, 0x56, 0x34, 0x12, 0xFF]);
        assert_eq!(mem.load_i32(0).unwrap(), 0x1234_5678);
        assert_eq!(mem.load_i16(3).unwrap(), 0xFF12u16 as i16);
        assert_eq!(mem.read(0, 4, Segment::Ds).unwrap(), 0x1234_5678);
        assert_eq!(mem.read(1, 2, Segment::Ss).unwrap(), 0x3456);
        assert_eq!(mem.read(4, 1, Segment::Es).unwrap(), 0xFF);
    }

    #[test]
    fn read_errors() {
        let mem = ArrayMemory::new(vec![0; 4]);
        assert_eq!(mem.read(1, 4, Segment::Ds), Err(MemoryError::Fault(4)));
        assert_eq!(mem.read(0, 4, Segment::Fs), Err(MemoryError::Segment(Segment::Fs)));
        assert_eq!(mem.read(0, 3, Segment::Ds), Err(MemoryError::Size(3)));
    }

    #[test]
    fn array_mappings() {
        let mut mem = ArrayMemory::new(Vec::new());
        mem.add_mapping(0x10..=0x1F, &[1, 2, 3], "image").unwrap();
        assert_eq!(mem.load(0x10).unwrap(), 1);
        assert_eq!(mem.load(0x12).unwrap(), 3);
        assert_eq!(mem.load(0x13).unwrap(), 0);
        assert_eq!(mem.load(0x0F).unwrap(), 0);
        assert!(mem.load(0x20).is_err());

        assert_eq!(
            mem.add_mapping(0x18..=0x30, &[], "other"),
            Err(MapError::Overlap("image".to_string()))
        );
        assert_eq!(mem.add_mapping(0x30..=0x2F, &[], "empty"), Err(MapError::Empty));

        let mapping = mem.mapping_containing_addr(0x15).unwrap();
        assert_eq!(mapping.name(), "image");
        assert_eq!(mapping.to_string(), "00000010-0000001F image");
        assert!(mem.mapping_containing_addr(0x20).is_none());
    }

    #[test]
    fn mmap_memory() {
        // hosts with strict overcommit settings may refuse the reservation
        let mut mem = match MmapMemory::new() {
            Ok(mem) => mem,
            Err(_) => return,
        };
        mem.add_mapping(0x0040_0000..=0x0040_0FFF, &[0xEF, 0xBE, 0xAD, 0xDE], ".text").unwrap();
        assert_eq!(mem.read(0x0040_0000, 4, Segment::Ds).unwrap(), 0xDEAD_BEEF);
        assert_eq!(mem.read(0x0040_0002, 2, Segment::Ds).unwrap(), 0xDEAD);
        // unmapped memory reads as zero
        assert_eq!(mem.read(0x1000, 4, Segment::Ds).unwrap(), 0);
        // reads straddling the end of the address space wrap around
        assert_eq!(mem.read(0xFFFF_FFFE, 4, Segment::Ds).unwrap(), 0);
    }
}

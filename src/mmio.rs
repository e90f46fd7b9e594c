#![allow(unsafe_code)]

use core::ptr::{read_volatile, write_volatile};

use crate::bus::RegisterBus;

/// Volatile 32-bit access to a memory-mapped register window.
///
/// Every access is a single volatile load or store so the compiler never
/// merges, reorders or elides hardware accesses.
#[derive(Debug)]
pub struct Mmio32 {
    base: *mut u32,
    len: usize,
}

// SAFETY: the window is device memory, not Rust-owned data. Exclusion for
// read-modify-write sequences is provided by the device's critical sections.
unsafe impl Send for Mmio32 {}
unsafe impl Sync for Mmio32 {}

impl Mmio32 {
    /// Wraps an already-mapped register window.
    ///
    /// # Safety
    /// `base` must be 4-byte aligned and point to `len` bytes of mapped
    /// device memory that stays mapped for the lifetime of this value.
    pub const unsafe fn new(base: *mut u32, len: usize) -> Self {
        Self { base, len }
    }

    #[inline(always)]
    fn check(&self, offset: usize) {
        let inside = offset % 4 == 0 && offset.checked_add(4).is_some_and(|end| end <= self.len);
        assert!(inside, "offset {offset:#x} outside {} byte window", self.len);
    }
}

impl RegisterBus for Mmio32 {
    #[inline]
    fn len_bytes(&self) -> usize {
        self.len
    }

    #[inline(always)]
    fn read32(&self, offset: usize) -> u32 {
        self.check(offset);
        // SAFETY: offset checked above, window valid per `new`.
        unsafe { read_volatile(self.base.byte_add(offset)) }
    }

    #[inline(always)]
    fn write32(&self, offset: usize, value: u32) {
        self.check(offset);
        // SAFETY: offset checked above, window valid per `new`.
        unsafe { write_volatile(self.base.byte_add(offset), value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatile_access_hits_backing_memory() {
        let mut backing = [0u32; 4];
        let bus = unsafe { Mmio32::new(backing.as_mut_ptr(), 16) };

        bus.write32(8, 0xDEAD_BEEF);
        assert_eq!(bus.read32(8), 0xDEAD_BEEF);
        assert_eq!(bus.read32(0), 0);
        assert_eq!(bus.len_bytes(), 16);

        drop(bus);
        assert_eq!(backing[2], 0xDEAD_BEEF);
    }

    #[test]
    #[should_panic(expected = "offset 0x18 outside 16 byte window")]
    fn access_past_window_panics() {
        // Window covers the first four words; the rest stands in for
        // neighbouring memory.
        let mut backing = [0u32; 8];
        backing[6] = 0xDEAD_BEEF;
        let bus = unsafe { Mmio32::new(backing.as_mut_ptr(), 16) };

        bus.write32(24, 0x1111_1111);
    }

    #[test]
    #[should_panic(expected = "outside 16 byte region")]
    fn foreign_reg_cannot_reach_past_window() {
        use crate::{block::RegisterBlock, sim::SimulatedRegion};

        let mut backing = [0u32; 8];
        let large = RegisterBlock::new(SimulatedRegion::new(64));
        let reg = large.register(24).unwrap();
        let window = RegisterBlock::new(unsafe { Mmio32::new(backing.as_mut_ptr(), 16) });

        window.read(reg);
    }
}

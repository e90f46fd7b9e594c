//! In-memory register region.
//!
//! Stands in for mapped hardware on the host: tests, bring-up, and
//! simulators. Reads and writes are counted so callers can verify that a
//! region was (or was not) touched.

use alloc::{vec, vec::Vec};
use core::cell::{Cell, RefCell};

use critical_section::Mutex;

use crate::bus::RegisterBus;

/// A register file of `u32` words behind a critical section.
pub struct SimulatedRegion {
    words: Mutex<RefCell<Vec<u32>>>,
    reads: Mutex<Cell<usize>>,
    writes: Mutex<Cell<usize>>,
}

impl core::fmt::Debug for SimulatedRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulatedRegion")
            .field("len_bytes", &self.len_bytes())
            .finish_non_exhaustive()
    }
}

impl SimulatedRegion {
    /// Creates a zeroed region of `len_bytes` (rounded down to whole words).
    pub fn new(len_bytes: usize) -> Self {
        Self {
            words: Mutex::new(RefCell::new(vec![0; len_bytes / 4])),
            reads: Mutex::new(Cell::new(0)),
            writes: Mutex::new(Cell::new(0)),
        }
    }

    /// Sets a register as the hardware would, without counting a bus write.
    pub fn poke(&self, offset: usize, value: u32) {
        critical_section::with(|cs| {
            self.words.borrow(cs).borrow_mut()[offset / 4] = value;
        })
    }

    /// Inspects a register without counting a bus read.
    pub fn peek(&self, offset: usize) -> u32 {
        critical_section::with(|cs| self.words.borrow(cs).borrow()[offset / 4])
    }

    /// Number of `read32` calls issued so far.
    pub fn reads(&self) -> usize {
        critical_section::with(|cs| self.reads.borrow(cs).get())
    }

    /// Number of `write32` calls issued so far.
    pub fn writes(&self) -> usize {
        critical_section::with(|cs| self.writes.borrow(cs).get())
    }
}

impl RegisterBus for SimulatedRegion {
    fn len_bytes(&self) -> usize {
        critical_section::with(|cs| self.words.borrow(cs).borrow().len() * 4)
    }

    fn read32(&self, offset: usize) -> u32 {
        critical_section::with(|cs| {
            let reads = self.reads.borrow(cs);
            reads.set(reads.get() + 1);
            self.words.borrow(cs).borrow()[offset / 4]
        })
    }

    fn write32(&self, offset: usize, value: u32) {
        critical_section::with(|cs| {
            let writes = self.writes.borrow(cs);
            writes.set(writes.get() + 1);
            self.words.borrow(cs).borrow_mut()[offset / 4] = value;
        })
    }
}

use crate::bus::RegisterBus;

const WORD: usize = 4;

/// A validated register offset.
///
/// Only [`RegisterBlock::register`] creates these. A `Reg` carries no
/// reference to the block that validated it, so every access re-checks the
/// offset against the block it is used on and panics on a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(usize);

impl Reg {
    /// Byte offset from the region base.
    #[inline]
    pub fn offset(self) -> usize {
        self.0
    }
}

/// A validated run of consecutive registers at a fixed stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegArray {
    base: usize,
    stride: usize,
    count: usize,
}

impl RegArray {
    /// Number of registers in the run.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the run holds no registers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Register at position `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Reg> {
        (index < self.count).then(|| Reg(self.base + index * self.stride))
    }
}

/// Bounds-checked view over one mapped register region.
pub struct RegisterBlock<B> {
    bus: B,
    len: usize,
}

impl<B: RegisterBus> core::fmt::Debug for RegisterBlock<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterBlock")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<B: RegisterBus> RegisterBlock<B> {
    pub fn new(bus: B) -> Self {
        let len = bus.len_bytes();
        Self { bus, len }
    }

    /// Size of the region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Validates a single register offset.
    ///
    /// Returns `None` if `offset` is misaligned or the register does not fit
    /// entirely inside the region.
    pub fn register(&self, offset: usize) -> Option<Reg> {
        let end = offset.checked_add(WORD)?;
        (offset % WORD == 0 && end <= self.len).then_some(Reg(offset))
    }

    /// Validates `count` registers starting at `base`, `stride` bytes apart.
    pub fn array(&self, base: usize, stride: usize, count: usize) -> Option<RegArray> {
        if stride % WORD != 0 || stride == 0 {
            return None;
        }
        if count > 0 {
            let last = stride.checked_mul(count - 1)?.checked_add(base)?;
            self.register(base)?;
            self.register(last)?;
        }
        Some(RegArray {
            base,
            stride,
            count,
        })
    }

    /// # Panics
    /// Panics if `reg` does not lie inside this block.
    #[inline]
    pub fn read(&self, reg: Reg) -> u32 {
        self.bus.read32(self.checked(reg.0))
    }

    /// # Panics
    /// Panics if `reg` does not lie inside this block.
    #[inline]
    pub fn write(&self, reg: Reg, value: u32) {
        self.bus.write32(self.checked(reg.0), value)
    }

    /// Read-modify-write of one register. Returns the value written.
    ///
    /// Not atomic on its own; callers sharing the register with an
    /// interrupt path must run this inside a critical section.
    #[inline]
    pub fn modify(&self, reg: Reg, f: impl FnOnce(u32) -> u32) -> u32 {
        let value = f(self.read(reg));
        self.write(reg, value);
        value
    }

    /// Reads every register of `array` in order.
    ///
    /// # Panics
    /// Panics if the last register of `array` does not lie inside this
    /// block. Base alignment and stride were checked when `array` was built.
    pub fn read_each(&self, array: RegArray, mut f: impl FnMut(usize, u32)) {
        if array.count == 0 {
            return;
        }
        self.checked(array.base);
        self.checked(array.base + (array.count - 1) * array.stride);
        for index in 0..array.count {
            f(index, self.bus.read32(array.base + index * array.stride));
        }
    }

    #[inline]
    fn checked(&self, offset: usize) -> usize {
        let inside = offset % WORD == 0 && offset.checked_add(WORD).is_some_and(|end| end <= self.len);
        assert!(inside, "register {offset:#x} outside {} byte region", self.len);
        offset
    }
}

/// Width-exact 32-bit access to one mapped register region.
///
/// Offsets are byte offsets from the region base.
/// [`RegisterBlock`](crate::RegisterBlock) only issues 4-byte aligned offsets
/// below [`len_bytes`](Self::len_bytes), but the methods are safe to call
/// directly: an implementation must never touch memory outside its region,
/// whatever offset it is given. No caching: every call reaches the register.
pub trait RegisterBus {
    /// Size of the mapped region in bytes.
    fn len_bytes(&self) -> usize;
    /// Reads the 32-bit register at `offset`.
    fn read32(&self, offset: usize) -> u32;
    /// Writes the 32-bit register at `offset`.
    fn write32(&self, offset: usize, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    #[inline]
    fn len_bytes(&self) -> usize {
        (**self).len_bytes()
    }

    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

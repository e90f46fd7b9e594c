use crate::{
    DriverError,
    transfer::{CopyIn, CopyOut},
};

/// Byte-stream file operations a device exposes to its consumer.
///
/// `pos` is the caller's file cursor. It is signed because the framework's
/// offset type is; a negative cursor is rejected with
/// [`DriverError::InvalidOffset`].
pub trait ByteChannel {
    /// Stateless; always succeeds.
    fn open(&self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Copies up to `len` bytes of the current read result to `dst`.
    fn read<D: CopyOut + ?Sized>(
        &self,
        dst: &mut D,
        len: usize,
        pos: &mut i64,
    ) -> Result<usize, DriverError>;

    /// Consumes up to `len` bytes of write payload from `src`.
    fn write<S: CopyIn + ?Sized>(
        &self,
        src: &S,
        len: usize,
        pos: &mut i64,
    ) -> Result<usize, DriverError>;

    /// Stateless; always succeeds.
    fn close(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

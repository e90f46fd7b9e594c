//! The trust boundary between device buffers and caller buffers.
//!
//! A copy across the boundary may stop short (a faulting user page, a
//! truncated message). Both directions therefore report the number of bytes
//! NOT transferred, and the channel turns any shortfall into
//! [`DriverError::PartialTransferFailure`].

use crate::{
    DriverError,
    helpers::{advance, transfer_window},
};

/// Destination of a device-to-caller copy.
pub trait CopyOut {
    /// Copies `src` to the start of the caller's buffer.
    ///
    /// Returns the number of bytes of `src` that were not copied.
    fn copy_out(&mut self, src: &[u8]) -> usize;
}

/// Source of a caller-to-device copy.
pub trait CopyIn {
    /// Fills `dst` from the start of the caller's buffer.
    ///
    /// Returns the number of bytes of `dst` that were not filled.
    fn copy_in(&self, dst: &mut [u8]) -> usize;
}

impl CopyOut for [u8] {
    fn copy_out(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.len());
        self[..n].copy_from_slice(&src[..n]);
        src.len() - n
    }
}

impl CopyIn for [u8] {
    fn copy_in(&self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.len());
        dst[..n].copy_from_slice(&self[..n]);
        dst.len() - n
    }
}

impl<const N: usize> CopyOut for [u8; N] {
    fn copy_out(&mut self, src: &[u8]) -> usize {
        self.as_mut_slice().copy_out(src)
    }
}

impl<const N: usize> CopyIn for [u8; N] {
    fn copy_in(&self, dst: &mut [u8]) -> usize {
        self.as_slice().copy_in(dst)
    }
}

/// Delivers part of `device` (the logical channel) to the caller.
///
/// Returns the bytes transferred; `pos` advances by exactly that much, also
/// when the copy stops short.
pub fn transfer_out<D: CopyOut + ?Sized>(
    device: &[u8],
    dst: &mut D,
    requested: usize,
    pos: &mut i64,
) -> Result<usize, DriverError> {
    let window = transfer_window(*pos, requested, device.len())?;
    if window.is_empty() {
        return Ok(0);
    }

    let count = window.len();
    let not_transferred = dst.copy_out(&device[window]);
    finish(count, not_transferred, pos)
}

/// Fills part of `device` (the logical channel) from the caller.
///
/// Returns the window that was filled; `pos` advances by the bytes actually
/// transferred.
pub fn transfer_in<S: CopyIn + ?Sized>(
    device: &mut [u8],
    src: &S,
    requested: usize,
    pos: &mut i64,
) -> Result<core::ops::Range<usize>, DriverError> {
    let window = transfer_window(*pos, requested, device.len())?;
    if window.is_empty() {
        return Ok(window);
    }

    let not_transferred = src.copy_in(&mut device[window.clone()]);
    finish(window.len(), not_transferred, pos)?;
    Ok(window)
}

fn finish(count: usize, not_transferred: usize, pos: &mut i64) -> Result<usize, DriverError> {
    let transferred = count.saturating_sub(not_transferred);
    advance(pos, transferred);

    if not_transferred != 0 {
        log::warn!("short copy: {transferred} of {count} bytes");
        return Err(DriverError::PartialTransferFailure {
            transferred,
            not_transferred,
        });
    }

    log::trace!("copied {count} bytes, cursor now {}", *pos);
    Ok(transferred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ShortSink;

    const DEVICE: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

    #[test]
    fn transfer_out_clamps_and_advances() {
        let mut dst = [0u8; 16];
        let mut pos = 5;

        let n = transfer_out(&DEVICE, &mut dst, 16, &mut pos).unwrap();

        assert_eq!(n, 3);
        assert_eq!(pos, 8);
        assert_eq!(&dst[..3], &[6, 7, 8]);
    }

    #[test]
    fn transfer_out_at_end_is_empty() {
        let mut dst = [0u8; 4];
        let mut pos = 8;
        assert_eq!(transfer_out(&DEVICE, &mut dst, 4, &mut pos), Ok(0));
        assert_eq!(pos, 8);
    }

    #[test]
    fn transfer_out_rejects_offset_past_end() {
        let mut dst = [0u8; 4];
        let mut pos = 9;
        assert_eq!(
            transfer_out(&DEVICE, &mut dst, 4, &mut pos),
            Err(DriverError::InvalidOffset)
        );
        assert_eq!(pos, 9);
    }

    #[test]
    fn short_copy_is_a_hard_failure() {
        let mut dst = ShortSink::new(3);
        let mut pos = 0;

        let result = transfer_out(&DEVICE, &mut dst, 8, &mut pos);

        assert_eq!(
            result,
            Err(DriverError::PartialTransferFailure {
                transferred: 3,
                not_transferred: 5
            })
        );
        assert_eq!(pos, 3);
        assert_eq!(dst.received(), &[1, 2, 3]);
    }

    #[test]
    fn undersized_slice_counts_as_short_copy() {
        let mut dst = [0u8; 2];
        let mut pos = 0;
        assert!(matches!(
            transfer_out(&DEVICE, &mut dst[..], 4, &mut pos),
            Err(DriverError::PartialTransferFailure {
                transferred: 2,
                not_transferred: 2
            })
        ));
    }

    #[test]
    fn transfer_in_fills_window() {
        let mut device = [0u8; 6];
        let mut pos = 2;

        let window = transfer_in(&mut device, &[9u8, 9, 9, 9, 9, 9][..], 10, &mut pos).unwrap();

        assert_eq!(window, 2..6);
        assert_eq!(device, [0, 0, 9, 9, 9, 9]);
        assert_eq!(pos, 6);
    }

    #[test]
    fn transfer_in_short_source() {
        let mut device = [0u8; 6];
        let mut pos = 0;

        let result = transfer_in(&mut device, &[7u8, 7][..], 6, &mut pos);

        assert_eq!(
            result,
            Err(DriverError::PartialTransferFailure {
                transferred: 2,
                not_transferred: 4
            })
        );
        assert_eq!(pos, 2);
    }
}

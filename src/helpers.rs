//! Offset and length arithmetic for channel transfers.
//!
//! Exposed for framework glue that wants to pre-validate a request against
//! a known logical size before calling into the device.

use core::ops::Range;

use crate::DriverError;

/// Computes the byte window a transfer request covers.
///
/// `pos` is the caller's cursor (it may be negative, as a `loff_t` can be),
/// `requested` the caller's length, `logical` the channel size for this call.
/// The requested length is clamped so the window never runs past `logical`.
///
/// # Errors
/// * [`DriverError::InvalidOffset`] - if `pos < 0` or `pos > logical`
/// * [`DriverError::InvalidLength`] - if the clamped length exceeds `logical`
///
/// # Example
/// ```
/// use embedded_regdev::helpers::transfer_window;
///
/// // 18-byte streaming result, caller asks for 1000 bytes from the start
/// assert_eq!(transfer_window(0, 1000, 18), Ok(0..18));
///
/// // Cursor at the end: nothing left, but not an error
/// assert_eq!(transfer_window(18, 4, 18), Ok(18..18));
/// ```
pub fn transfer_window(pos: i64, requested: usize, logical: usize) -> Result<Range<usize>, DriverError> {
    let offset = usize::try_from(pos).map_err(|_| DriverError::InvalidOffset)?;
    if offset > logical {
        return Err(DriverError::InvalidOffset);
    }

    let count = requested.min(logical - offset);
    // Cannot fire after the clamp above.
    if count > logical {
        return Err(DriverError::InvalidLength);
    }

    Ok(offset..offset + count)
}

/// Advances `pos` by `by` bytes, saturating at `i64::MAX`.
pub fn advance(pos: &mut i64, by: usize) {
    let by = i64::try_from(by).unwrap_or(i64::MAX);
    *pos = pos.saturating_add(by);
}

#[test]
fn transfer_window_edge_cases() {
    // Negative offset
    assert_eq!(transfer_window(-1, 4, 18), Err(DriverError::InvalidOffset));

    // Offset past the end, regardless of length
    assert_eq!(transfer_window(19, 0, 18), Err(DriverError::InvalidOffset));
    assert_eq!(transfer_window(19, 100, 18), Err(DriverError::InvalidOffset));
    assert_eq!(transfer_window(i64::MAX, 1, 18), Err(DriverError::InvalidOffset));

    // Clamped overrun
    assert_eq!(transfer_window(10, 100, 18), Ok(10..18));

    // Exact fit
    assert_eq!(transfer_window(0, 18, 18), Ok(0..18));

    // Zero-length request
    assert_eq!(transfer_window(3, 0, 18), Ok(3..3));

    // Empty channel
    assert_eq!(transfer_window(0, 4, 0), Ok(0..0));
    assert_eq!(transfer_window(1, 4, 0), Err(DriverError::InvalidOffset));
}

#[test]
fn advance_saturates() {
    let mut pos = 4;
    advance(&mut pos, 14);
    assert_eq!(pos, 18);

    let mut pos = i64::MAX - 1;
    advance(&mut pos, 10);
    assert_eq!(pos, i64::MAX);
}

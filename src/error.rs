/// Errors surfaced by device attach and channel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// A register region or the interrupt line could not be obtained, or a
    /// mapped region is too small for the profile's layout.
    ResourceUnavailable,
    /// Working buffers could not be allocated.
    AllocationFailure,
    /// Transfer offset is negative or beyond the logical channel size.
    InvalidOffset,
    /// Clamped transfer length still exceeds the logical channel size.
    InvalidLength,
    /// The trust-boundary copy moved fewer bytes than requested.
    PartialTransferFailure {
        /// Bytes that did cross the boundary (the cursor advanced by this much).
        transferred: usize,
        /// Bytes that did not.
        not_transferred: usize,
    },
    /// An interrupt fired but no live consumer could be resolved.
    ConsumerUnresolvable,
}

const EIO: i32 = 5;
const ENOMEM: i32 = 12;
const EFAULT: i32 = 14;
const EINVAL: i32 = 22;
const ESRCH: i32 = 3;

impl DriverError {
    /// Negative errno value for framework glue that speaks the kernel's
    /// `ssize_t` convention.
    pub fn errno(&self) -> i32 {
        match self {
            DriverError::ResourceUnavailable => -EIO,
            DriverError::AllocationFailure => -ENOMEM,
            DriverError::InvalidOffset | DriverError::InvalidLength => -EINVAL,
            DriverError::PartialTransferFailure { .. } => -EFAULT,
            DriverError::ConsumerUnresolvable => -ESRCH,
        }
    }
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DriverError::ResourceUnavailable => write!(f, "register region or interrupt line unavailable"),
            DriverError::AllocationFailure => write!(f, "failed to allocate driver buffers"),
            DriverError::InvalidOffset => write!(f, "invalid transfer offset"),
            DriverError::InvalidLength => write!(f, "invalid transfer length"),
            DriverError::PartialTransferFailure {
                transferred,
                not_transferred,
            } => write!(
                f,
                "partial transfer: {transferred} bytes copied, {not_transferred} bytes not copied"
            ),
            DriverError::ConsumerUnresolvable => write!(f, "no live consumer registered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_mapping() {
        assert_eq!(DriverError::InvalidOffset.errno(), -22);
        assert_eq!(DriverError::InvalidLength.errno(), -22);
        assert_eq!(DriverError::ResourceUnavailable.errno(), -5);
        assert_eq!(DriverError::AllocationFailure.errno(), -12);
        assert_eq!(
            DriverError::PartialTransferFailure {
                transferred: 1,
                not_transferred: 3
            }
            .errno(),
            -14
        );
    }
}

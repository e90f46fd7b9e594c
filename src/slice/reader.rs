use super::macros::impl_field_get;

/// Read-only field accessor over raw payload bytes.
///
/// Getters return `None` instead of panicking: payloads come from the
/// caller and may be shorter than the full layout.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a>(&'a [u8]);

impl<'a> FieldReader<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    impl_field_get!(u16, 2);
    impl_field_get!(u32, 4);
}

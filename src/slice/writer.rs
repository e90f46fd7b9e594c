use super::macros::impl_field_put;

/// Write-only field accessor used to lay out read results.
#[derive(Debug)]
pub struct FieldWriter<'a>(&'a mut [u8]);

impl<'a> FieldWriter<'a> {
    #[inline]
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self(bytes)
    }

    impl_field_put!(u16, 2);
    impl_field_put!(u32, 4);
}

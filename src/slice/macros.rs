/// Generates a big-endian field getter for one unsigned width.
macro_rules! impl_field_get {
    ($type:ty, $size:literal) => {
        paste::paste! {
            #[doc = "Reads a big-endian `" $type "` field at `offset`."]
            #[doc = ""]
            #[doc = "Returns `None` if the field does not fit inside the payload."]
            #[inline]
            pub fn [<$type _be_at>](&self, offset: usize) -> Option<$type> {
                let bytes = self.0.get(offset..offset.checked_add($size)?)?;
                let mut raw = [0u8; $size];
                raw.copy_from_slice(bytes);
                Some(<$type>::from_be_bytes(raw))
            }
        }
    };
}

/// Generates a little-endian field setter for one unsigned width.
macro_rules! impl_field_put {
    ($type:ty, $size:literal) => {
        paste::paste! {
            #[doc = "Stores `value` as a little-endian `" $type "` at `offset`."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if the field does not fit inside the buffer."]
            #[inline]
            pub fn [<put_ $type _le_at>](&mut self, offset: usize, value: $type) {
                assert!(
                    offset + $size <= self.0.len(),
                    "field out of bounds: offset {} + size {} > len {}",
                    offset, $size, self.0.len()
                );
                self.0[offset..offset + $size].copy_from_slice(&value.to_le_bytes());
            }
        }
    };
}

pub(super) use impl_field_get;
pub(super) use impl_field_put;

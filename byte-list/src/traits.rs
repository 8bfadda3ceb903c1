// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::{mem, ptr, slice};

/// Designates a type as plain old data that can be stored in a list by copying its bytes.
///
/// A list node only ever sees the raw bytes of a payload.
/// The typed functions (e.g. [`ListArena::insert_value`]) use this trait to turn a value into
/// those bytes and back again.
///
/// # Safety
///
/// Implementors must guarantee that
/// * the type contains no padding bytes, so that every byte returned by `as_bytes` is initialized, and
/// * every bit pattern of `size_of::<Self>()` bytes is a valid value of the type.
///
/// The easiest way to implement this trait for a structure is to use `derive`, which checks both
/// conditions at compile time as far as possible:
///
/// ```ignore
/// #[derive(Clone, Copy, Payload)]
/// #[repr(C)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// ```
///
/// [`ListArena::insert_value`]: crate::list::ListArena::insert_value
pub unsafe trait Payload: Copy + 'static {
    /// Returns the bytes of this value as they will be stored in a list node.
    fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts((self as *const Self).cast::<u8>(), mem::size_of::<Self>()) }
    }

    /// Reconstructs a value from the bytes stored in a list node.
    ///
    /// Returns `None` if `bytes` does not have exactly the size of `Self`.
    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        (bytes.len() == mem::size_of::<Self>())
            .then(|| unsafe { ptr::read_unaligned(bytes.as_ptr().cast::<Self>()) })
    }
}
pub use byte_list_macros::Payload;

macro_rules! impl_payload {
    ($($ty:ty),*) => {
        $(unsafe impl Payload for $ty {})*
    };
}

impl_payload!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

unsafe impl<P: Payload, const N: usize> Payload for [P; N] {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Payload)]
    #[repr(C)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Payload)]
    #[repr(transparent)]
    struct Meters(f64);

    #[test]
    fn test_primitive_bytes() {
        assert_eq!(0x1234_5678u32.as_bytes(), &0x1234_5678u32.to_ne_bytes());
        assert_eq!(u32::from_bytes(&7u32.to_ne_bytes()), Some(7));
        assert_eq!(u32::from_bytes(&[1, 2, 3]), None);
    }

    #[test]
    fn test_derived_struct() {
        let point = Point { x: -3, y: 9 };
        assert_eq!(point.as_bytes().len(), 8);
        assert_eq!(Point::from_bytes(point.as_bytes()), Some(point));

        let meters = Meters(2.5);
        assert_eq!(meters.as_bytes(), &2.5f64.to_ne_bytes());
    }

    #[test]
    fn test_array() {
        let values = [1u16, 2, 3];
        assert_eq!(values.as_bytes().len(), 6);
        assert_eq!(<[u16; 3]>::from_bytes(values.as_bytes()), Some(values));
    }

    #[test]
    fn test_unaligned_read() {
        // Force the payload bytes to an odd address.
        let mut storage = [0u8; 9];
        storage[1..].copy_from_slice(&u64::MAX.to_ne_bytes());
        assert_eq!(u64::from_bytes(&storage[1..]), Some(u64::MAX));
    }
}

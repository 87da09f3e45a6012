use std::convert::{TryFrom, TryInto};
use std::fmt::Debug;

/// Convert `n` to `u32` using `TryFrom` or panic.
///
/// # Panics
/// Panics if the conversion returns an error.
pub fn cast_u32<T>(n: T) -> u32
where
    T: TryInto<u32>,
    <T as TryInto<u32>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in u32")
}

/// Convert `n` to `usize` using `TryFrom` or panic.
///
/// # Panics
/// Panics if the conversion returns an error.
pub fn cast_usize<T>(n: T) -> usize
where
    T: TryInto<usize>,
    <T as TryInto<usize>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in usize")
}

/// Convert a vertex id read from a file into the internal `u32` vertex id,
/// shifting it by the file's index origin.
///
/// Returns `None` if the id is smaller than the origin or doesn't fit in
/// `u32`.
pub fn shift_vertex_id(id: u64, origin_offset: u64) -> Option<u32> {
    id.checked_sub(origin_offset)
        .and_then(|shifted| u32::try_from(shifted).ok())
}

//! Per-call classification flags.
//!
//! One byte per pixel. Small calls use a stack array; larger ones reserve
//! exactly `pixel_count` bytes on the heap and report allocation failure
//! instead of aborting. The storage lives only for the duration of the
//! closure, so every exit path releases it.

use log::warn;

use crate::config::STACK_FLAGS;

/// Run `f` with a zeroed flags slice of length `pixel_count`.
///
/// Returns `None` when the heap allocation fails; `f` is not called.
pub(crate) fn with_flags<R>(pixel_count: usize, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
    if pixel_count <= STACK_FLAGS {
        let mut stack = [0u8; STACK_FLAGS];
        return Some(f(&mut stack[..pixel_count]));
    }

    let mut heap = Vec::new();
    if let Err(err) = heap.try_reserve_exact(pixel_count) {
        warn!("boundary guard: cannot allocate {pixel_count} classification flags: {err}");
        return None;
    }
    heap.resize(pixel_count, 0);
    Some(f(&mut heap))
}

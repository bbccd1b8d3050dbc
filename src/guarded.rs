//! Two-pass boundary-guarded transform.
//!
//! Pass 1 classifies every pixel and writes the cached response for each
//! boundary pixel. Pass 2 sends the remaining interior pixels to the
//! external transform: one call per pixel when they are sparse, or one call
//! over the whole buffer followed by re-stamping the boundary positions
//! when more than 90% of the buffer is interior.
//!
//! Every path produces the same bytes the external transform alone would.

use log::trace;

use crate::cache::BoundaryCacheEntry;
use crate::classifier::Classifier;
use crate::context::GuardContext;
use crate::flags::with_flags;
use crate::scalar::{self, Boundary};
use crate::targets::simd_multiversion;
use crate::transform::ColorTransform;

/// Pending share above which pass 2 converts the whole buffer at once (9/10).
pub const BULK_NUMERATOR: usize = 9;
/// See [`BULK_NUMERATOR`].
pub const BULK_DENOMINATOR: usize = 10;

const PENDING: u8 = 1;

/// What a guarded call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Pixels whose output came from the external transform.
    pub transformed_count: usize,
    /// Pixels answered from the cached minimum response.
    pub minimum_count: usize,
    /// Pixels answered from the cached maximum response.
    pub maximum_count: usize,
    /// The whole buffer went straight to the external transform.
    pub optimization_skipped: bool,
}

impl TransformStats {
    /// Stats for a full delegation of `pixel_count` pixels.
    #[inline]
    pub fn skipped(pixel_count: usize) -> Self {
        Self {
            transformed_count: pixel_count,
            optimization_skipped: true,
            ..Self::default()
        }
    }

    /// Pixels answered from the cache.
    #[inline]
    pub fn boundary_count(&self) -> usize {
        self.minimum_count + self.maximum_count
    }
}

impl GuardContext {
    /// Convert `pixel_count` pixels, substituting cached responses for
    /// boundary pixels.
    ///
    /// Falls back to one plain external call when `transform` is not
    /// registered or the flags array cannot be allocated.
    ///
    /// # Panics
    ///
    /// When `transform` is registered and either buffer holds fewer than
    /// `pixel_count` pixels.
    pub fn do_transform<T: ColorTransform + ?Sized>(
        &self,
        transform: &T,
        input: &[u8],
        output: &mut [u8],
        pixel_count: usize,
    ) -> TransformStats {
        if pixel_count == 0 {
            return TransformStats::default();
        }
        let Some(entry) = self.cache.lookup(transform.id()) else {
            trace!("boundary guard: {:?} not registered, delegating", transform.id());
            return delegate(transform, input, output, pixel_count);
        };
        check_buffer("input", input.len(), pixel_count, entry.input_bytes_per_pixel());
        check_buffer("output", output.len(), pixel_count, entry.output_bytes_per_pixel());

        let guarded = with_flags(pixel_count, |flags| {
            guarded_passes(self.classifier, entry, transform, input, output, pixel_count, flags)
        });
        match guarded {
            Some(stats) => stats,
            None => delegate(transform, input, output, pixel_count),
        }
    }
}

/// Hand the whole buffer to the external transform.
pub(crate) fn delegate<T: ColorTransform + ?Sized>(
    transform: &T,
    input: &[u8],
    output: &mut [u8],
    pixel_count: usize,
) -> TransformStats {
    if pixel_count > 0 {
        transform.do_transform(input, output, pixel_count);
    }
    TransformStats::skipped(pixel_count)
}

/// Panic unless `len` bytes hold `pixel_count` pixels of `bpp` bytes.
#[inline]
#[track_caller]
pub(crate) fn check_buffer(name: &str, len: usize, pixel_count: usize, bpp: usize) {
    let needed = pixel_count.saturating_mul(bpp);
    assert!(
        len >= needed,
        "{name} buffer too small: {len} bytes for {pixel_count} pixels of {bpp} bytes \
         (need {needed})"
    );
}

fn guarded_passes<T: ColorTransform + ?Sized>(
    classifier: Classifier,
    entry: &BoundaryCacheEntry,
    transform: &T,
    input: &[u8],
    output: &mut [u8],
    pixel_count: usize,
    flags: &mut [u8],
) -> TransformStats {
    let in_bpp = entry.input_bytes_per_pixel();
    let out_bpp = entry.output_bytes_per_pixel();
    let mut stats = TransformStats::default();
    let mut pending = 0usize;

    // Pass 1: classify.
    classifier.classify_each(entry, input, pixel_count, |i, class| {
        let out = &mut output[i * out_bpp..(i + 1) * out_bpp];
        match class {
            Boundary::Minimum => {
                out.copy_from_slice(entry.minimum_output());
                stats.minimum_count += 1;
                flags[i] = 0;
            }
            Boundary::Maximum => {
                out.copy_from_slice(entry.maximum_output());
                stats.maximum_count += 1;
                flags[i] = 0;
            }
            Boundary::Interior => {
                flags[i] = PENDING;
                pending += 1;
            }
        }
    });

    // Pass 2: complete.
    if pending == 0 {
        trace!("boundary guard: all {pixel_count} pixels were boundary");
    } else if pending * BULK_DENOMINATOR > pixel_count * BULK_NUMERATOR {
        trace!("boundary guard: {pending}/{pixel_count} pending, bulk transform");
        transform.do_transform(input, output, pixel_count);
        restamp_boundaries(flags, input, output, entry);
    } else {
        trace!("boundary guard: {pending}/{pixel_count} pending, per-pixel transform");
        for (i, _) in flags.iter().enumerate().filter(|(_, f)| **f == PENDING) {
            transform.do_transform(
                &input[i * in_bpp..(i + 1) * in_bpp],
                &mut output[i * out_bpp..(i + 1) * out_bpp],
                1,
            );
        }
    }

    stats.transformed_count = pending;
    stats
}

simd_multiversion! {
    /// Put the cached responses back at every non-pending position after a
    /// whole-buffer transform overwrote them.
    fn restamp_boundaries(
        flags: &[u8],
        input: &[u8],
        output: &mut [u8],
        entry: &BoundaryCacheEntry,
    ) {
        let in_bpp = entry.input_bytes_per_pixel();
        let out_bpp = entry.output_bytes_per_pixel();
        for (i, &flag) in flags.iter().enumerate() {
            if flag == PENDING {
                continue;
            }
            let cached = match scalar::classify(&input[i * in_bpp..], entry) {
                Boundary::Minimum => entry.minimum_output(),
                _ => entry.maximum_output(),
            };
            output[i * out_bpp..(i + 1) * out_bpp].copy_from_slice(cached);
        }
    }
}

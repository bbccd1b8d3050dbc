//! The external colour conversion this crate accelerates.
//!
//! A [`ColorTransform`] is opaque: identity, formats, and a deterministic
//! `input bytes → output bytes` routine. Boundary precomputation is only
//! valid because repeated calls with the same input give the same output.

use crate::format::FormatWord;

/// Identity of a transform, used as the cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId(pub u64);

/// A pure, deterministic pixel conversion supplied by the colour engine.
pub trait ColorTransform {
    /// Stable identity for the lifetime of the transform.
    fn id(&self) -> TransformId;

    /// Packed format of the input buffer.
    fn input_format(&self) -> FormatWord;

    /// Packed format of the output buffer.
    fn output_format(&self) -> FormatWord;

    /// Convert `pixel_count` pixels from `input` into `output`.
    ///
    /// Both slices hold at least `pixel_count` pixels in their formats.
    fn do_transform(&self, input: &[u8], output: &mut [u8], pixel_count: usize);
}

impl<T: ColorTransform + ?Sized> ColorTransform for &T {
    fn id(&self) -> TransformId {
        (**self).id()
    }

    fn input_format(&self) -> FormatWord {
        (**self).input_format()
    }

    fn output_format(&self) -> FormatWord {
        (**self).output_format()
    }

    fn do_transform(&self, input: &[u8], output: &mut [u8], pixel_count: usize) {
        (**self).do_transform(input, output, pixel_count)
    }
}

/// Adapts a per-pixel closure into a [`ColorTransform`].
///
/// The closure receives one input pixel and writes one output pixel.
///
/// ```
/// use boundary_guard::{ColorTransform, FnTransform, FormatWord, TransformId};
///
/// let rgb8 = FormatWord::new().with_channels(3).with_bytes(1);
/// let invert = FnTransform::new(TransformId(1), rgb8, rgb8, |src: &[u8], dst: &mut [u8]| {
///     for (d, s) in dst.iter_mut().zip(src) {
///         *d = 255 - s;
///     }
/// });
/// let mut out = [0u8; 3];
/// invert.do_transform(&[0, 10, 255], &mut out, 1);
/// assert_eq!(out, [255, 245, 0]);
/// ```
pub struct FnTransform<F> {
    id: TransformId,
    input: FormatWord,
    output: FormatWord,
    input_stride: usize,
    output_stride: usize,
    pixel_fn: F,
}

impl<F> FnTransform<F>
where
    F: Fn(&[u8], &mut [u8]),
{
    /// Wrap `pixel_fn` for the given formats.
    pub fn new(id: TransformId, input: FormatWord, output: FormatWord, pixel_fn: F) -> Self {
        Self {
            id,
            input,
            output,
            input_stride: stride(input),
            output_stride: stride(output),
            pixel_fn,
        }
    }
}

fn stride(word: FormatWord) -> usize {
    ((word.channels() + word.extra()) as usize * word.bytes_per_sample()).max(1)
}

impl<F> ColorTransform for FnTransform<F>
where
    F: Fn(&[u8], &mut [u8]),
{
    fn id(&self) -> TransformId {
        self.id
    }

    fn input_format(&self) -> FormatWord {
        self.input
    }

    fn output_format(&self) -> FormatWord {
        self.output
    }

    fn do_transform(&self, input: &[u8], output: &mut [u8], pixel_count: usize) {
        let src = input.chunks_exact(self.input_stride);
        let dst = output.chunks_exact_mut(self.output_stride);
        for (s, d) in src.zip(dst).take(pixel_count) {
            (self.pixel_fn)(s, d);
        }
    }
}

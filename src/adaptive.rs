//! Sampling gate in front of the guarded transform.
//!
//! Large buffers whose leading pixels are all boundary pixels (masks,
//! separations, mostly-blank pages) go through the guarded path. Everything
//! else goes straight to the external transform in one call, so the cost of
//! a miss is one short classification pass.

use log::trace;

use crate::context::GuardContext;
use crate::guarded::{TransformStats, check_buffer, delegate};
use crate::transform::ColorTransform;

impl GuardContext {
    /// Convert `pixel_count` pixels, using the guarded path only when it is
    /// likely to pay off.
    ///
    /// The decision is all-or-nothing over the whole buffer: below
    /// [`GuardConfig::min_pixels`](crate::GuardConfig::min_pixels), without a
    /// cache entry, or with any interior pixel among the first
    /// [`GuardConfig::sample_size`](crate::GuardConfig::sample_size), the
    /// entire buffer is delegated.
    pub fn do_transform_adaptive<T: ColorTransform + ?Sized>(
        &self,
        transform: &T,
        input: &[u8],
        output: &mut [u8],
        pixel_count: usize,
    ) -> TransformStats {
        if pixel_count == 0 {
            return TransformStats::default();
        }
        if pixel_count < self.config.min_pixels {
            trace!(
                "adaptive gate: {pixel_count} pixels below threshold {}, delegating",
                self.config.min_pixels
            );
            return delegate(transform, input, output, pixel_count);
        }
        let Some(entry) = self.cache.lookup(transform.id()) else {
            trace!("adaptive gate: {:?} not registered, delegating", transform.id());
            return delegate(transform, input, output, pixel_count);
        };

        let sample = pixel_count.min(self.config.sample_size.max(1));
        check_buffer("input", input.len(), sample, entry.input_bytes_per_pixel());
        let boundary = self.classifier.count_boundary(entry, input, sample);
        if boundary == sample {
            trace!("adaptive gate: sample of {sample} all boundary, guarding");
            self.do_transform(transform, input, output, pixel_count)
        } else {
            trace!("adaptive gate: {boundary}/{sample} sampled pixels boundary, delegating");
            delegate(transform, input, output, pixel_count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::SumTransform;
    use crate::config::{DEFAULT_MIN_PIXELS, GuardConfig};
    use crate::format::FormatWord;

    fn gray8() -> FormatWord {
        FormatWord::new().with_channels(1).with_bytes(1)
    }

    fn registered(id: u64) -> (GuardContext, SumTransform) {
        let transform = SumTransform::new(id, gray8(), gray8());
        let mut ctx = GuardContext::new();
        ctx.register(&transform).unwrap();
        (ctx, transform)
    }

    #[test]
    fn test_below_threshold_always_skips() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (ctx, transform) = registered(1);
        let n = DEFAULT_MIN_PIXELS - 1;
        let input = vec![0u8; n];
        let mut output = vec![0u8; n];
        let stats = ctx.do_transform_adaptive(&transform, &input, &mut output, n);
        assert_eq!(stats, TransformStats::skipped(n));
        assert!(output.iter().all(|&b| b == 1));
    }

    #[test]
    fn test_all_boundary_sample_guards_full_buffer() {
        let (ctx, transform) = registered(2);
        let n = DEFAULT_MIN_PIXELS;
        let mut input = vec![0u8; n];
        // Interior pixels past the sample still get transformed.
        input[1000] = 7;
        input[n - 1] = 9;
        let mut output = vec![0u8; n];
        let calls = transform.calls.get();
        let stats = ctx.do_transform_adaptive(&transform, &input, &mut output, n);

        assert!(!stats.optimization_skipped);
        assert_eq!(stats.transformed_count, 2);
        assert_eq!(stats.minimum_count, n - 2);
        assert_eq!(transform.calls.get() - calls, 2);
        assert_eq!(output[1000], 8);
        assert_eq!(output[n - 1], 10);
        assert_eq!(output[0], 1);
    }

    #[test]
    fn test_one_interior_in_sample_delegates_everything() {
        let (ctx, transform) = registered(3);
        let n = DEFAULT_MIN_PIXELS;
        let mut input = vec![255u8; n];
        input[255] = 128;
        let mut output = vec![0u8; n];
        let calls = transform.calls.get();
        let stats = ctx.do_transform_adaptive(&transform, &input, &mut output, n);

        assert_eq!(stats, TransformStats::skipped(n));
        assert_eq!(transform.calls.get() - calls, 1);
    }

    #[test]
    fn test_unregistered_delegates() {
        let transform = SumTransform::new(4, gray8(), gray8());
        let ctx = GuardContext::with_config(GuardConfig::default().with_min_pixels(1));
        let mut output = [0u8; 4];
        let stats = ctx.do_transform_adaptive(&transform, &[0; 4], &mut output, 4);
        assert_eq!(stats, TransformStats::skipped(4));
    }

    #[test]
    fn test_configured_thresholds() {
        let transform = SumTransform::new(5, gray8(), gray8());
        let config = GuardConfig::default().with_min_pixels(8).with_sample_size(4);
        let mut ctx = GuardContext::with_config(config);
        ctx.register(&transform).unwrap();

        // Interior pixel just past the 4-pixel sample.
        let input = [0, 255, 0, 255, 50, 0, 0, 0];
        let mut output = [0u8; 8];
        let stats = ctx.do_transform_adaptive(&transform, &input, &mut output, 8);
        assert!(!stats.optimization_skipped);
        assert_eq!(stats.transformed_count, 1);
        assert_eq!(output, [1, 0, 1, 0, 51, 1, 1, 1]);

        // Smaller buffers skip.
        let stats = ctx.do_transform_adaptive(&transform, &input[..7], &mut output[..7], 7);
        assert!(stats.optimization_skipped);
    }

    #[test]
    fn test_zero_sample_size_still_inspects_first_pixel() {
        let transform = SumTransform::new(6, gray8(), gray8());
        let config = GuardConfig {
            min_pixels: 1,
            sample_size: 0,
            force_scalar: false,
        };
        let mut ctx = GuardContext::with_config(config);
        ctx.register(&transform).unwrap();

        let mut output = [0u8; 3];
        let stats = ctx.do_transform_adaptive(&transform, &[40, 0, 0], &mut output, 3);
        assert_eq!(stats, TransformStats::skipped(3));
        assert_eq!(output, [41, 1, 1]);

        let stats = ctx.do_transform_adaptive(&transform, &[0, 40, 0], &mut output, 3);
        assert!(!stats.optimization_skipped);
        assert_eq!(output, [1, 41, 1]);
    }
}

//! One classification interface, two implementations.
//!
//! [`Classifier::Scalar`] checks pixels one at a time. [`Classifier::Batched`]
//! runs the 4-pixel detectors from [`simd`](crate::simd) wherever the layout
//! allows (8-bit 3/4-channel boundary checks, packed 8-bit and `f32` Lab
//! sentinels) and finishes remainders with the scalar checks. Both produce
//! identical results; the batched variant is chosen by a runtime capability
//! check.

use std::sync::OnceLock;

use crate::cache::BoundaryCacheEntry;
use crate::config::GuardConfig;
use crate::scalar::{self, Boundary};
use crate::sentinel::SentinelEncoding;
use crate::simd;

/// Pixel classification strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classifier {
    /// Pixel-at-a-time byte comparison.
    Scalar,
    /// 128-bit batches of four pixels where the layout allows.
    Batched,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::detect()
    }
}

impl Classifier {
    /// Best classifier for the running CPU. Detected once per process.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Classifier> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            if batched_available() {
                Classifier::Batched
            } else {
                Classifier::Scalar
            }
        })
    }

    /// [`detect`](Self::detect), unless `config` forces the scalar path.
    pub fn from_config(config: &GuardConfig) -> Self {
        if config.force_scalar {
            Classifier::Scalar
        } else {
            Self::detect()
        }
    }

    /// True for [`Classifier::Batched`].
    #[inline]
    pub fn is_batched(self) -> bool {
        self == Classifier::Batched
    }

    /// Classify the first `pixel_count` pixels of `input`, calling `visit`
    /// with each index and result in ascending order.
    pub fn classify_each<F>(
        self,
        entry: &BoundaryCacheEntry,
        input: &[u8],
        pixel_count: usize,
        mut visit: F,
    ) where
        F: FnMut(usize, Boundary),
    {
        let bpp = entry.input_bytes_per_pixel();
        let format = entry.input_format();
        let channels = format.channels() as usize;
        let mut start = 0;

        if self.is_batched() && format.bytes_per_sample() == 1 && (channels == 3 || channels == 4) {
            let block = 4 * bpp;
            let blocks = pixel_count / 4;
            for (b, chunk) in input[..blocks * block].chunks_exact(block).enumerate() {
                let mask = simd::detect_boundary_x4(chunk, channels);
                for lane in 0..4 {
                    visit(b * 4 + lane, mask.class(lane));
                }
            }
            start = blocks * 4;
        }

        for i in start..pixel_count {
            visit(i, scalar::classify(&input[i * bpp..], entry));
        }
    }

    /// Number of boundary pixels (either extreme) among the first `pixel_count`.
    pub fn count_boundary(
        self,
        entry: &BoundaryCacheEntry,
        input: &[u8],
        pixel_count: usize,
    ) -> usize {
        let mut count = 0;
        self.classify_each(entry, input, pixel_count, |_, class| {
            if class.is_boundary() {
                count += 1;
            }
        });
        count
    }

    /// Set `flags[i]` to 1 for every sentinel pixel and 0 otherwise.
    ///
    /// `stride` is the full input pixel size in bytes, including extra
    /// channels. Returns the number of sentinels.
    pub fn mark_sentinels(
        self,
        encoding: SentinelEncoding,
        stride: usize,
        input: &[u8],
        pixel_count: usize,
        flags: &mut [u8],
    ) -> usize {
        let flags = &mut flags[..pixel_count];
        let mut count = 0;
        let mut start = 0;

        if self.is_batched() {
            let detector: Option<fn(&[u8]) -> u8> = match (encoding, stride) {
                (SentinelEncoding::Integer { lab_bytes: 3 }, 3) => {
                    Some(simd::detect_sentinel_x4_lab8)
                }
                (SentinelEncoding::F32, 12) => Some(simd::detect_sentinel_x4_lab_f32),
                _ => None,
            };
            if let Some(detect) = detector {
                let block = 4 * stride;
                let blocks = pixel_count / 4;
                for (b, chunk) in input[..blocks * block].chunks_exact(block).enumerate() {
                    let mask = detect(chunk);
                    for lane in 0..4 {
                        let hit = (mask >> lane) & 1;
                        flags[b * 4 + lane] = hit;
                        count += hit as usize;
                    }
                }
                start = blocks * 4;
            }
        }

        for (i, flag) in flags.iter_mut().enumerate().skip(start) {
            let hit = scalar::is_sentinel(&input[i * stride..], encoding);
            *flag = hit as u8;
            count += hit as usize;
        }
        count
    }
}

/// Runtime check for 128-bit integer vector support.
fn batched_available() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        std::arch::is_x86_feature_detected!("sse2")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("neon")
    }
    #[cfg(target_arch = "wasm32")]
    {
        cfg!(target_feature = "simd128")
    }
    #[cfg(not(any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "wasm32"
    )))]
    {
        false
    }
}

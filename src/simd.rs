//! 128-bit batched detection using the `wide` crate.
//!
//! Each detector loads four pixels into one or more 128-bit vectors, runs a
//! lane-wise equality against replicated reference values, and folds the
//! lane results into a per-pixel mask. Results are bit-identical to calling
//! the [`scalar`](crate::scalar) checks on each pixel.
//!
//! `wide` picks SSE2 / NEON / SIMD128 at compile time and falls back to
//! portable lanes otherwise, so these functions are always callable; the
//! [`Classifier`](crate::Classifier) decides whether they are worth calling.

use wide::{CmpEq, f32x4, u8x16};

use crate::scalar::{Boundary, read_f32};

const ZERO: u8x16 = u8x16::new([0x00; 16]);
const FULL: u8x16 = u8x16::new([0xFF; 16]);

/// Boundary results for a block of four pixels.
///
/// Bit `i` is set when pixel `i` is all-minimum, bit `4 + i` when it is
/// all-maximum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BatchMask(pub u8);

impl BatchMask {
    /// Pixel `lane` matched the minimum.
    #[inline]
    pub const fn is_minimum(self, lane: usize) -> bool {
        self.0 & (1 << lane) != 0
    }

    /// Pixel `lane` matched the maximum.
    #[inline]
    pub const fn is_maximum(self, lane: usize) -> bool {
        self.0 & (0x10 << lane) != 0
    }

    /// Classification of pixel `lane`.
    #[inline]
    pub const fn class(self, lane: usize) -> Boundary {
        if self.is_minimum(lane) {
            Boundary::Minimum
        } else if self.is_maximum(lane) {
            Boundary::Maximum
        } else {
            Boundary::Interior
        }
    }

    /// Pixels in the block at either extreme.
    #[inline]
    pub const fn boundary_count(self) -> usize {
        ((self.0 | (self.0 >> 4)) & 0x0F).count_ones() as usize
    }
}

/// One bit per byte lane, set where the comparison matched.
#[inline]
fn lane_bits(matched: u8x16) -> u16 {
    matched
        .to_array()
        .iter()
        .enumerate()
        .fold(0u16, |bits, (lane, &m)| bits | (u16::from(m >> 7) << lane))
}

/// Collapse lane bits into a 4-bit pixel mask: pixel `j` is set when all
/// `stride` lanes starting at `j × stride` are set.
#[inline]
fn pixels_matching(bits: u16, stride: usize) -> u8 {
    let full = (1u16 << stride) - 1;
    (0..4).fold(0u8, |mask, pixel| {
        if (bits >> (pixel * stride)) & full == full {
            mask | (1 << pixel)
        } else {
            mask
        }
    })
}

/// Detect boundary pixels in four packed 8-bit pixels of `channels` (3 or 4) samples.
///
/// Reads `4 × channels` bytes from `pixels`.
#[inline]
pub fn detect_boundary_x4(pixels: &[u8], channels: usize) -> BatchMask {
    debug_assert!(channels == 3 || channels == 4);
    let block = 4 * channels;
    let mut lanes = [0u8; 16];
    lanes[..block].copy_from_slice(&pixels[..block]);
    let v = u8x16::new(lanes);

    let minimum = pixels_matching(lane_bits(v.cmp_eq(ZERO)), channels);
    let maximum = pixels_matching(lane_bits(v.cmp_eq(FULL)), channels);
    BatchMask(minimum | (maximum << 4))
}

/// Four 8-bit RGB pixels (12 bytes).
#[inline]
pub fn detect_boundary_x4_rgb8(pixels: &[u8; 12]) -> BatchMask {
    detect_boundary_x4(pixels, 3)
}

/// Four 8-bit 4-channel pixels such as CMYK or RGBA (16 bytes).
#[inline]
pub fn detect_boundary_x4_4ch8(pixels: &[u8; 16]) -> BatchMask {
    detect_boundary_x4(pixels, 4)
}

/// Sentinel mask (bit `i` = pixel `i`) for four packed 8-bit Lab pixels (12 bytes).
#[inline]
pub fn detect_sentinel_x4_lab8(pixels: &[u8]) -> u8 {
    let mut lanes = [0xFFu8; 16];
    lanes[..12].copy_from_slice(&pixels[..12]);
    pixels_matching(lane_bits(u8x16::new(lanes).cmp_eq(ZERO)), 3)
}

/// Sentinel mask for four packed `f32` Lab pixels (48 bytes).
///
/// The twelve floats span three vectors; each is compared against the
/// sentinel's channel values rotated into the matching lane positions.
#[inline]
pub fn detect_sentinel_x4_lab_f32(pixels: &[u8]) -> u8 {
    const S: f32 = -128.0;
    let patterns = [[0.0, S, S, 0.0], [S, S, 0.0, S], [S, 0.0, S, S]];

    let mut bits = 0u16;
    for (chunk, pattern) in patterns.iter().enumerate() {
        let base = chunk * 4;
        let v = f32x4::from([
            read_f32(pixels, base),
            read_f32(pixels, base + 1),
            read_f32(pixels, base + 2),
            read_f32(pixels, base + 3),
        ]);
        let matched = v.cmp_eq(f32x4::from(*pattern)).move_mask() as u16 & 0xF;
        bits |= matched << base;
    }
    pixels_matching(bits, 3)
}

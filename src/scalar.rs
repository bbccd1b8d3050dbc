//! Scalar (single-pixel) classification.
//!
//! Exact byte comparison against a cache entry's reference patterns, and
//! the per-pixel Lab sentinel test. These are the reference semantics: the
//! batched detectors in [`simd`](crate::simd) must agree with them bit for bit.

use half::f16;

use crate::cache::BoundaryCacheEntry;
use crate::sentinel::SentinelEncoding;

/// Where a pixel sits relative to the data range of its encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Every channel at the encoding minimum (all-zero bytes).
    Minimum,
    /// Every channel at the encoding maximum.
    Maximum,
    /// Anything else.
    Interior,
}

impl Boundary {
    /// True for [`Minimum`](Self::Minimum) and [`Maximum`](Self::Maximum).
    #[inline]
    pub fn is_boundary(self) -> bool {
        !matches!(self, Boundary::Interior)
    }
}

/// Classify one pixel against `entry`.
///
/// Only the first `entry.input_bytes_per_pixel()` bytes of `pixel` are read.
#[inline]
pub fn classify(pixel: &[u8], entry: &BoundaryCacheEntry) -> Boundary {
    let pixel = &pixel[..entry.input_bytes_per_pixel()];
    if pixel == entry.minimum_input() {
        Boundary::Minimum
    } else if pixel == entry.maximum_input() {
        Boundary::Maximum
    } else {
        Boundary::Interior
    }
}

/// True when `pixel` carries the Lab mask sentinel (L = 0, a = b = -128).
///
/// Integer Lab encodes the sentinel as all-zero bytes, so an integer pixel
/// of true black with zero chroma bytes also reads as the sentinel.
#[inline]
pub fn is_sentinel(pixel: &[u8], encoding: SentinelEncoding) -> bool {
    match encoding {
        SentinelEncoding::Integer { lab_bytes } => pixel[..lab_bytes].iter().all(|&b| b == 0),
        SentinelEncoding::F16 => {
            read_f16(pixel, 0) == f16::ZERO
                && read_f16(pixel, 1) == HALF_MINUS_128
                && read_f16(pixel, 2) == HALF_MINUS_128
        }
        SentinelEncoding::F32 => {
            read_f32(pixel, 0) == 0.0
                && read_f32(pixel, 1) == -128.0
                && read_f32(pixel, 2) == -128.0
        }
        SentinelEncoding::F64 => {
            read_f64(pixel, 0) == 0.0
                && read_f64(pixel, 1) == -128.0
                && read_f64(pixel, 2) == -128.0
        }
    }
}

const HALF_MINUS_128: f16 = f16::from_f32_const(-128.0);

#[inline]
fn read_f16(pixel: &[u8], index: usize) -> f16 {
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&pixel[index * 2..index * 2 + 2]);
    f16::from_ne_bytes(bytes)
}

#[inline]
pub(crate) fn read_f32(pixel: &[u8], index: usize) -> f32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&pixel[index * 4..index * 4 + 4]);
    f32::from_ne_bytes(bytes)
}

#[inline]
fn read_f64(pixel: &[u8], index: usize) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&pixel[index * 8..index * 8 + 8]);
    f64::from_ne_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::SumTransform;
    use crate::format::FormatWord;

    fn entry_for(channels: u32, bytes: u32, float: bool) -> BoundaryCacheEntry {
        let input = FormatWord::new()
            .with_channels(channels)
            .with_bytes(bytes)
            .with_float(float);
        let output = FormatWord::new().with_channels(4).with_bytes(1);
        let transform = SumTransform::new(1, input, output);
        let mut store = crate::cache::CacheStore::new();
        store.register(&transform).unwrap();
        store.lookup(transform.id).unwrap().clone()
    }

    #[test]
    fn test_extremes_classify_for_every_encoding() {
        for (bytes, float) in [(1, false), (2, false), (4, false), (2, true), (4, true)] {
            for channels in 1..=8u32 {
                let entry = entry_for(channels, bytes, float);
                let bpp = entry.input_bytes_per_pixel();
                let zeros = vec![0u8; bpp];
                assert_eq!(
                    classify(&zeros, &entry),
                    Boundary::Minimum,
                    "min: {} ch × {} bytes (float {})",
                    channels,
                    bytes,
                    float
                );
                let max = entry.maximum_input().to_vec();
                assert_eq!(
                    classify(&max, &entry),
                    Boundary::Maximum,
                    "max: {} ch × {} bytes (float {})",
                    channels,
                    bytes,
                    float
                );
            }
        }
        // Doubles fit up to 4 channels.
        for channels in 1..=4u32 {
            let entry = entry_for(channels, 0, true);
            assert_eq!(classify(&vec![0u8; channels as usize * 8], &entry), Boundary::Minimum);
            assert_eq!(classify(entry.maximum_input(), &entry), Boundary::Maximum);
        }
    }

    #[test]
    fn test_near_extremes_are_interior() {
        let entry = entry_for(3, 1, false);
        assert_eq!(classify(&[0, 0, 1], &entry), Boundary::Interior);
        assert_eq!(classify(&[255, 254, 255], &entry), Boundary::Interior);
        assert_eq!(classify(&[0, 255, 0], &entry), Boundary::Interior);

        // 0xFFFF bytes are not the float maximum.
        let float = entry_for(3, 4, true);
        assert_eq!(classify(&[0xFF; 12], &float), Boundary::Interior);
    }

    #[test]
    fn test_classify_ignores_trailing_bytes() {
        let entry = entry_for(3, 1, false);
        assert_eq!(classify(&[0, 0, 0, 77], &entry), Boundary::Minimum);
    }

    #[test]
    fn test_sentinel_integer_and_float() {
        let lab8 = SentinelEncoding::Integer { lab_bytes: 3 };
        assert!(is_sentinel(&[0, 0, 0], lab8));
        assert!(!is_sentinel(&[0, 128, 128], lab8));

        let lab16 = SentinelEncoding::Integer { lab_bytes: 6 };
        assert!(is_sentinel(&[0; 8], lab16));
        assert!(!is_sentinel(&[0, 0, 0, 0, 0, 1], lab16));

        let mut f = Vec::new();
        for v in [0.0f32, -128.0, -128.0] {
            f.extend_from_slice(&v.to_ne_bytes());
        }
        assert!(is_sentinel(&f, SentinelEncoding::F32));
        f[4..8].copy_from_slice(&(-127.5f32).to_ne_bytes());
        assert!(!is_sentinel(&f, SentinelEncoding::F32));

        let mut d = Vec::new();
        for v in [-0.0f64, -128.0, -128.0] {
            d.extend_from_slice(&v.to_ne_bytes());
        }
        assert!(is_sentinel(&d, SentinelEncoding::F64));

        let mut h = Vec::new();
        for v in [0x0000u16, 0xD800, 0xD800] {
            h.extend_from_slice(&v.to_ne_bytes());
        }
        assert!(is_sentinel(&h, SentinelEncoding::F16));
        h[0..2].copy_from_slice(&0x8000u16.to_ne_bytes());
        assert!(is_sentinel(&h, SentinelEncoding::F16), "-0 luminance is still the marker");
        h[2..4].copy_from_slice(&0xD801u16.to_ne_bytes());
        assert!(!is_sentinel(&h, SentinelEncoding::F16));
    }
}

//! Pixel format descriptors.
//!
//! Formats arrive as LittleCMS-style packed words ([`FormatWord`]). This
//! module decodes them into byte-layout facts ([`PixelFormat`]) and builds
//! the byte patterns for data-range extremes in each sample encoding.
//!
//! All patterns are native-endian: they are compared against in-memory
//! buffers, never serialized.

use half::f16;

use crate::error::{ConfigurationError, Result, Side};

/// Capacity of every reference pattern, in bytes.
pub const PATTERN_BYTES: usize = 32;

/// Largest supported channel count per side.
pub const MAX_CHANNELS: u32 = 8;

/// Fixed-capacity byte pattern for one pixel.
pub type Pattern = [u8; PATTERN_BYTES];

const PT_LAB: u32 = 10;
const PT_LAB_V2: u32 = 30;

// ============================================================================
// Colour space tag
// ============================================================================

/// Colour space recorded in a format word.
///
/// Only Lab matters here; everything else is carried through opaquely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// ICC v4 Lab encoding.
    Lab,
    /// ICC v2 (legacy) Lab encoding.
    LabV2,
    /// Any other colour space code.
    Other(u32),
}

impl ColorSpace {
    /// Decode a 5-bit colour space code.
    pub const fn from_code(code: u32) -> Self {
        match code {
            PT_LAB => ColorSpace::Lab,
            PT_LAB_V2 => ColorSpace::LabV2,
            other => ColorSpace::Other(other),
        }
    }

    /// The numeric code.
    pub const fn code(self) -> u32 {
        match self {
            ColorSpace::Lab => PT_LAB,
            ColorSpace::LabV2 => PT_LAB_V2,
            ColorSpace::Other(code) => code,
        }
    }

    /// True for either Lab encoding.
    pub const fn is_lab(self) -> bool {
        matches!(self, ColorSpace::Lab | ColorSpace::LabV2)
    }
}

// ============================================================================
// Packed format word
// ============================================================================

/// LittleCMS-compatible packed pixel format.
///
/// | Bits | Field |
/// |------|-------|
/// | 0–2 | bytes per sample (0 = 8, double) |
/// | 3–6 | colour channels |
/// | 7–9 | extra channels |
/// | 16–20 | colour space |
/// | 22 | floating point |
///
/// ```
/// use boundary_guard::{ColorSpace, FormatWord};
///
/// let lab_float = FormatWord::new()
///     .with_channels(3)
///     .with_bytes(4)
///     .with_float(true)
///     .with_color_space(ColorSpace::Lab);
/// assert_eq!(lab_float.channels(), 3);
/// assert!(lab_float.color_space().is_lab());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FormatWord(pub u32);

impl FormatWord {
    /// Empty word.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Bytes-per-sample code (0 means 8).
    pub const fn bytes_code(self) -> u32 {
        self.0 & 0x7
    }

    /// Colour channel count.
    pub const fn channels(self) -> u32 {
        (self.0 >> 3) & 0xF
    }

    /// Extra (alpha/spot) channel count.
    pub const fn extra(self) -> u32 {
        (self.0 >> 7) & 0x7
    }

    /// Colour space tag.
    pub const fn color_space(self) -> ColorSpace {
        ColorSpace::from_code((self.0 >> 16) & 0x1F)
    }

    /// Floating point samples.
    pub const fn is_float(self) -> bool {
        (self.0 >> 22) & 1 == 1
    }

    /// Set the bytes-per-sample code.
    pub const fn with_bytes(self, code: u32) -> Self {
        Self((self.0 & !0x7) | (code & 0x7))
    }

    /// Set the colour channel count.
    pub const fn with_channels(self, channels: u32) -> Self {
        Self((self.0 & !(0xF << 3)) | ((channels & 0xF) << 3))
    }

    /// Set the extra channel count.
    pub const fn with_extra(self, extra: u32) -> Self {
        Self((self.0 & !(0x7 << 7)) | ((extra & 0x7) << 7))
    }

    /// Set the colour space tag.
    pub const fn with_color_space(self, space: ColorSpace) -> Self {
        Self((self.0 & !(0x1F << 16)) | ((space.code() & 0x1F) << 16))
    }

    /// Set the floating point flag.
    pub const fn with_float(self, float: bool) -> Self {
        if float {
            Self(self.0 | (1 << 22))
        } else {
            Self(self.0 & !(1 << 22))
        }
    }

    /// Bytes per sample, mapping the legacy zero code to 8.
    pub const fn bytes_per_sample(self) -> usize {
        match self.bytes_code() {
            0 => 8,
            code => code as usize,
        }
    }
}

// ============================================================================
// Sample encodings
// ============================================================================

/// One channel's storage encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleEncoding {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// IEEE half precision.
    F16,
    /// IEEE single precision.
    F32,
    /// IEEE double precision.
    F64,
}

impl SampleEncoding {
    /// Resolve a width/float pair. `None` for combinations with no encoding.
    pub const fn from_parts(bytes: usize, float: bool) -> Option<Self> {
        match (bytes, float) {
            (1, false) => Some(SampleEncoding::U8),
            (2, false) => Some(SampleEncoding::U16),
            (4, false) => Some(SampleEncoding::U32),
            (2, true) => Some(SampleEncoding::F16),
            (4, true) => Some(SampleEncoding::F32),
            (8, true) => Some(SampleEncoding::F64),
            _ => None,
        }
    }

    /// Bytes per sample.
    pub const fn bytes(self) -> usize {
        match self {
            SampleEncoding::U8 => 1,
            SampleEncoding::U16 | SampleEncoding::F16 => 2,
            SampleEncoding::U32 | SampleEncoding::F32 => 4,
            SampleEncoding::F64 => 8,
        }
    }

    /// Floating point encoding.
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            SampleEncoding::F16 | SampleEncoding::F32 | SampleEncoding::F64
        )
    }

    /// Write the data-range maximum into `out` (`out.len() == self.bytes()`).
    ///
    /// Integers saturate every bit; floats use `1.0`.
    pub fn write_maximum(self, out: &mut [u8]) {
        match self {
            SampleEncoding::U8 | SampleEncoding::U16 | SampleEncoding::U32 => out.fill(0xFF),
            SampleEncoding::F16 => out.copy_from_slice(&f16::ONE.to_ne_bytes()),
            SampleEncoding::F32 => out.copy_from_slice(&1.0f32.to_ne_bytes()),
            SampleEncoding::F64 => out.copy_from_slice(&1.0f64.to_ne_bytes()),
        }
    }

    /// Write a float value into `out`. Integer encodings are left untouched.
    ///
    /// Half precision rounds to nearest; every constant this crate writes
    /// (0, 1, -128) is exact.
    pub fn write_float(self, value: f32, out: &mut [u8]) {
        match self {
            SampleEncoding::F16 => out.copy_from_slice(&f16::from_f32(value).to_ne_bytes()),
            SampleEncoding::F32 => out.copy_from_slice(&value.to_ne_bytes()),
            SampleEncoding::F64 => out.copy_from_slice(&f64::from(value).to_ne_bytes()),
            SampleEncoding::U8 | SampleEncoding::U16 | SampleEncoding::U32 => {}
        }
    }
}

// ============================================================================
// Pixel format
// ============================================================================

/// Byte layout of one side of a transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    channels: u32,
    sample: SampleEncoding,
}

impl PixelFormat {
    /// Describe a pixel of `channels` samples with width code `bytes_code`.
    ///
    /// A zero width code means 8 bytes. Fails when the channel count is
    /// outside `1..=8`, the encoding is unknown, or the pixel would not fit
    /// a [`Pattern`].
    pub fn describe(side: Side, channels: u32, bytes_code: u32, float: bool) -> Result<Self> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(ConfigurationError::ChannelCount { side, channels });
        }
        let bytes = if bytes_code == 0 {
            8
        } else {
            bytes_code as usize
        };
        let sample = SampleEncoding::from_parts(bytes, float).ok_or(
            ConfigurationError::UnsupportedSample { side, bytes, float },
        )?;
        let pixel = channels as usize * sample.bytes();
        if pixel > PATTERN_BYTES {
            return Err(ConfigurationError::PixelTooWide { side, bytes: pixel });
        }
        Ok(Self { channels, sample })
    }

    /// Describe a side from its packed word, counting extra channels.
    pub fn from_word(side: Side, word: FormatWord) -> Result<Self> {
        Self::describe(
            side,
            word.channels() + word.extra(),
            word.bytes_code(),
            word.is_float(),
        )
    }

    /// Channels per pixel.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Sample encoding.
    #[inline]
    pub fn sample(&self) -> SampleEncoding {
        self.sample
    }

    /// Bytes per sample.
    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        self.sample.bytes()
    }

    /// Bytes per pixel (`channels × bytes_per_sample`).
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels as usize * self.sample.bytes()
    }

    /// Floating point samples.
    #[inline]
    pub fn is_float(&self) -> bool {
        self.sample.is_float()
    }

    /// All-minimum pixel. Numeric zero is all-zero bits in every encoding.
    pub fn minimum_pattern(&self) -> Pattern {
        [0; PATTERN_BYTES]
    }

    /// All-maximum pixel; bytes past [`bytes_per_pixel`](Self::bytes_per_pixel) are zero.
    pub fn maximum_pattern(&self) -> Pattern {
        let mut pattern = [0; PATTERN_BYTES];
        let width = self.sample.bytes();
        for sample in pattern[..self.bytes_per_pixel()].chunks_exact_mut(width) {
            self.sample.write_maximum(sample);
        }
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_roundtrip_fields() {
        let word = FormatWord::new()
            .with_channels(4)
            .with_extra(1)
            .with_bytes(2)
            .with_color_space(ColorSpace::LabV2)
            .with_float(false);
        assert_eq!(word.channels(), 4);
        assert_eq!(word.extra(), 1);
        assert_eq!(word.bytes_code(), 2);
        assert_eq!(word.color_space(), ColorSpace::LabV2);
        assert!(!word.is_float());
        assert!(word.with_float(true).is_float());
    }

    #[test]
    fn test_lcms_constants_decode() {
        // TYPE_RGB_8, TYPE_CMYK_16, TYPE_Lab_FLT, TYPE_Lab_DBL
        let rgb8 = FormatWord((4 << 16) | (3 << 3) | 1);
        let cmyk16 = FormatWord((6 << 16) | (4 << 3) | 2);
        let lab_flt = FormatWord((1 << 22) | (10 << 16) | (3 << 3) | 4);
        let lab_dbl = FormatWord((1 << 22) | (10 << 16) | (3 << 3));

        assert_eq!(
            PixelFormat::from_word(Side::Input, rgb8).map(|f| f.bytes_per_pixel()),
            Ok(3)
        );
        assert_eq!(
            PixelFormat::from_word(Side::Input, cmyk16).map(|f| f.bytes_per_pixel()),
            Ok(8)
        );
        assert_eq!(lab_flt.color_space(), ColorSpace::Lab);
        assert_eq!(lab_dbl.bytes_per_sample(), 8);
        assert_eq!(
            PixelFormat::from_word(Side::Input, lab_dbl).map(|f| f.sample()),
            Ok(SampleEncoding::F64)
        );
    }

    #[test]
    fn test_describe_rejects_bad_channel_counts() {
        assert_eq!(
            PixelFormat::describe(Side::Input, 0, 1, false),
            Err(ConfigurationError::ChannelCount {
                side: Side::Input,
                channels: 0
            })
        );
        assert_eq!(
            PixelFormat::describe(Side::Output, 9, 1, false),
            Err(ConfigurationError::ChannelCount {
                side: Side::Output,
                channels: 9
            })
        );
    }

    #[test]
    fn test_describe_enforces_pattern_cap() {
        // 8 × f32 = 32 fits; 5 × f64 = 40 does not.
        assert!(PixelFormat::describe(Side::Input, 8, 4, true).is_ok());
        assert!(PixelFormat::describe(Side::Input, 4, 0, true).is_ok());
        assert_eq!(
            PixelFormat::describe(Side::Input, 5, 0, true),
            Err(ConfigurationError::PixelTooWide {
                side: Side::Input,
                bytes: 40
            })
        );
    }

    #[test]
    fn test_describe_rejects_unknown_encodings() {
        assert_eq!(
            PixelFormat::describe(Side::Input, 3, 1, true),
            Err(ConfigurationError::UnsupportedSample {
                side: Side::Input,
                bytes: 1,
                float: true
            })
        );
        // Code 0 is an 8-byte double; an 8-byte integer has no encoding.
        assert!(PixelFormat::describe(Side::Input, 1, 0, false).is_err());
        assert!(PixelFormat::describe(Side::Input, 1, 3, false).is_err());
    }

    #[test]
    fn test_maximum_patterns() {
        let u8x3 = PixelFormat::describe(Side::Input, 3, 1, false).unwrap();
        assert_eq!(&u8x3.maximum_pattern()[..4], &[0xFF, 0xFF, 0xFF, 0]);

        let u16x2 = PixelFormat::describe(Side::Input, 2, 2, false).unwrap();
        assert_eq!(&u16x2.maximum_pattern()[..5], &[0xFF, 0xFF, 0xFF, 0xFF, 0]);

        let f32x3 = PixelFormat::describe(Side::Input, 3, 4, true).unwrap();
        let max = f32x3.maximum_pattern();
        for c in 0..3 {
            let mut sample = [0u8; 4];
            sample.copy_from_slice(&max[c * 4..c * 4 + 4]);
            assert_eq!(f32::from_ne_bytes(sample), 1.0, "channel {}", c);
        }
        assert!(max[12..].iter().all(|&b| b == 0));

        let f64x1 = PixelFormat::describe(Side::Input, 1, 0, true).unwrap();
        assert_eq!(&f64x1.maximum_pattern()[..8], &1.0f64.to_ne_bytes());

        let f16x1 = PixelFormat::describe(Side::Input, 1, 2, true).unwrap();
        assert_eq!(&f16x1.maximum_pattern()[..2], &0x3C00u16.to_ne_bytes());
    }

    #[test]
    fn test_half_float_writes() {
        let mut out = [0u8; 2];
        SampleEncoding::F16.write_float(-128.0, &mut out);
        assert_eq!(u16::from_ne_bytes(out), 0xD800);
        SampleEncoding::F16.write_maximum(&mut out);
        assert_eq!(u16::from_ne_bytes(out), 0x3C00);

        // Integer encodings ignore float writes.
        let mut untouched = [7u8; 2];
        SampleEncoding::U16.write_float(-128.0, &mut untouched);
        assert_eq!(untouched, [7, 7]);
    }
}

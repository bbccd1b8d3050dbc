//! Lab mask sentinel handling.
//!
//! Lab inputs may carry a reserved marker (L = 0, a = b = -128) meaning
//! "no colour here" rather than a real colour. When the output is also Lab
//! the marker is restored in the output after conversion (round-trip mode).
//! When the output is not Lab the marker is replaced in the input by
//! neutral black before conversion (correction mode). Correction mode
//! mutates the caller's input buffer.

use log::{debug, trace};

use crate::context::GuardContext;
use crate::error::{ConfigurationError, Result, Side};
use crate::flags::with_flags;
use crate::format::{ColorSpace, FormatWord, PATTERN_BYTES, Pattern, SampleEncoding};
use crate::guarded::{TransformStats, check_buffer};
use crate::targets::simd_multiversion;
use crate::transform::ColorTransform;

const LAB_CHANNELS: usize = 3;

/// How the sentinel is recognised in an input encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SentinelEncoding {
    /// Unsigned integer Lab: the first `lab_bytes` bytes are all zero.
    Integer {
        /// `3 × bytes_per_sample`.
        lab_bytes: usize,
    },
    /// Half float: bits `[0x0000, 0xD800, 0xD800]` (L may be `-0`).
    F16,
    /// `f32`: numeric `[0, -128, -128]`.
    F32,
    /// `f64`: numeric `[0, -128, -128]`.
    F64,
}

impl SentinelEncoding {
    /// Recogniser for Lab pixels stored as `sample`.
    pub fn for_sample(sample: SampleEncoding) -> Self {
        match sample {
            SampleEncoding::F16 => SentinelEncoding::F16,
            SampleEncoding::F32 => SentinelEncoding::F32,
            SampleEncoding::F64 => SentinelEncoding::F64,
            SampleEncoding::U8 | SampleEncoding::U16 | SampleEncoding::U32 => {
                SentinelEncoding::Integer {
                    lab_bytes: LAB_CHANNELS * sample.bytes(),
                }
            }
        }
    }
}

/// What happens to sentinel pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SentinelMode {
    /// Lab → Lab: stamp the sentinel into the output after conversion.
    RoundTrip,
    /// Lab → other: rewrite the input to neutral black before conversion.
    Correction,
}

/// Precomputed sentinel handling for one transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentinelProfile {
    encoding: SentinelEncoding,
    mode: SentinelMode,
    input_stride: usize,
    input_lab_bytes: usize,
    neutral_black: Pattern,
    output_stride: usize,
    output_color_bytes: usize,
    sentinel_output: Pattern,
}

impl SentinelProfile {
    /// Profile for a transform from `input` to `output`.
    ///
    /// `Ok(None)` when the input is not Lab (or has fewer than three colour
    /// channels); such transforms never see sentinel handling. Pixel widths
    /// are not capped here: only the sample encodings of the Lab sides must
    /// be known, and the output encoding only matters in round-trip mode.
    pub fn new(input: FormatWord, output: FormatWord) -> Result<Option<Self>> {
        if !is_lab(input) {
            return Ok(None);
        }
        let in_sample = sample_of(Side::Input, input)?;
        let input_lab_bytes = LAB_CHANNELS * in_sample.bytes();

        let (mode, output_color_bytes, sentinel_output) = if is_lab(output) {
            let sample = sample_of(Side::Output, output)?;
            (
                SentinelMode::RoundTrip,
                LAB_CHANNELS * sample.bytes(),
                sentinel_pattern(sample),
            )
        } else {
            (SentinelMode::Correction, 0, [0; PATTERN_BYTES])
        };

        let legacy = input.color_space() == ColorSpace::LabV2;
        let profile = Self {
            encoding: SentinelEncoding::for_sample(in_sample),
            mode,
            input_stride: total_bytes(input),
            input_lab_bytes,
            neutral_black: neutral_black_pattern(in_sample, legacy),
            output_stride: total_bytes(output),
            output_color_bytes,
            sentinel_output,
        };
        debug!(
            "lab sentinel: {:?} profile, {:?} input, {} -> {} bytes/pixel",
            profile.mode, profile.encoding, profile.input_stride, profile.output_stride
        );
        Ok(Some(profile))
    }

    /// Profile from a transform's format words.
    pub fn from_transform<T: ColorTransform + ?Sized>(transform: &T) -> Result<Option<Self>> {
        Self::new(transform.input_format(), transform.output_format())
    }

    /// Sentinel recogniser for the input.
    pub fn encoding(&self) -> SentinelEncoding {
        self.encoding
    }

    /// Round-trip or correction.
    pub fn mode(&self) -> SentinelMode {
        self.mode
    }

    /// Full input pixel size in bytes.
    pub fn input_stride(&self) -> usize {
        self.input_stride
    }

    /// Full output pixel size in bytes.
    pub fn output_stride(&self) -> usize {
        self.output_stride
    }

    /// Neutral black Lab bytes in the input encoding.
    pub fn neutral_black(&self) -> &[u8] {
        &self.neutral_black[..self.input_lab_bytes]
    }

    /// Sentinel Lab bytes in the output encoding (empty in correction mode).
    pub fn sentinel_output(&self) -> &[u8] {
        &self.sentinel_output[..self.output_color_bytes]
    }
}

fn is_lab(word: FormatWord) -> bool {
    word.color_space().is_lab() && word.channels() as usize >= LAB_CHANNELS
}

/// Colour plus extra channels, in bytes.
fn total_bytes(word: FormatWord) -> usize {
    (word.channels() + word.extra()) as usize * word.bytes_per_sample()
}

fn sample_of(side: Side, word: FormatWord) -> Result<SampleEncoding> {
    let bytes = word.bytes_per_sample();
    let float = word.is_float();
    SampleEncoding::from_parts(bytes, float).ok_or(ConfigurationError::UnsupportedSample {
        side,
        bytes,
        float,
    })
}

/// L = 0, a = b = 0 in `sample`. V2 16-bit Lab centres chroma at `0x8000`.
fn neutral_black_pattern(sample: SampleEncoding, legacy: bool) -> Pattern {
    let mut pattern = [0; PATTERN_BYTES];
    let width = sample.bytes();
    let chroma = &mut pattern[width..LAB_CHANNELS * width];
    match sample {
        SampleEncoding::U8 => chroma.fill(0x80),
        SampleEncoding::U16 => {
            let value: u16 = if legacy { 0x8000 } else { 0x8080 };
            for c in chroma.chunks_exact_mut(2) {
                c.copy_from_slice(&value.to_ne_bytes());
            }
        }
        SampleEncoding::U32 => {
            let value: u32 = if legacy { 0x8000_0000 } else { 0x8080_8080 };
            for c in chroma.chunks_exact_mut(4) {
                c.copy_from_slice(&value.to_ne_bytes());
            }
        }
        SampleEncoding::F16 | SampleEncoding::F32 | SampleEncoding::F64 => {}
    }
    pattern
}

/// The sentinel in `sample`: all-zero bytes for integers, `[0, -128, -128]` for floats.
fn sentinel_pattern(sample: SampleEncoding) -> Pattern {
    let mut pattern = [0; PATTERN_BYTES];
    if sample.is_float() {
        let width = sample.bytes();
        for c in pattern[width..LAB_CHANNELS * width].chunks_exact_mut(width) {
            sample.write_float(-128.0, c);
        }
    }
    pattern
}

/// What a sentinel-aware call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SentinelStats {
    /// Sentinel pixels found in the input.
    pub sentinel_count: usize,
    /// Handling applied, `None` when no sentinel was found or checked.
    pub applied: Option<SentinelMode>,
    /// Stats from the transform that ran underneath.
    pub transform: TransformStats,
}

impl SentinelStats {
    fn passthrough(transform: TransformStats) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }
}

impl GuardContext {
    /// Sentinel handling in front of [`do_transform_adaptive`](Self::do_transform_adaptive).
    ///
    /// Without a profile this is exactly the adaptive call. In correction
    /// mode every sentinel pixel in `input` is overwritten with neutral
    /// black before conversion.
    pub fn do_transform_sentinel<T: ColorTransform + ?Sized>(
        &self,
        profile: Option<&SentinelProfile>,
        transform: &T,
        input: &mut [u8],
        output: &mut [u8],
        pixel_count: usize,
    ) -> SentinelStats {
        let Some(profile) = profile else {
            let stats = self.do_transform_adaptive(transform, input, output, pixel_count);
            return SentinelStats::passthrough(stats);
        };
        if pixel_count == 0 {
            return SentinelStats::default();
        }
        check_buffer("input", input.len(), pixel_count, profile.input_stride);

        let handled = with_flags(pixel_count, |flags| {
            let count = self.classifier.mark_sentinels(
                profile.encoding,
                profile.input_stride,
                input,
                pixel_count,
                flags,
            );
            if count == 0 {
                let stats = self.do_transform_adaptive(transform, input, output, pixel_count);
                return SentinelStats::passthrough(stats);
            }
            trace!("lab sentinel: {count}/{pixel_count} marked, {:?}", profile.mode);

            let transform_stats = match profile.mode {
                SentinelMode::RoundTrip => {
                    let stats = self.do_transform_adaptive(transform, input, output, pixel_count);
                    check_buffer("output", output.len(), pixel_count, profile.output_stride);
                    stamp_flagged(flags, output, profile.output_stride, profile.sentinel_output());
                    stats
                }
                SentinelMode::Correction => {
                    stamp_flagged(flags, input, profile.input_stride, profile.neutral_black());
                    self.do_transform_adaptive(transform, input, output, pixel_count)
                }
            };
            SentinelStats {
                sentinel_count: count,
                applied: Some(profile.mode),
                transform: transform_stats,
            }
        });

        match handled {
            Some(stats) => stats,
            None => {
                let stats = self.do_transform_adaptive(transform, input, output, pixel_count);
                SentinelStats::passthrough(stats)
            }
        }
    }
}

simd_multiversion! {
    /// Copy `pattern` to the start of every flagged pixel in `buffer`.
    fn stamp_flagged(flags: &[u8], buffer: &mut [u8], stride: usize, pattern: &[u8]) {
        for (pixel, &flag) in buffer.chunks_exact_mut(stride).zip(flags) {
            if flag != 0 {
                pixel[..pattern.len()].copy_from_slice(pattern);
            }
        }
    }
}

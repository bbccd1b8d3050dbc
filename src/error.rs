//! Registration errors.
//!
//! Only configuration problems are errors. A missing cache entry or a failed
//! scratch allocation is a normal branch that falls back to the plain
//! transform and is reported through [`TransformStats`](crate::TransformStats).

use core::fmt;

/// Which side of a transform a format belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The input (source) buffer format.
    Input,
    /// The output (destination) buffer format.
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Input => f.write_str("input"),
            Side::Output => f.write_str("output"),
        }
    }
}

/// A pixel format that cannot be cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Channel count outside `1..=8`.
    #[error("{side} channel count {channels} is outside 1..=8")]
    ChannelCount {
        /// Offending side.
        side: Side,
        /// Declared channel count.
        channels: u32,
    },

    /// A pixel wider than the fixed reference buffer.
    #[error(
        "{side} pixel is {bytes} bytes, exceeding the {cap}-byte reference buffer",
        cap = crate::format::PATTERN_BYTES
    )]
    PixelTooWide {
        /// Offending side.
        side: Side,
        /// Computed bytes per pixel.
        bytes: usize,
    },

    /// Sample width / float combination with no defined data range.
    #[error("{side} sample encoding of {bytes} bytes (float: {float}) is not supported")]
    UnsupportedSample {
        /// Offending side.
        side: Side,
        /// Bytes per sample after decoding the width code.
        bytes: usize,
        /// Whether the format declared floating point samples.
        float: bool,
    },
}

/// Result alias for registration.
pub type Result<T, E = ConfigurationError> = core::result::Result<T, E>;

//! Boundary-pixel caching and Lab mask sentinel handling for colour transforms.
//!
//! Colour conversions through an ICC engine are expensive per pixel, but a
//! large share of real buffers (masks, separations, blank margins) consists of
//! pixels at the very edge of the data range: all channels zero, or all at
//! the encoding maximum. This crate precomputes the external transform's
//! answer for those two pixels once per transform and substitutes it, so only
//! interior pixels reach the engine. Output is always identical to running
//! the transform on its own.
//!
//! It also handles the Lab "mask" sentinel (L = 0, a = b = -128), restoring
//! it through Lab → Lab conversions and neutralising it before Lab → other
//! conversions.
//!
//! # Module Organization
//!
//! - [`format`] - packed format words and per-encoding boundary patterns
//! - [`cache`] - precomputed boundary responses per transform
//! - [`scalar`] / [`simd`] - per-pixel and 4-pixel batched detectors
//! - [`GuardContext`] - owns the cache and exposes every entry point
//! - [`GuardedTransform`] - per-transform lifecycle wrapper
//!
//! # Quick Start
//!
//! ```rust
//! use boundary_guard::{FnTransform, FormatWord, GuardContext, TransformId};
//!
//! let rgb8 = FormatWord::new().with_channels(3).with_bytes(1);
//! let invert = FnTransform::new(TransformId(1), rgb8, rgb8, |src: &[u8], dst: &mut [u8]| {
//!     for (d, s) in dst.iter_mut().zip(src) {
//!         *d = 255 - s;
//!     }
//! });
//!
//! let mut ctx = GuardContext::new();
//! ctx.register(&invert)?;
//!
//! let input = [0, 0, 0, 12, 34, 56, 255, 255, 255];
//! let mut output = [0u8; 9];
//! let stats = ctx.do_transform(&invert, &input, &mut output, 3);
//!
//! assert_eq!(output, [255, 255, 255, 243, 221, 199, 0, 0, 0]);
//! assert_eq!(stats.transformed_count, 1);
//! assert_eq!(stats.boundary_count(), 2);
//! # Ok::<(), boundary_guard::ConfigurationError>(())
//! ```
//!
//! # Choosing the Right Entry Point
//!
//! | Use Case | Method |
//! |----------|--------|
//! | Always classify | [`GuardContext::do_transform`] |
//! | Classify only large, boundary-heavy buffers | [`GuardContext::do_transform_adaptive`] |
//! | Lab inputs that may carry the mask sentinel | [`GuardContext::do_transform_sentinel`] |
//! | All of the above, per transform | [`GuardedTransform::apply`] |
//!
//! # Configuration
//!
//! [`GuardConfig::from_env`] reads `BOUNDARY_GUARD_MIN_PIXELS`,
//! `BOUNDARY_GUARD_SAMPLE_SIZE` and `BOUNDARY_GUARD_FORCE_SCALAR`.

#![warn(missing_docs)]

// ============================================================================
// Internal modules
// ============================================================================

mod targets;

mod adaptive;
mod classifier;
mod config;
mod context;
mod error;
mod flags;
mod guarded;
mod pipeline;
mod sentinel;
mod transform;

// ============================================================================
// Public modules
// ============================================================================

/// Boundary response cache.
pub mod cache;

/// Packed format words, sample encodings and reference patterns.
pub mod format;

/// Single-pixel boundary and sentinel checks.
pub mod scalar;

/// 4-pixel batched detectors built on `wide`.
pub mod simd;

// ============================================================================
// Re-exports
// ============================================================================

pub use cache::{BoundaryCacheEntry, CACHE_CAPACITY, CacheStore};
pub use classifier::Classifier;
pub use config::{
    DEFAULT_MIN_PIXELS, DEFAULT_SAMPLE_SIZE, ENV_FORCE_SCALAR, ENV_MIN_PIXELS, ENV_SAMPLE_SIZE,
    GuardConfig, STACK_FLAGS,
};
pub use context::GuardContext;
pub use error::{ConfigurationError, Result, Side};
pub use format::{ColorSpace, FormatWord, PixelFormat, SampleEncoding};
pub use guarded::{BULK_DENOMINATOR, BULK_NUMERATOR, TransformStats};
pub use pipeline::GuardedTransform;
pub use scalar::Boundary;
pub use sentinel::{SentinelEncoding, SentinelMode, SentinelProfile, SentinelStats};
pub use transform::{ColorTransform, FnTransform, TransformId};

// ============================================================================
// Tests
// ============================================================================

//! Per-transform wrapper tying the pieces together.
//!
//! A [`GuardedTransform`] is what a colour engine hands out instead of the
//! bare transform: construction precomputes the sentinel profile and (when
//! clamping is enabled) the boundary cache entry, [`apply`](GuardedTransform::apply)
//! runs sentinel handling, the adaptive gate and the guarded transform in
//! that order, and [`release`](GuardedTransform::release) drops the cache
//! entry again.

use crate::context::GuardContext;
use crate::error::Result;
use crate::sentinel::{SentinelProfile, SentinelStats};
use crate::transform::ColorTransform;

/// An external transform plus its precomputed guard state.
#[derive(Debug)]
pub struct GuardedTransform<T> {
    transform: T,
    sentinel: Option<SentinelProfile>,
    clamping: bool,
}

impl<T: ColorTransform> GuardedTransform<T> {
    /// Wrap `transform`, registering its boundary responses in `ctx` when
    /// `clamping` is enabled.
    ///
    /// Fails when a Lab side has no known sample encoding, or when clamping
    /// is enabled and the cache rejects either format. Nothing is registered
    /// in that case. With clamping disabled only the sentinel profile is
    /// built, so outputs wider than a cache pattern are accepted.
    pub fn new(ctx: &mut GuardContext, transform: T, clamping: bool) -> Result<Self> {
        let sentinel = SentinelProfile::from_transform(&transform)?;
        if clamping {
            ctx.register(&transform)?;
        }
        Ok(Self {
            transform,
            sentinel,
            clamping,
        })
    }

    /// Convert `pixel_count` pixels.
    ///
    /// Lab sentinels in `input` may be rewritten in place (see
    /// [`GuardContext::do_transform_sentinel`]).
    pub fn apply(
        &self,
        ctx: &GuardContext,
        input: &mut [u8],
        output: &mut [u8],
        pixel_count: usize,
    ) -> SentinelStats {
        ctx.do_transform_sentinel(
            self.sentinel.as_ref(),
            &self.transform,
            input,
            output,
            pixel_count,
        )
    }

    /// Remove the cache entry from `ctx` and hand back the transform.
    pub fn release(self, ctx: &mut GuardContext) -> T {
        if self.clamping {
            ctx.release(self.transform.id());
        }
        self.transform
    }

    /// The wrapped transform.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Sentinel profile, present for Lab inputs.
    pub fn sentinel(&self) -> Option<&SentinelProfile> {
        self.sentinel.as_ref()
    }

    /// Whether boundary clamping is enabled.
    pub fn clamping(&self) -> bool {
        self.clamping
    }
}

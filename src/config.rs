//! Tuning knobs for the guarded and adaptive paths.
//!
//! Defaults are fixed constants. [`GuardConfig::from_env`] overlays
//! environment variables; all env parsing goes through the helpers at the
//! bottom of this module so the truthy/positive rules live in one place.

/// Buffers smaller than this skip the adaptive path entirely (2 megapixels).
pub const DEFAULT_MIN_PIXELS: usize = 2_000_000;

/// Leading pixels sampled by the adaptive gate.
pub const DEFAULT_SAMPLE_SIZE: usize = 256;

/// Flag arrays up to this many pixels live on the stack.
pub const STACK_FLAGS: usize = 16_384;

/// Env var overriding [`GuardConfig::min_pixels`].
pub const ENV_MIN_PIXELS: &str = "BOUNDARY_GUARD_MIN_PIXELS";
/// Env var overriding [`GuardConfig::sample_size`].
pub const ENV_SAMPLE_SIZE: &str = "BOUNDARY_GUARD_SAMPLE_SIZE";
/// Env var forcing the scalar classifier.
pub const ENV_FORCE_SCALAR: &str = "BOUNDARY_GUARD_FORCE_SCALAR";

/// Thresholds for [`GuardContext`](crate::GuardContext).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardConfig {
    /// Minimum buffer size (pixels) before the adaptive gate samples.
    pub min_pixels: usize,
    /// Number of leading pixels the adaptive gate inspects. The gate always
    /// inspects at least one.
    pub sample_size: usize,
    /// Use the scalar classifier even when vector instructions exist.
    pub force_scalar: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_pixels: DEFAULT_MIN_PIXELS,
            sample_size: DEFAULT_SAMPLE_SIZE,
            force_scalar: false,
        }
    }
}

impl GuardConfig {
    /// Defaults overlaid with any `BOUNDARY_GUARD_*` environment variables.
    ///
    /// Invalid or non-positive numbers are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(min_pixels) = env_var_positive_usize(ENV_MIN_PIXELS) {
            config.min_pixels = min_pixels;
        }
        if let Some(sample_size) = env_var_positive_usize(ENV_SAMPLE_SIZE) {
            config.sample_size = sample_size;
        }
        config.force_scalar = env_var_truthy(ENV_FORCE_SCALAR);
        config
    }

    /// Set the adaptive size threshold.
    pub fn with_min_pixels(mut self, pixels: usize) -> Self {
        self.min_pixels = pixels;
        self
    }

    /// Set the adaptive sample size. Zero is raised to one.
    pub fn with_sample_size(mut self, pixels: usize) -> Self {
        self.sample_size = pixels.max(1);
        self
    }

    /// Force the scalar classifier.
    pub fn with_force_scalar(mut self, force: bool) -> Self {
        self.force_scalar = force;
        self
    }
}

/// `true` when `var_name` is `1`, `true`, `yes` or `on` (case-insensitive, trimmed).
#[inline]
pub(crate) fn env_var_truthy(var_name: &str) -> bool {
    std::env::var(var_name)
        .map(|raw| parse_truthy(&raw))
        .unwrap_or(false)
}

/// `Some` only for a valid integer greater than zero.
#[inline]
pub(crate) fn env_var_positive_usize(var_name: &str) -> Option<usize> {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| parse_positive(&raw))
}

fn parse_truthy(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|value| *value > 0)
}

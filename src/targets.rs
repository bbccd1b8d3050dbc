//! SIMD target definitions for multiversion dispatch.
//!
//! The hot byte loops (re-stamping cached outputs, stamping sentinel
//! patterns) are plain slice copies that the compiler vectorizes well once
//! wider instructions are enabled. Wrapping them in `simd_multiversion!`
//! compiles one clone per target and dispatches at runtime.

// ============================================================================
// x86/x86_64
// ============================================================================

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
macro_rules! simd_multiversion {
    ($($item:tt)*) => {
        #[multiversion::multiversion(targets(
            // x86-64-v3 (Haswell 2013+, Zen 2019+)
            "x86_64+avx+avx2+bmi1+bmi2+popcnt",
            // x86-64-v2
            "x86_64+sse3+ssse3+sse4.1+sse4.2+popcnt",
        ))]
        $($item)*
    };
}

// ============================================================================
// aarch64
// ============================================================================

#[cfg(target_arch = "aarch64")]
macro_rules! simd_multiversion {
    ($($item:tt)*) => {
        #[multiversion::multiversion(targets(
            // aarch64 baseline (all ARM64)
            "aarch64+neon",
        ))]
        $($item)*
    };
}

// ============================================================================
// Fallback for other architectures (no multiversioning)
// ============================================================================

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
macro_rules! simd_multiversion {
    ($($item:tt)*) => {
        $($item)*
    };
}

pub(crate) use simd_multiversion;

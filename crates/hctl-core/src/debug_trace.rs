#![forbid(unsafe_code)]

//! Debug tracing controlled by environment variable.
//!
//! Set `HCTL_DEBUG_TRACE=1` to print controller transitions to stderr without
//! installing a `tracing` subscriber. When disabled (the default) the check is
//! a single static bool load.
//!
//! ```ignore
//! hctl_core::debug_trace!("palette query={:?}", query);
//! ```

use std::sync::LazyLock;
use std::time::Instant;

static DEBUG_TRACE_ENABLED: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("HCTL_DEBUG_TRACE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Whether `HCTL_DEBUG_TRACE` enabled tracing.
#[inline]
pub fn is_enabled() -> bool {
    *DEBUG_TRACE_ENABLED
}

/// Milliseconds since first use.
#[inline]
pub fn elapsed_ms() -> u64 {
    START_TIME.elapsed().as_millis() as u64
}

/// Print a timestamped line to stderr when `HCTL_DEBUG_TRACE=1`.
#[macro_export]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        if $crate::debug_trace::is_enabled() {
            eprintln!(
                "[HCTL {:>8}ms] {}",
                $crate::debug_trace::elapsed_ms(),
                format_args!($($arg)*)
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let t1 = elapsed_ms();
        let t2 = elapsed_ms();
        assert!(t2 >= t1);
    }

    #[test]
    fn macro_expands_when_disabled() {
        let _ = is_enabled();
        crate::debug_trace!("value={}", 1);
    }
}

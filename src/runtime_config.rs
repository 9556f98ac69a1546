//! # Runtime Configuration Module
//!
//! Environment-based settings for the coroutine runtime and the dispatcher.
//!
//! ## Environment Variables
//!
//! ### `BRRTFN_STACK_SIZE`
//!
//! Stack size for sink coroutines and HTTP connection handlers. Accepts
//! decimal (`65536`) or hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! ### `BRRTFN_DEBUG`
//!
//! When `1`, `true`, `yes` or `on`, every invocation taps its input and output
//! streams into the `brrtfn::tap` log target.
//!
//! ```rust
//! use brrtfn::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

/// Default coroutine stack size (64 KB)
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Tap element streams into debug logs
    pub debug: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            debug: false,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let stack_size = lookup("BRRTFN_STACK_SIZE")
            .and_then(|v| parse_stack_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        let debug = lookup("BRRTFN_DEBUG")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        RuntimeConfig { stack_size, debug }
    }
}

fn parse_stack_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    };
    parsed.filter(|size| *size > 0)
}

pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

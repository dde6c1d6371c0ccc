//! Wrapper configuration.
//!
//! The request id and the errno band belong to one particular kernel ABI, so
//! they are supplied by the integrator rather than fixed in code. Resolution
//! order:
//! 1. an override installed with [`configure`];
//! 2. environment variables, read once and cached:
//!    - `TRAPCALL_REQUEST`: request number, decimal or `0x` hex (default `128`);
//!    - `TRAPCALL_ERRNO_BAND`: `legacy` (default) or `linux`;
//!    - `TRAPCALL_ERRNO_SCOPE`: `thread` (default) or `process`.
//!
//! A malformed `TRAPCALL_REQUEST` is never replaced by the default: the error
//! is cached alongside the slot scope, [`current`] keeps returning it, and the
//! implicitly configured entrypoints fail with `EINVAL` without trapping.

use parking_lot::RwLock;
use thiserror::Error;

use crate::errno::{ErrnoSlot, ProcessErrno, ThreadErrno};
use crate::syscall::{DEFAULT_REQUEST, ErrnoBand};

pub const ENV_REQUEST: &str = "TRAPCALL_REQUEST";
pub const ENV_ERRNO_BAND: &str = "TRAPCALL_ERRNO_BAND";
pub const ENV_ERRNO_SCOPE: &str = "TRAPCALL_ERRNO_SCOPE";

/// Which slot failures are recorded in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotScope {
    /// One slot per thread.
    #[default]
    Thread,
    /// One slot for the whole process; concurrent failures race.
    Process,
}

impl SlotScope {
    /// Parse from string (case-insensitive). Unknown values map to `Thread`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "process" | "global" | "shared" => Self::Process,
            _ => Self::Thread,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thread => "thread",
            Self::Process => "process",
        }
    }

    /// Record `code` in the slot this scope selects.
    pub fn record(self, code: i32) {
        match self {
            Self::Thread => ThreadErrno.set(code),
            Self::Process => ProcessErrno.set(code),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid request number '{value}'")]
    InvalidRequest { var: &'static str, value: String },
}

/// Everything the wrapper needs to know about the target ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperConfig {
    pub request: u32,
    pub band: ErrnoBand,
    pub scope: SlotScope,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            request: DEFAULT_REQUEST,
            band: ErrnoBand::default(),
            scope: SlotScope::default(),
        }
    }
}

impl WrapperConfig {
    #[must_use]
    pub fn with_request(mut self, request: u32) -> Self {
        self.request = request;
        self
    }

    #[must_use]
    pub fn with_band(mut self, band: ErrnoBand) -> Self {
        self.band = band;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: SlotScope) -> Self {
        self.scope = scope;
        self
    }

    /// Build from a variable lookup. Missing variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_REQUEST) {
            cfg.request = parse_request(&raw).ok_or(ConfigError::InvalidRequest {
                var: ENV_REQUEST,
                value: raw,
            })?;
        }
        if let Some(raw) = lookup(ENV_ERRNO_BAND) {
            cfg.band = ErrnoBand::from_str_loose(&raw);
        }
        if let Some(raw) = lookup(ENV_ERRNO_SCOPE) {
            cfg.scope = SlotScope::from_str_loose(&raw);
        }
        Ok(cfg)
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Parse a request number: decimal, or hex with a `0x` prefix.
#[must_use]
pub fn parse_request(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[derive(Debug, Clone)]
struct Resolved {
    config: Result<WrapperConfig, ConfigError>,
    // Parsed on its own so a bad request id still reports in the right slot.
    scope: SlotScope,
}

static OVERRIDE: RwLock<Option<WrapperConfig>> = parking_lot::const_rwlock(None);
static CACHED_ENV: RwLock<Option<Resolved>> = parking_lot::const_rwlock(None);

/// Install a process-wide configuration that takes precedence over the
/// environment.
pub fn configure(cfg: WrapperConfig) {
    *OVERRIDE.write() = Some(cfg);
}

/// Drop the override and the cached environment lookup.
pub fn reset() {
    *OVERRIDE.write() = None;
    *CACHED_ENV.write() = None;
}

fn resolve<F>(lookup: F) -> Resolved
where
    F: Fn(&str) -> Option<String>,
{
    let scope = lookup(ENV_ERRNO_SCOPE)
        .map(|raw| SlotScope::from_str_loose(&raw))
        .unwrap_or_default();
    Resolved {
        config: WrapperConfig::from_lookup(lookup),
        scope,
    }
}

/// Replace the cached environment resolution with one read from `lookup`.
///
/// [`current`] resolves the process environment this way on first use. An
/// installed override still wins.
pub fn load_from<F>(lookup: F) -> Result<WrapperConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let resolved = resolve(lookup);
    let config = resolved.config.clone();
    *CACHED_ENV.write() = Some(resolved);
    config
}

fn cached() -> Resolved {
    if let Some(resolved) = CACHED_ENV.read().clone() {
        return resolved;
    }
    let resolved = resolve(|name| std::env::var(name).ok());
    CACHED_ENV.write().get_or_insert(resolved).clone()
}

/// The configuration in effect for implicitly configured calls.
///
/// A malformed environment stays an error until [`reset`], [`configure`] or
/// [`load_from`] replaces it.
pub fn current() -> Result<WrapperConfig, ConfigError> {
    if let Some(cfg) = *OVERRIDE.read() {
        return Ok(cfg);
    }
    cached().config
}

/// The slot scope in effect, even when [`current`] is an error.
#[must_use]
pub fn current_scope() -> SlotScope {
    if let Some(cfg) = *OVERRIDE.read() {
        return cfg.scope;
    }
    cached().scope
}

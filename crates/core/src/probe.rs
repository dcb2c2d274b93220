//! Probe outcome model and best-effort latency extraction.
//!
//! A probe outcome is ephemeral: produced once per attempt, consumed by
//! the sweep's reconciliation step, then discarded. Timeouts and spawn
//! faults are data here, not errors -- a sweep must keep going no matter
//! what a single probe reports.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Error string used for hard probe timeouts, so logs and summaries can
/// tell expected timeouts apart from spawn faults.
pub const TIMEOUT_ERROR: &str = "timeout";

/// Result of one reachability check against one host.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub reachable: bool,
    /// Round-trip latency in milliseconds. Absent when the probe output
    /// could not be parsed; that is a normal outcome, not a failure.
    pub latency_ms: Option<f64>,
    /// Fault description for unreachable probes, when one is known.
    pub error: Option<String>,
}

impl ProbeOutcome {
    /// A successful probe, with latency if the output yielded one.
    pub fn reachable(latency_ms: Option<f64>) -> Self {
        Self {
            reachable: true,
            latency_ms,
            error: None,
        }
    }

    /// An unreachable host (non-zero ping exit, no fault).
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            latency_ms: None,
            error: None,
        }
    }

    /// The probe hit its hard timeout.
    pub fn timed_out() -> Self {
        Self {
            reachable: false,
            latency_ms: None,
            error: Some(TIMEOUT_ERROR.to_string()),
        }
    }

    /// The probe could not execute (spawn failure, permissions, ...).
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            reachable: false,
            latency_ms: None,
            error: Some(error.into()),
        }
    }

    /// True when the probe hit its hard timeout.
    pub fn is_timeout(&self) -> bool {
        self.error.as_deref() == Some(TIMEOUT_ERROR)
    }
}

fn latency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches "time=0.045 ms" (iputils), "time=10.0 ms" (busybox),
    // "time=12ms" and "time<1ms" (windows).
    RE.get_or_init(|| {
        Regex::new(r"time[=<]\s*([0-9]+(?:\.[0-9]+)?)\s*ms").expect("latency regex is valid")
    })
}

/// Extract round-trip latency in milliseconds from ping output.
///
/// Best-effort across ping dialects; returns `None` for anything
/// unrecognized rather than failing the probe.
pub fn parse_latency_ms(output: &str) -> Option<f64> {
    let caps = latency_re().captures(output)?;
    caps.get(1)?.as_str().parse().ok()
}

//! Reachability probing via the system `ping`.
//!
//! [`Prober`] is the seam: the sweep engine takes a trait object so tests
//! can script outcomes without touching the network. [`PingProber`] is
//! the production implementation -- one ICMP echo per call, a bounded
//! network wait, and a hard process timeout on top.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use hostfleet_core::probe::{parse_latency_ms, ProbeOutcome};

/// Default network wait passed to ping itself.
pub const DEFAULT_NET_TIMEOUT: Duration = Duration::from_secs(1);

/// Hard ceiling on the whole probe, ping process included.
pub const DEFAULT_HARD_TIMEOUT: Duration = Duration::from_secs(5);

/// One reachability check against one address.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Never returns an error: timeouts and execution faults are encoded
    /// in the outcome so a sweep can keep going.
    async fn probe(&self, ip_address: &str, net_timeout: Duration) -> ProbeOutcome;
}

/// System-`ping` prober.
#[derive(Debug, Clone)]
pub struct PingProber {
    program: String,
    hard_timeout: Duration,
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new(DEFAULT_HARD_TIMEOUT)
    }
}

impl PingProber {
    pub fn new(hard_timeout: Duration) -> Self {
        Self {
            program: "ping".to_string(),
            hard_timeout,
        }
    }

    /// Override the probe binary. Lets tests exercise spawn failures.
    #[cfg(test)]
    fn with_program(program: &str, hard_timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            hard_timeout,
        }
    }

    /// Build the single-echo ping invocation for the target platform.
    /// Selected at compile time; callers never branch on platform.
    #[cfg(unix)]
    fn command(&self, ip_address: &str, net_timeout: Duration) -> Command {
        let mut cmd = Command::new(&self.program);
        // -W takes whole seconds; round sub-second waits up to 1.
        let secs = net_timeout.as_secs().max(1);
        cmd.arg("-c")
            .arg("1")
            .arg("-W")
            .arg(secs.to_string())
            .arg(ip_address);
        cmd
    }

    #[cfg(windows)]
    fn command(&self, ip_address: &str, net_timeout: Duration) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-n")
            .arg("1")
            .arg("-w")
            .arg(net_timeout.as_millis().to_string())
            .arg(ip_address);
        cmd
    }
}

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self, ip_address: &str, net_timeout: Duration) -> ProbeOutcome {
        let mut cmd = self.command(ip_address, net_timeout);
        cmd.kill_on_drop(true);

        let result = tokio::time::timeout(self.hard_timeout, cmd.output()).await;
        match result {
            Err(_) => ProbeOutcome::timed_out(),
            Ok(Err(e)) => ProbeOutcome::failed(format!("failed to run ping: {e}")),
            Ok(Ok(output)) => {
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    ProbeOutcome::reachable(parse_latency_ms(&stdout))
                } else {
                    ProbeOutcome::unreachable()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Loopback should answer a real ping. Requires a `ping` binary and
    /// ICMP permission, so ignored by default.
    #[tokio::test]
    #[ignore]
    async fn loopback_is_reachable() {
        let prober = PingProber::default();
        let outcome = prober.probe("127.0.0.1", DEFAULT_NET_TIMEOUT).await;
        assert!(outcome.reachable, "outcome: {outcome:?}");
    }

    /// A spawn failure must surface as a failed outcome, not a panic.
    #[tokio::test]
    async fn spawn_failure_is_reported_in_outcome() {
        let prober =
            PingProber::with_program("definitely-not-a-real-binary-7f3a", DEFAULT_HARD_TIMEOUT);
        let outcome = prober.probe("127.0.0.1", DEFAULT_NET_TIMEOUT).await;
        assert!(!outcome.reachable);
        assert!(!outcome.is_timeout(), "spawn faults are not timeouts");
        assert!(outcome.error.is_some());
    }
}

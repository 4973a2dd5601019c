//! Reachability probing over an ordered candidate list.
//!
//! The echo primitive is injected: [`find_reachable`] takes any async
//! closure, [`find_reachable_with`] adapts an [`EchoProbe`] port to it.

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use mncreach_common::{
    config::ProbeSettings,
    debug,
    network::{hop::CandidateList, ip, reach::ReachabilityResult},
    ports::EchoProbe,
};

/// Probes candidates in list order and returns the first that answers.
///
/// Every candidate gets up to `attempts_per_candidate` probes (at least one).
/// Placeholder addresses and addresses already probed earlier in the list are
/// skipped without sending anything.
pub async fn find_reachable<F, Fut>(
    candidates: &CandidateList,
    attempts_per_candidate: u32,
    timeout_per_attempt: Duration,
    mut probe: F,
) -> ReachabilityResult
where
    F: FnMut(IpAddr, Duration) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut attempted: Vec<IpAddr> = Vec::new();

    for record in candidates {
        let addr = record.address;
        if ip::is_placeholder(&addr) {
            debug!("Skipping placeholder hop {} ({addr})", record.hop_index);
            continue;
        }
        if attempted.contains(&addr) {
            continue;
        }

        attempted.push(addr);
        if answers_within(addr, attempts_per_candidate, timeout_per_attempt, &mut probe).await {
            debug!("Hop {} ({addr}) answered", record.hop_index);
            return ReachabilityResult::found(addr, attempted);
        }
    }

    ReachabilityResult::none(attempted)
}

/// [`find_reachable`] driven by an [`EchoProbe`] and the run's settings.
pub async fn find_reachable_with(
    candidates: &CandidateList,
    settings: &ProbeSettings,
    prober: &dyn EchoProbe,
) -> ReachabilityResult {
    find_reachable(
        candidates,
        settings.attempts_per_candidate,
        settings.probe_timeout,
        |addr, timeout| prober.probe(addr, timeout),
    )
    .await
}

/// Whether a single address answers within the configured attempts.
pub async fn answers(addr: IpAddr, settings: &ProbeSettings, prober: &dyn EchoProbe) -> bool {
    let mut probe = |addr: IpAddr, timeout: Duration| prober.probe(addr, timeout);
    answers_within(
        addr,
        settings.attempts_per_candidate,
        settings.probe_timeout,
        &mut probe,
    )
    .await
}

async fn answers_within<F, Fut>(addr: IpAddr, attempts: u32, timeout: Duration, probe: &mut F) -> bool
where
    F: FnMut(IpAddr, Duration) -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 1..=attempts.max(1) {
        if probe(addr, timeout).await {
            return true;
        }
        debug!("Echo attempt {attempt} to {addr} got no reply");
    }
    false
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

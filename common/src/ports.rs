//! # Outbound Ports
//!
//! Contracts for everything the enrichers need from the outside world:
//! running a trace, sending an echo probe, resolving names and looking up
//! the origin AS of an address.
//!
//! ## Rules
//! 1. All items here are traits; implementations live in `mncreach-protocols`
//!    (live network) or in test code (stubs).
//! 2. None of them fail. A tool that is missing, errors or times out is
//!    reported as "no result" (empty text, `false`, empty list, `None`).

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::network::{asn::AsInfo, family::AddressFamily};

/// Produces the multi-hop report for a domain.
#[async_trait]
pub trait TraceSource: Send + Sync {
    /// Returns the raw report text, or an empty string when the trace could
    /// not be run.
    async fn trace(
        &self,
        domain: &str,
        family: AddressFamily,
        max_hops: u8,
        probes_per_hop: u16,
    ) -> String;
}

/// Sends a single ICMP echo request.
#[async_trait]
pub trait EchoProbe: Send + Sync {
    /// `true` if any reply arrived within `timeout`. The echo mechanism is
    /// picked from the address family of `addr`.
    async fn probe(&self, addr: IpAddr, timeout: Duration) -> bool;
}

/// Forward lookups (A / AAAA).
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// All addresses of `domain` in the given family, in resolver order.
    async fn resolve(&self, domain: &str, family: AddressFamily) -> Vec<IpAddr>;
}

/// Origin AS lookups for an address.
#[async_trait]
pub trait AsnDirectory: Send + Sync {
    async fn lookup(&self, addr: IpAddr) -> Option<AsInfo>;
}

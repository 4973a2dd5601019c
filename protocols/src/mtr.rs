//! Multi-hop reports from `mtr`.
//!
//! The tool runs in report mode with AS lookups on and name resolution off,
//! so every hop line carries a hop index, an `AS<n>` token and a literal
//! address:
//!
//! ```text
//!   1. AS???    192.168.178.1        0.0%    10    0.6   0.6   0.5   0.7   0.1
//!   2. AS3320   62.155.242.1         0.0%    10    5.4   5.9   5.0   8.0   0.8
//! ```

use std::time::Duration;

use async_trait::async_trait;
use mncreach_common::{
    debug,
    network::{domain::DomainName, family::AddressFamily},
    ports::TraceSource,
    warn,
};

use crate::command;

const MTR_BINARY: &str = "mtr";

pub struct MtrTracer {
    binary: String,
    trace_timeout: Duration,
}

impl MtrTracer {
    pub fn new(trace_timeout: Duration) -> Self {
        Self {
            binary: MTR_BINARY.to_string(),
            trace_timeout,
        }
    }

    /// Uses a different executable, e.g. an absolute path.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

/// Argument list for one report run against `domain`.
pub fn report_args(
    domain: &DomainName,
    family: AddressFamily,
    max_hops: u8,
    probes_per_hop: u16,
) -> Vec<String> {
    let family_flag = match family {
        AddressFamily::V4 => "-4",
        AddressFamily::V6 => "-6",
    };
    vec![
        "--report-wide".to_string(),
        "--aslookup".to_string(),
        "--no-dns".to_string(),
        "--report-cycles".to_string(),
        probes_per_hop.max(1).to_string(),
        "--max-ttl".to_string(),
        max_hops.max(1).to_string(),
        family_flag.to_string(),
        domain.as_str().to_string(),
    ]
}

#[async_trait]
impl TraceSource for MtrTracer {
    async fn trace(
        &self,
        domain: &str,
        family: AddressFamily,
        max_hops: u8,
        probes_per_hop: u16,
    ) -> String {
        let domain: DomainName = match domain.parse() {
            Ok(domain) => domain,
            Err(e) => {
                warn!("Skipping trace: {e}");
                return String::new();
            }
        };

        let args = report_args(&domain, family, max_hops, probes_per_hop);
        match command::run(&self.binary, &args, self.trace_timeout).await {
            Ok(output) => {
                debug!(
                    "{family} trace to {domain} finished in {:.1}s",
                    output.duration.as_secs_f64()
                );
                if !output.stderr.trim().is_empty() {
                    debug!("mtr reported for {domain}: {}", output.stderr.trim());
                }
                output.stdout
            }
            Err(e) => {
                warn!("{family} trace to {domain} failed: {e}");
                String::new()
            }
        }
    }
}

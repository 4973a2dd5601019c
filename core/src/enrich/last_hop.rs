//! Last responsive hop, without AS filtering and without probing.
//!
//! Writes the deepest hop that answered the trace to `alternative_ip`. IPv4
//! is traced first; IPv6 only when the IPv4 trace had no responsive hop.

use async_trait::async_trait;
use mncreach_common::{
    config::ProbeSettings,
    info,
    network::family::AddressFamily,
    ports::TraceSource,
    success,
};

use super::{RowEnricher, RowOutcome, column};
use crate::{hops, table::Row};

pub struct LastHopEnricher {
    tracer: Box<dyn TraceSource>,
    settings: ProbeSettings,
}

impl LastHopEnricher {
    pub fn new(tracer: Box<dyn TraceSource>, settings: ProbeSettings) -> Self {
        Self { tracer, settings }
    }
}

#[async_trait]
impl RowEnricher for LastHopEnricher {
    fn name(&self) -> &'static str {
        "last-hop"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[column::VOWIFI, column::PINGABLE, column::DOMAIN]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[column::ALTERNATIVE_IP]
    }

    async fn enrich(&self, row: &mut Row<'_>) -> RowOutcome {
        if row.int(column::VOWIFI) != 1 || row.int(column::PINGABLE) != 0 {
            return RowOutcome::Skipped;
        }
        if !row.is_blank(column::ALTERNATIVE_IP) {
            return RowOutcome::AlreadyDone;
        }

        let domain = row.get(column::DOMAIN).trim().to_string();
        if domain.is_empty() {
            return RowOutcome::NotFound;
        }

        info!("Tracing {domain}");
        for family in AddressFamily::ALL {
            let raw_text = self
                .tracer
                .trace(
                    &domain,
                    family,
                    self.settings.max_hops,
                    self.settings.probes_per_hop,
                )
                .await;

            let mut responsive = hops::parse_responsive(&raw_text);
            responsive.retain_family(family);
            if let Some(hop) = responsive.iter().next() {
                success!("{domain}: last responsive hop is {} (hop {})", hop.address, hop.hop_index);
                row.set(column::ALTERNATIVE_IP, hop.address.to_string());
                return RowOutcome::Enriched;
            }
        }

        info!("{domain}: no responsive hop");
        RowOutcome::NotFound
    }
}

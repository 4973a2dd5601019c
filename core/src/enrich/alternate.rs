//! Alternate address discovery for operators whose ePDG does not answer echo
//! requests.
//!
//! The ePDG domain is traced once per address family, the hops inside the
//! operator's AS are collected deepest hop first and the first one that answers a
//! ping is written to `ip4` / `ip6`. When nothing answers and the RCS config
//! domain lives in the same AS, that domain is tried the same way.

use std::net::IpAddr;

use async_trait::async_trait;
use mncreach_common::{
    config::ProbeSettings,
    info,
    network::{family::AddressFamily, hop::DiagnosticRun},
    ports::{EchoProbe, TraceSource},
    success,
};

use super::{RowEnricher, RowOutcome, column, same_as};
use crate::{hops, prober, table::Row};

const FAMILY_COLUMNS: [(AddressFamily, &str); 2] =
    [(AddressFamily::V4, column::IP4), (AddressFamily::V6, column::IP6)];

/// A domain to trace together with the AS its hops must belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TraceTarget {
    domain: String,
    as_number: String,
}

pub struct AlternateEnricher {
    tracer: Box<dyn TraceSource>,
    prober: Box<dyn EchoProbe>,
    settings: ProbeSettings,
}

impl AlternateEnricher {
    pub fn new(
        tracer: Box<dyn TraceSource>,
        prober: Box<dyn EchoProbe>,
        settings: ProbeSettings,
    ) -> Self {
        Self {
            tracer,
            prober,
            settings,
        }
    }

    /// The ePDG domain first, then the RCS domain when it qualifies.
    fn targets(row: &Row<'_>) -> Vec<TraceTarget> {
        let mut targets = Vec::new();

        let as_domain = row.get(column::AS_NUM_DOMAIN).trim();
        if !row.is_blank(column::DOMAIN) && !as_domain.is_empty() {
            targets.push(TraceTarget {
                domain: row.get(column::DOMAIN).trim().to_string(),
                as_number: as_domain.to_string(),
            });
        }

        let rcs_qualifies = row.int(column::RCS) == 1
            && row.int(column::RCS_PINGABLE) == 0
            && same_as(row.get(column::AS_NUM_RCS).trim(), as_domain);
        if rcs_qualifies && !row.is_blank(column::RCS_DOMAIN) {
            targets.push(TraceTarget {
                domain: row.get(column::RCS_DOMAIN).trim().to_string(),
                as_number: row.get(column::AS_NUM_RCS).trim().to_string(),
            });
        }

        targets
    }

    /// Traces `target` in `family` and probes the AS-matching hops.
    async fn discover(&self, target: &TraceTarget, family: AddressFamily) -> Option<IpAddr> {
        let raw_text = self
            .tracer
            .trace(
                &target.domain,
                family,
                self.settings.max_hops,
                self.settings.probes_per_hop,
            )
            .await;

        let run = DiagnosticRun {
            target_domain: target.domain.clone(),
            address_family: family,
            raw_text,
        };
        let candidates = hops::candidates(&run, &target.as_number);
        if candidates.is_empty() {
            info!(
                "No {family} hops in AS{} on the way to {}",
                target.as_number, target.domain
            );
            return None;
        }

        let result =
            prober::find_reachable_with(&candidates, &self.settings, self.prober.as_ref()).await;
        if result.address.is_none() {
            info!(
                "None of {} {family} hops of {} answered",
                result.attempted.len(),
                target.domain
            );
        }
        result.address
    }
}

#[async_trait]
impl RowEnricher for AlternateEnricher {
    fn name(&self) -> &'static str {
        "alternate"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[
            column::VOWIFI,
            column::PINGABLE,
            column::DOMAIN,
            column::AS_NUM_DOMAIN,
        ]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[column::IP4, column::IP6]
    }

    async fn enrich(&self, row: &mut Row<'_>) -> RowOutcome {
        if row.int(column::VOWIFI) != 1 || row.int(column::PINGABLE) != 0 {
            return RowOutcome::Skipped;
        }

        let pending: Vec<(AddressFamily, &str)> = FAMILY_COLUMNS
            .into_iter()
            .filter(|(_, name)| row.is_blank(name))
            .collect();
        if pending.is_empty() {
            return RowOutcome::AlreadyDone;
        }

        let targets = Self::targets(row);
        if targets.is_empty() {
            info!("Line {}: no domain with a known AS to trace", row.line());
            return RowOutcome::NotFound;
        }

        let mut outcome = RowOutcome::NotFound;
        for (family, name) in pending {
            for target in &targets {
                if let Some(addr) = self.discover(target, family).await {
                    success!("{}: {family} alternate is {addr}", target.domain);
                    row.set(name, addr.to_string());
                    outcome = RowOutcome::Enriched;
                    break;
                }
            }
        }
        outcome
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

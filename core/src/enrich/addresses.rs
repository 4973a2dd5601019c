//! Fills `ip4` / `ip6` from DNS for VoWiFi operators.
//!
//! A pingable ePDG domain is resolved directly. An ePDG that does not answer
//! pings falls back to the RCS config domain when that one answers and sits
//! in the same AS. All addresses of a family are kept, joined with `;`.

use std::net::IpAddr;

use async_trait::async_trait;
use mncreach_common::{
    debug,
    network::family::AddressFamily,
    ports::NameResolver,
    success,
};

use super::{RowEnricher, RowOutcome, column, same_as};
use crate::table::Row;

pub struct AddressEnricher {
    resolver: Box<dyn NameResolver>,
}

impl AddressEnricher {
    pub fn new(resolver: Box<dyn NameResolver>) -> Self {
        Self { resolver }
    }

    /// Domain whose addresses belong in this row, if any.
    fn source_domain(row: &Row<'_>) -> Option<String> {
        let source = match row.int(column::PINGABLE) {
            1 => column::DOMAIN,
            0 if row.int(column::RCS_PINGABLE) == 1
                && same_as(row.get(column::AS_NUM_DOMAIN), row.get(column::AS_NUM_RCS)) =>
            {
                column::RCS_DOMAIN
            }
            _ => return None,
        };

        let domain = row.get(source).trim();
        (!domain.is_empty()).then(|| domain.to_string())
    }
}

fn join(addrs: &[IpAddr]) -> String {
    addrs
        .iter()
        .map(IpAddr::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

#[async_trait]
impl RowEnricher for AddressEnricher {
    fn name(&self) -> &'static str {
        "addresses"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[column::VOWIFI, column::PINGABLE, column::DOMAIN]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[column::IP4, column::IP6]
    }

    async fn enrich(&self, row: &mut Row<'_>) -> RowOutcome {
        if row.int(column::VOWIFI) != 1 {
            return RowOutcome::Skipped;
        }
        let Some(domain) = Self::source_domain(row) else {
            return RowOutcome::Skipped;
        };
        if !row.is_blank(column::IP4) && !row.is_blank(column::IP6) {
            return RowOutcome::AlreadyDone;
        }

        let mut outcome = RowOutcome::NotFound;
        for (family, name) in [(AddressFamily::V4, column::IP4), (AddressFamily::V6, column::IP6)] {
            if !row.is_blank(name) {
                continue;
            }
            let addrs = self.resolver.resolve(&domain, family).await;
            if addrs.is_empty() {
                debug!("{domain} has no {family} address");
                continue;
            }
            let joined = join(&addrs);
            success!("{domain}: {family} {joined}");
            row.set(name, joined);
            outcome = RowOutcome::Enriched;
        }
        outcome
    }
}

//! Origin AS number and name of the ePDG and RCS config domains.

use std::net::IpAddr;

use async_trait::async_trait;
use mncreach_common::{
    debug, info,
    network::family::AddressFamily,
    ports::{AsnDirectory, NameResolver},
    success,
};

use super::{RowEnricher, RowOutcome, column};
use crate::table::Row;

/// Columns that drive one lookup: the service flag, the domain and the two
/// columns the result goes into.
struct Service {
    flag: &'static str,
    domain: &'static str,
    as_num: &'static str,
    as_name: &'static str,
}

const SERVICES: [Service; 2] = [
    Service {
        flag: column::VOWIFI,
        domain: column::DOMAIN,
        as_num: column::AS_NUM_DOMAIN,
        as_name: column::AS_NAME_DOMAIN,
    },
    Service {
        flag: column::RCS,
        domain: column::RCS_DOMAIN,
        as_num: column::AS_NUM_RCS,
        as_name: column::AS_NAME_RCS,
    },
];

pub struct AsnEnricher {
    resolver: Box<dyn NameResolver>,
    directory: Box<dyn AsnDirectory>,
}

impl AsnEnricher {
    pub fn new(resolver: Box<dyn NameResolver>, directory: Box<dyn AsnDirectory>) -> Self {
        Self {
            resolver,
            directory,
        }
    }

    /// First address of `domain`, IPv4 preferred.
    async fn first_address(&self, domain: &str) -> Option<IpAddr> {
        for family in AddressFamily::ALL {
            if let Some(addr) = self.resolver.resolve(domain, family).await.into_iter().next() {
                return Some(addr);
            }
        }
        None
    }
}

#[async_trait]
impl RowEnricher for AsnEnricher {
    fn name(&self) -> &'static str {
        "asn"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[column::VOWIFI, column::DOMAIN]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[
            column::AS_NUM_DOMAIN,
            column::AS_NAME_DOMAIN,
            column::AS_NUM_RCS,
            column::AS_NAME_RCS,
        ]
    }

    async fn enrich(&self, row: &mut Row<'_>) -> RowOutcome {
        let mut outcome = RowOutcome::Skipped;

        for service in &SERVICES {
            if row.int(service.flag) != 1 {
                continue;
            }
            if !row.is_blank(service.as_num) {
                if outcome == RowOutcome::Skipped {
                    outcome = RowOutcome::AlreadyDone;
                }
                continue;
            }
            if outcome != RowOutcome::Enriched {
                outcome = RowOutcome::NotFound;
            }

            let domain = row.get(service.domain).trim().to_string();
            if domain.is_empty() {
                continue;
            }

            info!("Looking up the origin AS of {domain}");
            let Some(addr) = self.first_address(&domain).await else {
                debug!("{domain} does not resolve");
                continue;
            };
            let Some(info) = self.directory.lookup(addr).await else {
                info!("No origin AS for {domain} ({addr})");
                continue;
            };

            success!("{domain}: AS{} {}", info.number, info.name);
            row.set(service.as_num, info.number);
            if row.is_blank(service.as_name) {
                row.set(service.as_name, info.name);
            }
            outcome = RowOutcome::Enriched;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::tests::run;
    use mncreach_common::network::asn::AsInfo;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    struct StubDns;

    #[async_trait]
    impl NameResolver for StubDns {
        async fn resolve(&self, domain: &str, family: AddressFamily) -> Vec<IpAddr> {
            match (domain, family) {
                ("epdg.example", AddressFamily::V4) => vec!["192.0.2.1".parse().unwrap()],
                ("rcs.example", AddressFamily::V6) => vec!["2001:db8::7".parse().unwrap()],
                _ => Vec::new(),
            }
        }
    }

    #[derive(Default)]
    struct StubDirectory {
        asked: Arc<Mutex<Vec<IpAddr>>>,
    }

    #[async_trait]
    impl AsnDirectory for StubDirectory {
        async fn lookup(&self, addr: IpAddr) -> Option<AsInfo> {
            self.asked.lock().unwrap().push(addr);
            match addr.to_string().as_str() {
                "192.0.2.1" => Some(AsInfo::new("64500", "EXAMPLE-NET, ZZ")),
                "2001:db8::7" => Some(AsInfo::new("64501", "")),
                _ => None,
            }
        }
    }

    fn enricher() -> (AsnEnricher, Arc<Mutex<Vec<IpAddr>>>) {
        let directory = StubDirectory::default();
        let asked = directory.asked.clone();
        (AsnEnricher::new(Box::new(StubDns), Box::new(directory)), asked)
    }

    #[tokio::test]
    async fn both_services_are_looked_up() {
        let (enricher, _) = enricher();
        let input = "vowifi;domain;rcs;rcs_domain\n1;epdg.example;1;rcs.example\n";

        let (out, summary) = run(&enricher, input).await;

        assert_eq!(
            out,
            "vowifi;domain;rcs;rcs_domain;as_num_domain;as_name_domain;as_num_rcs;as_name_rcs\n\
             1;epdg.example;1;rcs.example;64500;EXAMPLE-NET, ZZ;64501;\n"
        );
        assert_eq!(summary.enriched, 1);
    }

    #[tokio::test]
    async fn known_numbers_are_not_looked_up_again() {
        let (enricher, asked) = enricher();
        let input = "vowifi;domain;as_num_domain;as_name_domain\n1;epdg.example;3320;DTAG\n";

        let (out, summary) = run(&enricher, input).await;

        assert!(out.ends_with("1;epdg.example;3320;DTAG;;\n"));
        assert_eq!(summary.already_done, 1);
        assert!(asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn inactive_services_are_skipped() {
        let (enricher, asked) = enricher();
        let input = "vowifi;domain;rcs;rcs_domain\n0;epdg.example;0;rcs.example\n";

        let (_, summary) = run(&enricher, input).await;

        assert_eq!(summary.skipped, 1);
        assert!(asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unresolvable_domain_is_not_found() {
        let (enricher, asked) = enricher();
        let input = "vowifi;domain\n1;gone.example\n";

        let (out, summary) = run(&enricher, input).await;

        assert!(out.ends_with("1;gone.example;;;;\n"));
        assert_eq!(summary.not_found, 1);
        assert!(asked.lock().unwrap().is_empty());
    }
}

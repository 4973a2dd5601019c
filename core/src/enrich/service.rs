//! VoWiFi (ePDG) and RCS availability checks.
//!
//! The well-known service domain is derived from the row's MCC / MNC. The
//! service flag is 1 when the domain resolves; the first resolved address is
//! then pinged for the `*pingable` column, which stays blank otherwise.

use async_trait::async_trait;
use mncreach_common::{
    config::ProbeSettings,
    debug, info,
    network::{domain::ServiceDomain, family::AddressFamily},
    ports::{EchoProbe, NameResolver},
    success,
};

use super::{RowEnricher, RowOutcome, column};
use crate::{prober, table::Row};

pub struct ServiceEnricher {
    service: ServiceDomain,
    resolver: Box<dyn NameResolver>,
    prober: Box<dyn EchoProbe>,
    settings: ProbeSettings,
}

impl ServiceEnricher {
    pub fn new(
        service: ServiceDomain,
        resolver: Box<dyn NameResolver>,
        prober: Box<dyn EchoProbe>,
        settings: ProbeSettings,
    ) -> Self {
        Self {
            service,
            resolver,
            prober,
            settings,
        }
    }

    pub fn vowifi(
        resolver: Box<dyn NameResolver>,
        prober: Box<dyn EchoProbe>,
        settings: ProbeSettings,
    ) -> Self {
        Self::new(ServiceDomain::Epdg, resolver, prober, settings)
    }

    pub fn rcs(
        resolver: Box<dyn NameResolver>,
        prober: Box<dyn EchoProbe>,
        settings: ProbeSettings,
    ) -> Self {
        Self::new(ServiceDomain::RcsConfig, resolver, prober, settings)
    }

    /// (flag, pingable, domain) columns of this service.
    fn columns(&self) -> (&'static str, &'static str, &'static str) {
        match self.service {
            ServiceDomain::Epdg => (column::VOWIFI, column::PINGABLE, column::DOMAIN),
            ServiceDomain::RcsConfig => (column::RCS, column::RCS_PINGABLE, column::RCS_DOMAIN),
        }
    }
}

#[async_trait]
impl RowEnricher for ServiceEnricher {
    fn name(&self) -> &'static str {
        match self.service {
            ServiceDomain::Epdg => "vowifi",
            ServiceDomain::RcsConfig => "rcs",
        }
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[column::MCC, column::MNC]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        match self.service {
            ServiceDomain::Epdg => &[column::VOWIFI, column::PINGABLE, column::DOMAIN],
            ServiceDomain::RcsConfig => &[column::RCS, column::RCS_PINGABLE, column::RCS_DOMAIN],
        }
    }

    async fn enrich(&self, row: &mut Row<'_>) -> RowOutcome {
        let (flag, pingable, domain_column) = self.columns();
        if !row.is_blank(flag) {
            return RowOutcome::AlreadyDone;
        }

        let Some(domain) = self.service.for_operator(row.get(column::MCC), row.get(column::MNC))
        else {
            debug!(
                "Line {}: no usable MCC/MNC ({:?}/{:?})",
                row.line(),
                row.get(column::MCC),
                row.get(column::MNC)
            );
            return RowOutcome::Skipped;
        };
        if row.is_blank(domain_column) {
            row.set(domain_column, domain.to_string());
        }

        let mut addrs = self.resolver.resolve(domain.as_str(), AddressFamily::V4).await;
        if addrs.is_empty() {
            addrs = self.resolver.resolve(domain.as_str(), AddressFamily::V6).await;
        }
        let Some(first) = addrs.first().copied() else {
            info!("{domain} does not resolve");
            row.set(flag, "0");
            return RowOutcome::NotFound;
        };
        row.set(flag, "1");

        if row.is_blank(pingable) {
            let answered = prober::answers(first, &self.settings, self.prober.as_ref()).await;
            row.set(pingable, if answered { "1" } else { "0" });
            if answered {
                success!("{domain} ({first}) answers");
            } else {
                info!("{domain} resolves to {first} but does not answer");
            }
        }
        RowOutcome::Enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::tests::run;
    use pretty_assertions::assert_eq;
    use std::net::IpAddr;
    use std::time::Duration;

    const EPDG: &str = "epdg.epc.mnc001.mcc262.pub.3gppnetwork.org";
    const RCS: &str = "config.rcs.mnc002.mcc262.pub.3gppnetwork.org";

    struct StubDns;

    #[async_trait]
    impl NameResolver for StubDns {
        async fn resolve(&self, domain: &str, family: AddressFamily) -> Vec<IpAddr> {
            match (domain, family) {
                (EPDG, AddressFamily::V4) => vec!["192.0.2.10".parse().unwrap()],
                (RCS, AddressFamily::V6) => vec!["2001:db8::10".parse().unwrap()],
                _ => Vec::new(),
            }
        }
    }

    struct StubPing(bool);

    #[async_trait]
    impl EchoProbe for StubPing {
        async fn probe(&self, _: IpAddr, _: Duration) -> bool {
            self.0
        }
    }

    fn settings() -> ProbeSettings {
        ProbeSettings { attempts_per_candidate: 1, ..ProbeSettings::default() }
    }

    #[tokio::test]
    async fn resolving_and_answering_epdg_is_flagged() {
        let enricher = ServiceEnricher::vowifi(Box::new(StubDns), Box::new(StubPing(true)), settings());
        let input = "MCC;MNC\n262;01\n262;99\n";

        let (out, summary) = run(&enricher, input).await;

        assert_eq!(
            out,
            format!(
                "MCC;MNC;vowifi;pingable;domain\n262;01;1;1;{EPDG}\n\
                 262;99;0;;epdg.epc.mnc099.mcc262.pub.3gppnetwork.org\n"
            )
        );
        assert_eq!(summary.enriched, 1);
        assert_eq!(summary.not_found, 1);
    }

    #[tokio::test]
    async fn rcs_falls_back_to_aaaa_and_records_silence() {
        let enricher = ServiceEnricher::rcs(Box::new(StubDns), Box::new(StubPing(false)), settings());
        let input = "MCC;MNC\n262;2\n";

        let (out, _) = run(&enricher, input).await;

        assert_eq!(out, format!("MCC;MNC;rcs;rcs_pingable;rcs_domain\n262;2;1;0;{RCS}\n"));
    }

    #[tokio::test]
    async fn rows_with_a_flag_are_not_checked_again() {
        let enricher = ServiceEnricher::vowifi(Box::new(StubDns), Box::new(StubPing(false)), settings());
        let input = "MCC;MNC;vowifi;pingable;domain\n262;01;1;1;custom.example\n";

        let (out, summary) = run(&enricher, input).await;

        assert_eq!(out, input);
        assert_eq!(summary.already_done, 1);
    }

    #[tokio::test]
    async fn non_numeric_codes_are_skipped() {
        let enricher = ServiceEnricher::vowifi(Box::new(StubDns), Box::new(StubPing(true)), settings());
        let (out, summary) = run(&enricher, "MCC;MNC\n262;n/a\n").await;

        assert_eq!(out, "MCC;MNC;vowifi;pingable;domain\n262;n/a;;;\n");
        assert_eq!(summary.skipped, 1);
    }
}

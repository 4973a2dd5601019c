use mncreach_common::config::Config;
use mncreach_core::enrich::{AddressEnricher, AsnEnricher};
use mncreach_protocols::{CymruDirectory, DnsResolver};

use super::run::run;

pub async fn addresses(cfg: &Config) -> anyhow::Result<()> {
    let enricher = AddressEnricher::new(Box::new(DnsResolver::new()));
    run(&enricher, cfg).await
}

pub async fn asn(cfg: &Config) -> anyhow::Result<()> {
    let enricher = AsnEnricher::new(Box::new(DnsResolver::new()), Box::new(CymruDirectory::new()));
    run(&enricher, cfg).await
}

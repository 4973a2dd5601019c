use mncreach_common::config::Config;
use mncreach_core::enrich::ServiceEnricher;
use mncreach_protocols::{DnsResolver, SystemPing};

use super::{run::run, trace::preflight};

pub async fn vowifi(cfg: &Config) -> anyhow::Result<()> {
    preflight(&["ping"]);
    let enricher = ServiceEnricher::vowifi(Box::new(DnsResolver::new()), Box::new(SystemPing), cfg.probe);
    run(&enricher, cfg).await
}

pub async fn rcs(cfg: &Config) -> anyhow::Result<()> {
    preflight(&["ping"]);
    let enricher = ServiceEnricher::rcs(Box::new(DnsResolver::new()), Box::new(SystemPing), cfg.probe);
    run(&enricher, cfg).await
}

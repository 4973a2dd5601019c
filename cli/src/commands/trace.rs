use mncreach_common::{config::Config, warn};
use mncreach_core::enrich::{AlternateEnricher, LastHopEnricher};
use mncreach_protocols::{MtrTracer, SystemPing};

use super::run::run;

/// Warns about helper tools that are not on `PATH`. The run goes on: every
/// failed invocation is treated as "no result".
pub fn preflight(tools: &[&str]) {
    for tool in tools {
        if which::which(tool).is_err() {
            warn!("'{tool}' was not found on PATH, its results will stay blank");
        }
    }
}

pub async fn alternate(cfg: &Config) -> anyhow::Result<()> {
    preflight(&["mtr", "ping"]);
    let enricher = AlternateEnricher::new(
        Box::new(MtrTracer::new(cfg.probe.trace_timeout)),
        Box::new(SystemPing),
        cfg.probe,
    );
    run(&enricher, cfg).await
}

pub async fn last_hop(cfg: &Config) -> anyhow::Result<()> {
    preflight(&["mtr"]);
    let enricher = LastHopEnricher::new(Box::new(MtrTracer::new(cfg.probe.trace_timeout)), cfg.probe);
    run(&enricher, cfg).await
}

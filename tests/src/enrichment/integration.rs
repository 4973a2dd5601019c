#![cfg(test)]
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mncreach_common::config::ProbeSettings;
use mncreach_common::error::EnrichError;
use mncreach_common::network::family::AddressFamily;
use mncreach_core::enrich::{
    self, AddressEnricher, AlternateEnricher, AsnEnricher, EnrichSummary, LastHopEnricher,
    RowEnricher, ServiceEnricher,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::stubs::{StubDirectory, StubDns, StubPing, StubTrace};

const EPDG_01: &str = "epdg.epc.mnc001.mcc262.pub.3gppnetwork.org";
const RCS_01: &str = "config.rcs.mnc001.mcc262.pub.3gppnetwork.org";
const EPDG_02: &str = "epdg.epc.mnc002.mcc262.pub.3gppnetwork.org";

const EPDG_01_TRACE: &str = "\
Start: 2026-10-19T09:12:44+0200
HOST: probe-host                     Loss%   Snt   Last   Avg  Best  Wrst StDev
  1.|-- AS???    192.168.178.1          0.0%    10    0.6   0.6   0.5   0.7   0.1
  2.|-- AS3320   62.155.242.1           0.0%    10    5.4   5.9   5.0   8.0   0.8
  3.|-- AS64500  198.51.100.7          10.0%    10   30.2  31.0  29.8  33.1   1.1
  4.|-- AS64500  198.51.100.9         100.0%    10    0.0   0.0   0.0   0.0   0.0
";

fn settings() -> ProbeSettings {
    ProbeSettings {
        attempts_per_candidate: 2,
        probe_timeout: Duration::from_millis(10),
        ..ProbeSettings::default()
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }

    /// Runs `enricher` from `input` into `output`, both names in this workspace.
    async fn step(&self, enricher: &dyn RowEnricher, input: &str, output: &str) -> EnrichSummary {
        enrich::enrich_file(
            &self.path(input),
            &self.path(output),
            enricher,
            Duration::from_secs(5),
            None,
        )
        .await
        .unwrap()
    }
}

fn column<'a>(csv: &'a str, line: usize, name: &str) -> &'a str {
    let mut lines = csv.lines();
    let header: Vec<&str> = lines.next().unwrap().split(';').collect();
    let pos = header.iter().position(|h| *h == name).unwrap();
    csv.lines().nth(line).unwrap().split(';').nth(pos).unwrap()
}

#[tokio::test]
async fn alternate_address_for_the_documented_example() {
    let ws = Workspace::new();
    ws.write(
        "mcc-mnc.csv",
        "vowifi;pingable;domain;as_num_domain\n1;0;x.example;64500\n0;0;y.example;64500\n",
    );
    let trace = StubTrace::default().with(
        "x.example",
        AddressFamily::V4,
        "1. AS64500 10.0.0.1\n2. AS64501 10.0.0.2\n3. AS64500 10.0.0.3\n",
    );
    let ping = StubPing::answering(&["10.0.0.1"]);
    let probed = ping.probed.clone();

    let enricher = AlternateEnricher::new(Box::new(trace), Box::new(ping), settings());
    let summary = ws.step(&enricher, "mcc-mnc.csv", "mcc-mnc_updated.csv").await;

    assert_eq!(
        ws.read("mcc-mnc_updated.csv"),
        "vowifi;pingable;domain;as_num_domain;ip4;ip6\n\
         1;0;x.example;64500;10.0.0.1;\n\
         0;0;y.example;64500;;\n"
    );
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.enriched, 1);
    // 10.0.0.3 is tried first and gets every attempt before 10.0.0.1.
    let probed: Vec<String> = probed.lock().unwrap().iter().map(|a| a.to_string()).collect();
    assert_eq!(probed, vec!["10.0.0.3", "10.0.0.3", "10.0.0.1"]);
}

#[tokio::test]
async fn utilities_chain_through_the_listing() {
    let ws = Workspace::new();
    ws.write("step0.csv", "MCC;MNC;Operator\n262;01;Alpha\n262;2;Beta\n262;07;Gamma\n");

    let dns = || {
        StubDns::default()
            .with(EPDG_01, AddressFamily::V4, &["198.51.100.20"])
            .with(EPDG_01, AddressFamily::V6, &["2001:db8::20"])
            .with(RCS_01, AddressFamily::V4, &["198.51.100.30"])
            .with(EPDG_02, AddressFamily::V4, &["203.0.113.5", "203.0.113.6"])
    };

    let vowifi = ServiceEnricher::vowifi(
        Box::new(dns()),
        Box::new(StubPing::answering(&["203.0.113.5"])),
        settings(),
    );
    ws.step(&vowifi, "step0.csv", "step1.csv").await;

    let rcs = ServiceEnricher::rcs(Box::new(dns()), Box::new(StubPing::answering(&[])), settings());
    ws.step(&rcs, "step1.csv", "step2.csv").await;

    let asn = AsnEnricher::new(
        Box::new(dns()),
        Box::new(
            StubDirectory::default()
                .with("198.51.100.20", "64500", "ALPHA-NET, DE")
                .with("198.51.100.30", "64500", "ALPHA-NET, DE")
                .with("203.0.113.5", "64510", "BETA-NET, DE"),
        ),
    );
    ws.step(&asn, "step2.csv", "step3.csv").await;

    let addresses = AddressEnricher::new(Box::new(dns()));
    ws.step(&addresses, "step3.csv", "step4.csv").await;

    let trace = StubTrace::default().with(EPDG_01, AddressFamily::V4, EPDG_01_TRACE);
    let alternate = AlternateEnricher::new(
        Box::new(trace.clone()),
        Box::new(StubPing::answering(&["198.51.100.7"])),
        settings(),
    );
    ws.step(&alternate, "step4.csv", "step5.csv").await;

    let last_hop = LastHopEnricher::new(Box::new(trace), settings());
    ws.step(&last_hop, "step5.csv", "step6.csv").await;

    let out = ws.read("step6.csv");
    assert_eq!(
        out.lines().next(),
        Some(
            "MCC;MNC;Operator;vowifi;pingable;domain;rcs;rcs_pingable;rcs_domain;\
             as_num_domain;as_name_domain;as_num_rcs;as_name_rcs;ip4;ip6;alternative_ip"
        )
    );

    // Alpha: ePDG resolves but does not answer; its AS hop does.
    assert_eq!(column(&out, 1, "vowifi"), "1");
    assert_eq!(column(&out, 1, "pingable"), "0");
    assert_eq!(column(&out, 1, "rcs"), "1");
    assert_eq!(column(&out, 1, "as_num_domain"), "64500");
    assert_eq!(column(&out, 1, "as_name_rcs"), "ALPHA-NET, DE");
    assert_eq!(column(&out, 1, "ip4"), "198.51.100.7");
    assert_eq!(column(&out, 1, "alternative_ip"), "198.51.100.7");

    // Beta: ePDG answers, so both of its addresses are listed.
    assert_eq!(column(&out, 2, "pingable"), "1");
    assert!(out.lines().nth(2).unwrap().contains("\"203.0.113.5;203.0.113.6\""));

    // Gamma: nothing resolves.
    assert_eq!(column(&out, 3, "vowifi"), "0");
    assert_eq!(column(&out, 3, "pingable"), "");
    assert_eq!(column(&out, 3, "domain"), "epdg.epc.mnc007.mcc262.pub.3gppnetwork.org");
}

#[tokio::test]
async fn second_run_over_its_own_output_changes_nothing() {
    let ws = Workspace::new();
    ws.write(
        "first.csv",
        "vowifi;pingable;domain;as_num_domain\n1;0;x.example;AS64500\n1;0;z.example;64500\n",
    );
    let trace = StubTrace::default()
        .with("x.example", AddressFamily::V4, "1. AS64500 10.0.0.1\n")
        .with("x.example", AddressFamily::V6, "1. AS64500 2001:db8::1\n");
    let ping = StubPing::answering(&["10.0.0.1", "2001:db8::1"]);

    let enricher = AlternateEnricher::new(Box::new(trace.clone()), Box::new(ping), settings());
    ws.step(&enricher, "first.csv", "second.csv").await;
    let calls_after_first = trace.calls.lock().unwrap().len();

    let summary = ws.step(&enricher, "second.csv", "third.csv").await;

    assert_eq!(ws.read("second.csv"), ws.read("third.csv"));
    assert_eq!(summary.already_done, 1);
    // Only z.example, which found nothing, is traced again.
    let calls = trace.calls.lock().unwrap();
    assert!(calls[calls_after_first..].iter().all(|domain| domain == "z.example"));
}

#[tokio::test]
async fn missing_input_leaves_no_output() {
    let ws = Workspace::new();
    let enricher = AddressEnricher::new(Box::new(StubDns::default()));

    let err = enrich::enrich_file(
        &ws.path("mcc-mnc.csv"),
        &ws.path("mcc-mnc_updated.csv"),
        &enricher,
        Duration::from_secs(5),
        None,
    )
    .await
    .unwrap_err();

    assert!(err.is_input_problem());
    assert!(matches!(err, EnrichError::InputFileMissing(_)));
    assert!(!Path::new(&ws.path("mcc-mnc_updated.csv")).exists());
}

#[tokio::test]
async fn listing_without_required_columns_keeps_previous_output() {
    let ws = Workspace::new();
    ws.write("mcc-mnc.csv", "MCC;MNC\n262;01\n");
    ws.write("mcc-mnc_updated.csv", "previous result\n");
    let enricher = LastHopEnricher::new(Box::new(StubTrace::default()), settings());

    let err = enrich::enrich_file(
        &ws.path("mcc-mnc.csv"),
        &ws.path("mcc-mnc_updated.csv"),
        &enricher,
        Duration::from_secs(5),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EnrichError::MissingColumn(_)));
    assert_eq!(ws.read("mcc-mnc_updated.csv"), "previous result\n");
}

#[tokio::test]
async fn header_only_listing_produces_header_only_output() {
    let ws = Workspace::new();
    ws.write("mcc-mnc.csv", "MCC;MNC\n");
    let vowifi = ServiceEnricher::vowifi(
        Box::new(StubDns::default()),
        Box::new(StubPing::default()),
        settings(),
    );

    let summary = ws.step(&vowifi, "mcc-mnc.csv", "mcc-mnc_updated.csv").await;

    assert_eq!(summary, EnrichSummary::default());
    assert_eq!(ws.read("mcc-mnc_updated.csv"), "MCC;MNC;vowifi;pingable;domain\n");
}

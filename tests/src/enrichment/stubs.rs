use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mncreach_common::network::{asn::AsInfo, family::AddressFamily};
use mncreach_common::ports::{AsnDirectory, EchoProbe, NameResolver, TraceSource};

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

/// Canned trace reports keyed by domain and family. Unknown domains trace to
/// an empty report, like a missing `mtr`.
#[derive(Default, Clone)]
pub struct StubTrace {
    reports: HashMap<(String, AddressFamily), String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl StubTrace {
    pub fn with(mut self, domain: &str, family: AddressFamily, report: &str) -> Self {
        self.reports.insert((domain.to_string(), family), report.to_string());
        self
    }
}

#[async_trait]
impl TraceSource for StubTrace {
    async fn trace(&self, domain: &str, family: AddressFamily, _: u8, _: u16) -> String {
        self.calls.lock().unwrap().push(domain.to_string());
        self.reports
            .get(&(domain.to_string(), family))
            .cloned()
            .unwrap_or_default()
    }
}

/// Answers only for the listed addresses and records every probe.
#[derive(Default, Clone)]
pub struct StubPing {
    answering: Vec<IpAddr>,
    pub probed: Arc<Mutex<Vec<IpAddr>>>,
}

impl StubPing {
    pub fn answering(addrs: &[&str]) -> Self {
        Self {
            answering: addrs.iter().map(|a| ip(a)).collect(),
            probed: Arc::default(),
        }
    }
}

#[async_trait]
impl EchoProbe for StubPing {
    async fn probe(&self, addr: IpAddr, _: Duration) -> bool {
        self.probed.lock().unwrap().push(addr);
        self.answering.contains(&addr)
    }
}

#[derive(Default)]
pub struct StubDns {
    records: HashMap<(String, AddressFamily), Vec<IpAddr>>,
}

impl StubDns {
    pub fn with(mut self, domain: &str, family: AddressFamily, addrs: &[&str]) -> Self {
        self.records
            .insert((domain.to_string(), family), addrs.iter().map(|a| ip(a)).collect());
        self
    }
}

#[async_trait]
impl NameResolver for StubDns {
    async fn resolve(&self, domain: &str, family: AddressFamily) -> Vec<IpAddr> {
        self.records
            .get(&(domain.to_string(), family))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct StubDirectory {
    entries: HashMap<IpAddr, AsInfo>,
}

impl StubDirectory {
    pub fn with(mut self, addr: &str, number: &str, name: &str) -> Self {
        self.entries.insert(ip(addr), AsInfo::new(number, name));
        self
    }
}

#[async_trait]
impl AsnDirectory for StubDirectory {
    async fn lookup(&self, addr: IpAddr) -> Option<AsInfo> {
        self.entries.get(&addr).cloned()
    }
}

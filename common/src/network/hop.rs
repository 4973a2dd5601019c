//! # Hop Model
//!
//! Records extracted from the text report of a multi-hop trace, and the
//! ordered list of them handed to the reachability prober.

use std::net::IpAddr;

use crate::network::family::AddressFamily;

/// One router reported by a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopRecord {
    /// Position in the path, starting at 1.
    pub hop_index: u16,
    /// Origin AS as plain digits, without the `AS` prefix.
    pub as_number: Option<String>,
    pub address: IpAddr,
}

impl HopRecord {
    pub fn new(hop_index: u16, as_number: Option<String>, address: IpAddr) -> Self {
        Self {
            hop_index,
            as_number,
            address,
        }
    }
}

/// Raw output of one trace run, kept together with what produced it.
#[derive(Debug, Clone)]
pub struct DiagnosticRun {
    pub target_domain: String,
    pub address_family: AddressFamily,
    pub raw_text: String,
}

/// Hops in the order they should be probed (closest to the destination first).
///
/// A record is dropped on insertion when it repeats the hop index and
/// address of the record right before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    records: Vec<HopRecord>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: HopRecord) {
        if let Some(last) = self.records.last()
            && last.hop_index == record.hop_index
            && last.address == record.address
        {
            return;
        }
        self.records.push(record);
    }

    /// Keeps only candidates of the given family.
    pub fn retain_family(&mut self, family: AddressFamily) {
        self.records.retain(|record| family.matches(&record.address));
    }

    pub fn addresses(&self) -> Vec<IpAddr> {
        self.records.iter().map(|record| record.address).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HopRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<HopRecord> for CandidateList {
    fn from_iter<I: IntoIterator<Item = HopRecord>>(iter: I) -> Self {
        let mut list = CandidateList::new();
        for record in iter {
            list.push(record);
        }
        list
    }
}

impl IntoIterator for CandidateList {
    type Item = HopRecord;
    type IntoIter = std::vec::IntoIter<HopRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a HopRecord;
    type IntoIter = std::slice::Iter<'a, HopRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

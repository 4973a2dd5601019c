//! Hop extraction from multi-hop trace reports.
//!
//! Each line is classified on its own by a small tokenizer. A line is a hop
//! when it carries a hop index and an address literal; it may also carry an
//! `AS<digits>` annotation, a loss percentage and latencies. A bare number
//! only counts as the index when it precedes the address, so report columns
//! such as `Snt` are never taken for one; `3.` is an index anywhere on the
//! line. `mtr` tree decorations (`|--`) are ignored. Everything else is
//! skipped.
//!
//! Two policies build candidate lists from the classified lines, both by
//! descending hop index (reverse line order among equal indices) so the hop
//! closest to the destination comes first:
//! * [`parse`]: hops annotated with a given AS number.
//! * [`parse_responsive`]: hops that answered the trace, whatever their AS.

use std::cmp::Reverse;
use std::net::IpAddr;

use mncreach_common::network::{
    asn::strip_as_prefix,
    hop::{CandidateList, DiagnosticRun, HopRecord},
    ip,
};

/// Classification of one report line.
#[derive(Debug, Clone, PartialEq)]
pub enum HopLine {
    Hop(HopSample),
    Skip,
}

/// A hop line together with the response statistics printed next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct HopSample {
    pub record: HopRecord,
    pub loss_pct: Option<f32>,
    pub has_latency: bool,
}

impl HopSample {
    /// Whether the hop answered at least one trace probe.
    pub fn is_responsive(&self) -> bool {
        matches!(self.loss_pct, Some(loss) if loss < 100.0) || self.has_latency
    }
}

enum Token {
    Index { hop: u16, dotted: bool },
    As(Option<String>),
    Addr(IpAddr),
    Loss(f32),
    Latency,
    Other,
}

fn tokenize(token: &str) -> Token {
    if let Ok(addr) = token.parse::<IpAddr>() {
        return Token::Addr(addr);
    }

    if let Some(digits) = token.strip_prefix("AS") {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return Token::As(Some(digits.to_string()));
        }
        // `AS???`: the hop has no AS data.
        if digits.chars().all(|c| c == '?') {
            return Token::As(None);
        }
        return Token::Other;
    }

    if let Some(pct) = token.strip_suffix('%') {
        return pct.parse().map(Token::Loss).unwrap_or(Token::Other);
    }

    if let Some(ms) = token.strip_suffix("ms") {
        return match ms.parse::<f32>() {
            Ok(_) => Token::Latency,
            Err(_) => Token::Other,
        };
    }

    let (index, dotted) = match token.strip_suffix('.') {
        Some(index) => (index, true),
        None => (token, false),
    };
    if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
        return match index.parse::<u16>() {
            Ok(hop) if hop >= 1 => Token::Index { hop, dotted },
            _ => Token::Other,
        };
    }

    Token::Other
}

/// Classifies a single line of trace output.
pub fn classify(line: &str) -> HopLine {
    let cleaned = line.replace("|--", " ").replace(['`', '|'], " ");

    let mut hop_index: Option<u16> = None;
    let mut as_number: Option<Option<String>> = None;
    let mut address: Option<IpAddr> = None;
    let mut loss_pct: Option<f32> = None;
    let mut has_latency = false;

    for raw in cleaned.split_whitespace() {
        match tokenize(raw) {
            Token::Index { hop, dotted } if hop_index.is_none() && (dotted || address.is_none()) => {
                hop_index = Some(hop)
            }
            Token::As(asn) if as_number.is_none() => as_number = Some(asn),
            Token::Addr(addr) if address.is_none() => address = Some(addr),
            Token::Loss(pct) if loss_pct.is_none() => loss_pct = Some(pct),
            Token::Latency => has_latency = true,
            _ => {}
        }
    }

    match (hop_index, address) {
        (Some(hop_index), Some(address)) => HopLine::Hop(HopSample {
            record: HopRecord::new(hop_index, as_number.flatten(), address),
            loss_pct,
            has_latency,
        }),
        _ => HopLine::Skip,
    }
}

fn samples_last_first(raw_text: &str) -> impl Iterator<Item = HopSample> + '_ {
    raw_text.lines().rev().filter_map(|line| match classify(line) {
        HopLine::Hop(sample) => Some(sample),
        HopLine::Skip => None,
    })
}

/// Orders records by descending hop index. The sort is stable, so records
/// sharing an index keep the order they came in.
fn deepest_first(records: impl Iterator<Item = HopRecord>) -> CandidateList {
    let mut records: Vec<HopRecord> = records.collect();
    records.sort_by_key(|record| Reverse(record.hop_index));
    records.into_iter().collect()
}

/// Hops annotated with `target_as`, deepest hop first.
///
/// `target_as` may be given with or without the `AS` prefix. A blank target
/// matches nothing.
pub fn parse(raw_text: &str, target_as: &str) -> CandidateList {
    let target = strip_as_prefix(target_as);
    if target.is_empty() {
        return CandidateList::new();
    }

    deepest_first(
        samples_last_first(raw_text)
            .map(|sample| sample.record)
            .filter(|record| record.as_number.as_deref() == Some(target)),
    )
}

/// Hops that answered the trace, deepest hop first, regardless of AS.
/// Placeholder addresses are left out.
pub fn parse_responsive(raw_text: &str) -> CandidateList {
    deepest_first(
        samples_last_first(raw_text)
            .filter(HopSample::is_responsive)
            .map(|sample| sample.record)
            .filter(|record| !ip::is_placeholder(&record.address)),
    )
}

/// AS-matching candidates of a run, limited to the run's address family.
pub fn candidates(run: &DiagnosticRun, target_as: &str) -> CandidateList {
    let mut list = parse(&run.raw_text, target_as);
    list.retain_family(run.address_family);
    list
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

//! Forward lookups and Team Cymru origin-AS lookups over DNS.
//!
//! Cymru answers TXT queries of the form:
//! * `<reversed ip>.origin.asn.cymru.com` (`origin6` for IPv6) with
//!   `"15169 | 8.8.8.0/24 | US | arin | 1992-12-01"`
//! * `AS<n>.asn.cymru.com` with
//!   `"15169 | US | arin | 2000-03-30 | GOOGLE - Google LLC, US"`

use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{Resolver, TokioResolver};
use mncreach_common::{
    debug,
    network::{asn::AsInfo, family::AddressFamily, ip},
    ports::{AsnDirectory, NameResolver},
    warn,
};

const CYMRU_ZONE: &str = "asn.cymru.com";

/// Builds the system resolver, falling back to Google DNS when the host
/// configuration cannot be read.
fn build_resolver() -> TokioResolver {
    match Resolver::builder_tokio() {
        Ok(builder) => builder.build(),
        Err(e) => {
            warn!("System DNS config unavailable ({e}), using Google DNS");
            Resolver::builder_with_config(
                ResolverConfig::google(),
                TokioConnectionProvider::default(),
            )
            .build()
        }
    }
}

/// A / AAAA resolution.
pub struct DnsResolver {
    resolver: TokioResolver,
}

impl DnsResolver {
    pub fn new() -> Self {
        Self {
            resolver: build_resolver(),
        }
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameResolver for DnsResolver {
    async fn resolve(&self, domain: &str, family: AddressFamily) -> Vec<IpAddr> {
        let addrs: Result<Vec<IpAddr>, _> = match family {
            AddressFamily::V4 => self
                .resolver
                .ipv4_lookup(domain)
                .await
                .map(|lookup| lookup.iter().map(|a| IpAddr::V4(a.0)).collect()),
            AddressFamily::V6 => self
                .resolver
                .ipv6_lookup(domain)
                .await
                .map(|lookup| lookup.iter().map(|aaaa| IpAddr::V6(aaaa.0)).collect()),
        };

        addrs.unwrap_or_else(|e| {
            debug!("{family} lookup for {domain} failed: {e}");
            Vec::new()
        })
    }
}

/// Origin AS lookups through Team Cymru's DNS zone.
pub struct CymruDirectory {
    resolver: TokioResolver,
}

impl CymruDirectory {
    pub fn new() -> Self {
        Self {
            resolver: build_resolver(),
        }
    }

    async fn first_txt(&self, name: &str) -> Option<String> {
        let records = match self.resolver.txt_lookup(name).await {
            Ok(records) => records,
            Err(e) => {
                debug!("TXT lookup for {name} failed: {e}");
                return None;
            }
        };
        let txt = records.iter().next()?;

        // Long answers may be split into several character strings.
        let joined: String = txt
            .txt_data()
            .iter()
            .filter_map(|bytes| std::str::from_utf8(bytes).ok())
            .collect::<Vec<_>>()
            .join("");
        Some(joined.trim_matches('"').to_string())
    }
}

impl Default for CymruDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AsnDirectory for CymruDirectory {
    async fn lookup(&self, addr: IpAddr) -> Option<AsInfo> {
        let origin = self.first_txt(&origin_query(&addr)).await?;
        let number = parse_origin_number(&origin)?;

        let name = match self.first_txt(&as_name_query(&number)).await {
            Some(txt) => parse_as_name(&txt).unwrap_or_default(),
            None => String::new(),
        };

        Some(AsInfo::new(number, name))
    }
}

/// `8.8.4.4` -> `4.4.8.8.origin.asn.cymru.com`
pub fn origin_query(addr: &IpAddr) -> String {
    let zone = match addr {
        IpAddr::V4(_) => "origin",
        IpAddr::V6(_) => "origin6",
    };
    format!("{}.{zone}.{CYMRU_ZONE}", ip::reverse_labels(addr))
}

pub fn as_name_query(as_number: &str) -> String {
    format!("AS{as_number}.{CYMRU_ZONE}")
}

/// First AS number of an origin answer. Multi-origin prefixes list several
/// numbers separated by spaces; only the first is kept.
pub fn parse_origin_number(txt: &str) -> Option<String> {
    let first_field = txt.split('|').next()?.trim();
    let number = first_field.split_whitespace().next()?;
    let number = number.trim_start_matches("AS");
    (!number.is_empty() && number.chars().all(|c| c.is_ascii_digit())).then(|| number.to_string())
}

/// AS name is the last field of an `AS<n>` answer.
pub fn parse_as_name(txt: &str) -> Option<String> {
    let name = txt.split('|').map(str::trim).last()?;
    (!name.is_empty()).then(|| name.to_string())
}

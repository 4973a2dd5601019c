//! # Operator Domains
//!
//! Validated domain names handed to external tools, and the 3GPP public
//! domains derived from an MCC/MNC pair:
//! * `epdg.epc.mnc<MNC>.mcc<MCC>.pub.3gppnetwork.org` (VoWiFi ePDG)
//! * `config.rcs.mnc<MNC>.mcc<MCC>.pub.3gppnetwork.org` (RCS autoconfig)
//!
//! The MNC is zero padded to three digits in both.

use std::fmt;
use std::str::FromStr;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A syntactically valid DNS name.
///
/// Names are passed as plain arguments to `mtr`; rejecting leading dashes and
/// anything outside the DNS alphabet keeps them from being read as options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(String);

impl DomainName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DomainName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_end_matches('.');

        if name.is_empty() {
            return Err("empty domain".to_string());
        }
        if name.len() > MAX_DOMAIN_LEN {
            return Err(format!("domain longer than {MAX_DOMAIN_LEN} characters: {name}"));
        }

        for label in name.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(format!("invalid label in domain: {name}"));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(format!("label may not start or end with '-': {name}"));
            }
            if !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(format!("invalid character in domain: {name}"));
            }
        }

        Ok(Self(name.to_ascii_lowercase()))
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which well-known operator service a domain points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceDomain {
    Epdg,
    RcsConfig,
}

impl ServiceDomain {
    /// Builds the service domain for an operator. Returns `None` when either
    /// code is not numeric.
    pub fn for_operator(&self, mcc: &str, mnc: &str) -> Option<DomainName> {
        let mcc = mcc.trim();
        if mcc.is_empty() || !mcc.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let mnc: u16 = mnc.trim().parse().ok()?;

        let prefix = match self {
            Self::Epdg => "epdg.epc",
            Self::RcsConfig => "config.rcs",
        };
        Some(DomainName(format!(
            "{prefix}.mnc{mnc:03}.mcc{mcc}.pub.3gppnetwork.org"
        )))
    }
}

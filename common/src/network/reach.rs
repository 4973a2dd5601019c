use std::net::IpAddr;

/// Outcome of walking a candidate list with echo probes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachabilityResult {
    /// First candidate that answered, if any.
    pub address: Option<IpAddr>,
    /// Every candidate that was actually probed, in probing order.
    pub attempted: Vec<IpAddr>,
}

impl ReachabilityResult {
    pub fn found(address: IpAddr, attempted: Vec<IpAddr>) -> Self {
        Self {
            address: Some(address),
            attempted,
        }
    }

    pub fn none(attempted: Vec<IpAddr>) -> Self {
        Self {
            address: None,
            attempted,
        }
    }

    pub fn is_found(&self) -> bool {
        self.address.is_some()
    }
}

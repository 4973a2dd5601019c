use std::net::IpAddr;

/// `0.0.0.0` and `::` show up in trace reports as stand-ins for hops that
/// never answered. They are never worth probing.
pub fn is_placeholder(addr: &IpAddr) -> bool {
    addr.is_unspecified()
}

/// Reverses an address into DNS label order, without any zone suffix.
///
/// IPv4 reverses the octets (`8.8.4.4` -> `4.4.8.8`), IPv6 reverses the
/// nibbles of the fully expanded address.
pub fn reverse_labels(addr: &IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{d}.{c}.{b}.{a}")
        }
        IpAddr::V6(v6) => v6
            .octets()
            .iter()
            .rev()
            .flat_map(|byte| [byte & 0x0f, byte >> 4])
            .map(|nibble| format!("{nibble:x}"))
            .collect::<Vec<String>>()
            .join("."),
    }
}

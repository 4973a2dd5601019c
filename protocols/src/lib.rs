//! Live implementations of the outbound ports: `mtr` for traces, the system
//! `ping` for echo probes and DNS (A / AAAA / Team Cymru TXT) through
//! `hickory-resolver`.

pub mod command;
pub mod dns;
pub mod mtr;
pub mod ping;

pub use dns::{CymruDirectory, DnsResolver};
pub use mtr::MtrTracer;
pub use ping::SystemPing;

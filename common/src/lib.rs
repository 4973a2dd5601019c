//! Shared building blocks for the `mncreach` workspace.
//!
//! Everything that more than one crate needs lives here: the hop and
//! reachability models, the address family type, run configuration, error
//! types, the logging macros and the outbound traits ([`ports`]) that the
//! core drives and the protocol adapters implement.

pub mod config;
pub mod error;
pub mod logging;
pub mod network;
pub mod ports;

pub use tracing;

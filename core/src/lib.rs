//! # mncreach core
//!
//! * [`hops`]: turns the text report of a trace into ordered candidate hops.
//! * [`prober`]: walks a candidate list with echo probes until one answers.
//! * [`table`]: streams the `;` separated operator listing row by row.
//! * [`enrich`]: the per-row drivers that fill in reachability columns.

pub mod enrich;
pub mod hops;
pub mod prober;
pub mod table;

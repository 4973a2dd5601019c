//! End-to-end runs of the enrichers over real files, with every outbound
//! port replaced by a stub.

#[cfg(test)]
mod enrichment;

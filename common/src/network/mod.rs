pub mod asn;
pub mod domain;
pub mod family;
pub mod hop;
pub mod ip;
pub mod reach;

//! Hearth DNS Infrastructure Layer
//!
//! Everything that touches the network or the DNS wire format: the host
//! index and blocklist snapshots, upstream transports, the per-request
//! query engine, and the UDP/TCP listener.
pub mod dns;

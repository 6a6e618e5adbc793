// vpcs-api: raw HTTP client for the simulation server's VPCS endpoints.
//
// This crate knows about URLs, JSON bodies, and the server's error
// envelope — nothing about topology objects or GUI state. vpcs-core
// layers the device proxy on top.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;
mod vms;

pub use client::VpcsClient;
pub use error::Error;
pub use models::{Nio, UdpPortAllocation, VmParams};
pub use transport::TransportConfig;

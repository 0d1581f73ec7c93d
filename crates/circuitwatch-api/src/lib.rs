// circuitwatch-api: Async Rust client for the SDN control-plane trace service

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::TraceClient;
pub use error::Error;
pub use models::{TERMINAL_TYPE, TraceEth, TraceProgress, TraceRequest, TraceRequestBody, TraceSwitch};
pub use transport::{TlsMode, TransportConfig};

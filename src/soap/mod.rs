//! SOAP control channel to a running worldserver.
//!
//! Only transport lives here: commands are passed through verbatim and
//! their meaning is up to the server.

pub mod client;
pub mod envelope;

pub use client::{ConnectionCheck, SoapClient};

//! Content service API module
//!
//! Provides the content gateway over an HTTP JSON transport, the wire model
//! and the reciter table used to address recitation audio.

mod gateway;
pub mod model;
pub mod reciters;
mod transport;

pub use gateway::ContentGateway;
pub use reciters::{AudioAddress, DEFAULT_PROVIDER_CODE, RECITERS, Reciter, provider_code};
pub use transport::{HttpTransport, Transport};

//! AI backend implementations.

pub mod proxy;
pub mod types;

pub use proxy::ProxyBackend;

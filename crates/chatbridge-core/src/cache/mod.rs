//! In-memory caching primitives.

pub mod expiring;

pub use expiring::ExpiringCache;

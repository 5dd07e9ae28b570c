//! HTTP layer: webhook endpoint, session inspection routes, and the response
//! envelope.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;

//! HTTP/1.x message heads: parsing requests, building responses, and encoding
//! response heads for the wire.

pub mod framing;
pub mod header;
pub mod message;
pub mod span;
pub mod status;
pub mod version;

//! Tools for reading request heads from, and writing responses to, an
//! HTTP/1.x client connection.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{FrontendError, FrontendResult};
pub use reader::FrontendReader;
pub use writer::{FrontendBodyWriter, FrontendWriter};

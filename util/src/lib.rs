pub mod buffer;
pub mod debug;

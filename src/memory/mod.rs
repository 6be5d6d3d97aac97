//! Raw aligned allocations underneath [`crate::storage::Storage`].

pub mod buffer;
pub mod policy;

pub use buffer::{Buffer, BufferBuilder};

//! Writer implementations

pub mod direct;
pub mod output;
pub mod stream;

pub use direct::DirectWriter;
pub use output::Output;
pub use stream::{
    StreamWriter, StreamWriterOptions, WriterState, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_SYNC_INTERVAL,
};

pub use crate::core::LogWriter;

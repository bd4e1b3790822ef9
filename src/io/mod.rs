//! Streaming input detection, record reading, and subset writing.

pub mod detect;
pub mod reader;
pub mod writer;

pub use detect::{detect, DetectedInput, InputShape};
pub use reader::{Record, RecordReader};
pub use writer::SubsetWriter;

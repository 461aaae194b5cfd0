//! Byte-to-event codec
//!
//! [`LineAssembler`] turns arbitrary transport chunks into complete NDJSON
//! lines; [`EventDecoder`] classifies each line into a typed
//! [`StreamEvent`](rankstream_domain::StreamEvent).

pub mod decoder;
pub mod lines;

pub use decoder::EventDecoder;
pub use lines::{LineAssembler, Lines};

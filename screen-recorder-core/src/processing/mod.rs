pub mod chunk_buffer;
pub mod elapsed;
pub mod mime;
pub mod sequencer;

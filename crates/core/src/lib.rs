pub mod pipeline;
pub mod protocol;
pub mod shared;
pub mod transcription;

pub mod engine;
pub mod error;
pub mod observer;
pub mod options;
pub mod segment;
pub mod transcript;

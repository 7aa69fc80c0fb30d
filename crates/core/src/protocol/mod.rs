pub mod emitter;
pub mod envelope;
pub mod request_loop;

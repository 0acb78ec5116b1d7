pub mod batch;
pub mod config;
pub mod logging;
pub mod persist;
pub mod streamer;

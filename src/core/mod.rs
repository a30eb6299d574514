pub mod backoff;
pub mod config;
pub mod errors;
pub mod logging;

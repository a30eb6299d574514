pub mod core;
pub mod embeddings;
pub mod refresh;
pub mod search;
pub mod server;
pub mod state;

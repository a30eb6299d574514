pub mod index;
pub mod scoring;

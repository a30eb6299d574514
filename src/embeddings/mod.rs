pub mod builder;
pub mod cache;
pub mod provider;
pub mod source;

use serde::{Deserialize, Serialize};

/// A training resource together with its embedding vector.
///
/// Identity is the positional index within the source collection; records
/// are immutable once built and replaced wholesale on the next rebuild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedResource {
    pub title: String,
    pub topic: String,
    pub description: String,
    pub embedding: Vec<f32>,
}

impl EmbeddedResource {
    pub fn new(raw: source::RawResource, embedding: Vec<f32>) -> Self {
        Self {
            title: raw.title,
            topic: raw.topic,
            description: raw.description,
            embedding,
        }
    }
}

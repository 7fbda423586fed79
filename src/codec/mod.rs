//! Codec implementations for decoding configuration documents.

mod json;
mod registry;
mod yaml;

pub use json::JsonCodec;
pub use registry::{Codec, CodecRegistry};
pub use yaml::YamlCodec;

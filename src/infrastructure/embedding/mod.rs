mod local;

pub use local::{LocalEmbedding, EMBEDDING_DIMENSION};

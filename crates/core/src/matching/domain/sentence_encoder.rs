/// Domain interface for sentence embeddings.
///
/// Returns one vector per input text, in input order. Implementations may
/// hold an inference session behind interior mutability.
pub trait SentenceEncoder: Send + Sync {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Box<dyn std::error::Error>>;
}

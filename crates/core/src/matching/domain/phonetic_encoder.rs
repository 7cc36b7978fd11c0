/// Domain interface for turning text into a pronunciation key.
///
/// Texts that sound alike should produce similar keys.
pub trait PhoneticEncoder: Send + Sync {
    fn encode(&self, text: &str) -> String;
}

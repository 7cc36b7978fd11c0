use serde::{Deserialize, Serialize};

/// One top-level display unit (a slide, a page) in presentation order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    pub sequence_index: usize,
    pub text: String,
    /// Allows leaving this transcript as soon as its closing segment is spoken.
    #[serde(default)]
    pub early_forward: bool,
}

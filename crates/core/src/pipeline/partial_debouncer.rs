/// Suppresses repeated partial hypotheses.
///
/// Lets a hypothesis through only when it is non-empty and differs from the
/// last one let through.
#[derive(Debug, Default)]
pub struct PartialDebouncer {
    last_text: String,
}

impl PartialDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || text == self.last_text {
            return None;
        }
        self.last_text = text.to_string();
        Some(self.last_text.clone())
    }
}

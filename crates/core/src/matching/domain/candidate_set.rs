/// One segment offered to the matcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub segment_id: String,
    pub text: String,
}

/// Ordered segment-id → text mapping built for a single match attempt.
///
/// Insertion order is preserved; inserting an id twice keeps its first
/// position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateSet {
    entries: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, segment_id: impl Into<String>, text: impl Into<String>) {
        let segment_id = segment_id.into();
        let text = text.into();
        match self.entries.iter_mut().find(|c| c.segment_id == segment_id) {
            Some(existing) => existing.text = text,
            None => self.entries.push(Candidate { segment_id, text }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|c| c.segment_id.clone()).collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn text_of(&self, segment_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|c| c.segment_id == segment_id)
            .map(|c| c.text.as_str())
    }
}

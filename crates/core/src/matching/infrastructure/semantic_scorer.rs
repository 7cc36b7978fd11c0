use crate::matching::domain::sentence_encoder::SentenceEncoder;
use crate::matching::domain::similarity_scorer::{ScoringError, SimilarityScorer};
use crate::matching::infrastructure::memo_cache::MemoCache;

const EMBEDDING_CACHE_CAPACITY: usize = 512;

/// Scores how close in meaning a query and each candidate are.
///
/// Cosine similarity of sentence embeddings, clamped to `[0, 1]`. Candidate
/// embeddings are memoized since the same window is scored repeatedly.
pub struct SemanticScorer<E: SentenceEncoder> {
    encoder: E,
    embeddings: MemoCache<Vec<f32>>,
}

impl<E: SentenceEncoder> SemanticScorer<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            embeddings: MemoCache::new(EMBEDDING_CACHE_CAPACITY),
        }
    }

    fn embed_all(&self, query: &str, candidates: &[&str]) -> Result<Vec<Vec<f32>>, ScoringError> {
        let mut texts: Vec<&str> = Vec::with_capacity(candidates.len() + 1);
        texts.push(query);
        texts.extend_from_slice(candidates);

        let mut embedded: Vec<Option<Vec<f32>>> =
            texts.iter().map(|t| self.embeddings.get(t)).collect();
        let missing: Vec<usize> = (0..texts.len()).filter(|&i| embedded[i].is_none()).collect();

        if !missing.is_empty() {
            let batch: Vec<&str> = missing.iter().map(|&i| texts[i]).collect();
            let vectors = self
                .encoder
                .encode(&batch)
                .map_err(|e| ScoringError::Backend {
                    scorer: "semantic",
                    message: e.to_string(),
                })?;
            if vectors.len() != batch.len() {
                return Err(ScoringError::Backend {
                    scorer: "semantic",
                    message: format!(
                        "encoder returned {} embeddings for {} texts",
                        vectors.len(),
                        batch.len()
                    ),
                });
            }
            for (&i, mut vector) in missing.iter().zip(vectors) {
                l2_normalize(&mut vector);
                self.embeddings.insert(texts[i], vector.clone());
                embedded[i] = Some(vector);
            }
        }

        Ok(embedded.into_iter().flatten().collect())
    }
}

impl<E: SentenceEncoder> SimilarityScorer for SemanticScorer<E> {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f64>, ScoringError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.embed_all(query, candidates)?;
        let (query_vec, candidate_vecs) = embeddings.split_first().ok_or(ScoringError::Backend {
            scorer: "semantic",
            message: "no query embedding".to_string(),
        })?;
        Ok(candidate_vecs
            .iter()
            .map(|v| cosine_similarity(query_vec, v).clamp(0.0, 1.0))
            .collect())
    }
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product of L2-normalized vectors equals cosine similarity.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}

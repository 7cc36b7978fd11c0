use std::path::Path;
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use crate::matching::domain::sentence_encoder::SentenceEncoder;
use crate::matching::infrastructure::semantic_scorer::l2_normalize;

/// Sentence-transformer encoder running on ONNX Runtime.
///
/// Token embeddings are mean-pooled under the attention mask and
/// L2-normalized, matching how sentence-transformers pools MiniLM models.
pub struct OnnxSentenceEncoder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxSentenceEncoder {
    pub fn new(
        model_path: &Path,
        tokenizer_path: &Path,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_inter_threads(1)?
            .with_intra_threads(intra_threads)?
            .with_execution_providers(execution_providers())?
            .commit_from_file(model_path)?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| format!("Failed to load tokenizer {}: {e}", tokenizer_path.display()))?;
        log::info!("Loaded sentence encoder {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl SentenceEncoder for OnnxSentenceEncoder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Box<dyn std::error::Error>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| format!("Tokenization failed: {e}"))?;

        let batch_size = encodings.len();
        let seq_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);

        let mut input_ids: Vec<i64> = Vec::with_capacity(batch_size * seq_len);
        let mut attention_mask: Vec<i64> = Vec::with_capacity(batch_size * seq_len);
        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            for i in 0..seq_len {
                input_ids.push(ids.get(i).map_or(0, |&id| id as i64));
                attention_mask.push(mask.get(i).map_or(0, |&m| m as i64));
            }
        }
        let token_type_ids = vec![0i64; batch_size * seq_len];

        let shape = [batch_size, seq_len];
        let input_ids = Tensor::from_array((shape, input_ids))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.clone()))?;
        let token_type_ids = Tensor::from_array((shape, token_type_ids))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => input_ids,
            "attention_mask" => mask_tensor,
            "token_type_ids" => token_type_ids,
        ])?;
        let output = outputs
            .get("last_hidden_state")
            .or_else(|| outputs.get("token_embeddings"))
            .ok_or("No token embedding output")?;
        let (out_shape, data) = output.try_extract_tensor::<f32>()?;
        if out_shape.len() != 3 {
            return Err(format!("Unexpected output rank {}", out_shape.len()).into());
        }
        let out_seq_len = out_shape[1] as usize;
        let hidden = out_shape[2] as usize;

        Ok((0..batch_size)
            .map(|b| {
                let mask = &attention_mask[b * seq_len..(b + 1) * seq_len];
                let rows = b * out_seq_len * hidden..(b + 1) * out_seq_len * hidden;
                let mut pooled = mean_pool(&data[rows], mask, hidden);
                l2_normalize(&mut pooled);
                pooled
            })
            .collect())
    }
}

/// CoreML on macOS and DirectML on Windows. ONNX Runtime falls back to
/// CPU when a provider cannot be registered.
#[allow(unused_mut)]
fn execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    let mut providers = Vec::new();
    #[cfg(target_os = "macos")]
    providers.push(ort::execution_providers::CoreMLExecutionProvider::default().build());
    #[cfg(target_os = "windows")]
    providers.push(ort::execution_providers::DirectMLExecutionProvider::default().build());
    providers
}

/// Average of the token rows whose mask bit is set.
fn mean_pool(tokens: &[f32], mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden];
    let mut count = 0.0f32;
    for (row, &m) in tokens.chunks_exact(hidden).zip(mask) {
        if m > 0 {
            for (p, v) in pooled.iter_mut().zip(row) {
                *p += v;
            }
            count += 1.0;
        }
    }
    if count > 0.0 {
        for p in &mut pooled {
            *p /= count;
        }
    }
    pooled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_ignores_masked_tokens() {
        let tokens = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&tokens, &[1, 1, 0], 2);
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn test_mean_pool_all_masked_is_zero() {
        let pooled = mean_pool(&[5.0, 5.0], &[0], 2);
        assert_eq!(pooled, vec![0.0, 0.0]);
    }

    #[test]
    fn test_missing_model_is_error() {
        let result = OnnxSentenceEncoder::new(
            Path::new("/nonexistent/model.onnx"),
            Path::new("/nonexistent/tokenizer.json"),
        );
        assert!(result.is_err());
    }
}

pub mod memo_cache;
pub mod metaphone_encoder;
pub mod onnx_sentence_encoder;
pub mod phonetic_scorer;
pub mod semantic_scorer;

pub mod candidate_set;
pub mod phonetic_encoder;
pub mod score_combiner;
pub mod sentence_encoder;
pub mod similarity_scorer;

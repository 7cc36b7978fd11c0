pub mod cancellation;
pub mod constants;
pub mod model_resolver;
pub mod text_normalizer;
pub mod transcript_cursor;
